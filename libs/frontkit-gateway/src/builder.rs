use std::sync::Arc;
use std::time::Duration;

use crate::client::ApiGateway;
use crate::config::{CredentialPolicy, GatewayConfig};
use crate::error::GatewayError;
use crate::notify::{Notifier, TracingNotifier};

/// Hook invoked when a request is rejected with 401.
///
/// The gateway performs no navigation itself; callers that want a
/// redirect-to-login flow supply one here.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Builder for constructing an [`ApiGateway`].
///
/// Starts from environment-derived configuration
/// (see [`GatewayConfig::from_env`]).
pub struct ApiGatewayBuilder {
    config: GatewayConfig,
    notifier: Option<Arc<dyn Notifier>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiGatewayBuilder {
    /// Create a new builder with environment-derived configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::from_env(),
            notifier: None,
            on_unauthorized: None,
        }
    }

    /// Create a builder with a specific configuration.
    #[must_use]
    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            config,
            notifier: None,
            on_unauthorized: None,
        }
    }

    /// Set the base URL every request path is joined onto.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the transport timeout applied to every request.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the credential-inclusion policy.
    #[must_use]
    pub fn credentials(mut self, credentials: CredentialPolicy) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Set the notification surface for loading state and error notices.
    ///
    /// Defaults to [`TracingNotifier`].
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Install the hook invoked on 401 classifications.
    #[must_use]
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    /// Returns `GatewayError::Unknown` if the underlying client cannot be
    /// constructed.
    pub fn build(self) -> Result<ApiGateway, GatewayError> {
        let mut http = reqwest::Client::builder().timeout(self.config.timeout);
        http = match self.config.credentials {
            CredentialPolicy::Include => http.cookie_store(true),
            CredentialPolicy::Omit => http,
        };
        let http = http
            .build()
            .map_err(|e| GatewayError::Unknown(Box::new(e)))?;

        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));

        Ok(ApiGateway::from_parts(
            http,
            self.config,
            notifier,
            self.on_unauthorized,
        ))
    }
}

impl Default for ApiGatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_replace_config_fields() {
        let gateway = ApiGatewayBuilder::with_config(GatewayConfig::default())
            .base_url("https://backend.example.com/api")
            .timeout(Duration::from_secs(5))
            .credentials(CredentialPolicy::Omit)
            .build()
            .unwrap();

        assert_eq!(gateway.pending_count(), 0);
        assert_eq!(gateway.loading_count(), 0);
    }
}
