use std::time::Duration;

/// Environment variable consulted for the API origin.
pub const BASE_URL_ENV: &str = "FRONTKIT_API_BASE_URL";

/// Base URL used when the environment does not provide one.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Transport timeout applied to every request unless overridden per call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Whether stored credentials (the cookie jar) accompany requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialPolicy {
    /// Maintain a shared cookie jar and attach it to every request (default).
    #[default]
    Include,
    /// Never attach stored credentials.
    Omit,
}

/// Static configuration for an [`ApiGateway`](crate::ApiGateway).
///
/// The pending-request registry and loading counter are runtime state owned
/// by the gateway itself and are deliberately absent here.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Origin (or path prefix) every request path is joined onto.
    pub base_url: String,
    /// Transport-level timeout for each request.
    pub timeout: Duration,
    /// Credential-inclusion policy for the underlying client.
    pub credentials: CredentialPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            credentials: CredentialPolicy::Include,
        }
    }
}

impl GatewayConfig {
    /// Build a config taking the base URL from `FRONTKIT_API_BASE_URL`,
    /// falling back to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Self {
            base_url,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "/api");
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert_eq!(config.credentials, CredentialPolicy::Include);
    }
}
