use std::sync::Arc;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;

use crate::builder::{ApiGatewayBuilder, UnauthorizedHook};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::loading::LoadingTracker;
use crate::normalize::{
    NOTICE_NETWORK, NOTICE_REQUEST_FAILED, RawResponse, classify_transport_error, status_notice,
};
use crate::notify::Notifier;
use crate::pending::PendingRequests;
use crate::request::{BodyKind, PreparedRequest, RequestBuilder};

/// Façade over the HTTP transport that manages the request lifecycle.
///
/// Adds three cross-cutting behaviors to every dispatch:
/// - in-flight fingerprinting with cancellation of duplicates,
/// - reference-counted loading-indicator lifecycle,
/// - uniform response/error normalization with a single notification per
///   failure (none for cancellations).
///
/// The pending-request registry and loading counter are exclusively owned by
/// the gateway; distinct gateway instances are fully isolated from each
/// other.
///
/// # Thread Safety
///
/// `ApiGateway` is `Clone + Send + Sync`; cloning is cheap and clones share
/// the same registry and counter.
///
/// # Example
///
/// ```ignore
/// use frontkit_gateway::ApiGateway;
///
/// let gateway = ApiGateway::builder()
///     .base_url("https://backend.example.com/api")
///     .build()?;
///
/// let user: User = gateway.get("/users/42").send().await?;
/// ```
#[derive(Clone)]
pub struct ApiGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    http: reqwest::Client,
    base_url: String,
    pending: PendingRequests,
    loading: LoadingTracker,
    notifier: Arc<dyn Notifier>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiGateway {
    /// Create a gateway with environment-derived configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, GatewayError> {
        ApiGatewayBuilder::new().build()
    }

    /// Create a builder for configuring the gateway.
    #[must_use]
    pub fn builder() -> ApiGatewayBuilder {
        ApiGatewayBuilder::new()
    }

    pub(crate) fn from_parts(
        http: reqwest::Client,
        config: GatewayConfig,
        notifier: Arc<dyn Notifier>,
        on_unauthorized: Option<UnauthorizedHook>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                http,
                base_url: config.base_url,
                pending: PendingRequests::default(),
                loading: LoadingTracker::new(Arc::clone(&notifier)),
                notifier,
                on_unauthorized,
            }),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Create a GET request builder.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let users: Vec<User> = gateway
    ///     .get("/users")
    ///     .query(&[("page", "1")])
    ///     .send()
    ///     .await?;
    /// ```
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Create a POST request builder.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let created: User = gateway
    ///     .post("/users")
    ///     .json(&NewUser { name: "Alice".into() })
    ///     .send()
    ///     .await?;
    /// ```
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    /// Create a PUT request builder.
    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(Method::PUT, path)
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.request(Method::PATCH, path)
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Create a request builder for an arbitrary method.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, path)
    }

    /// Create a multipart upload builder (POST).
    ///
    /// The content type is forced to the multipart form value; other
    /// caller-supplied headers override defaults as usual.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let receipt: UploadReceipt = gateway
    ///     .upload("/files")
    ///     .file_part("file", "avatar.png", image_bytes)
    ///     .send()
    ///     .await?;
    /// ```
    pub fn upload(&self, path: &str) -> RequestBuilder {
        RequestBuilder::new_multipart(self.clone(), path)
    }

    /// Create a download builder (GET, raw payload).
    ///
    /// Terminate with [`RequestBuilder::download`] to receive the payload and
    /// the filename parsed from `content-disposition`.
    pub fn download(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    /// Cancel every in-flight request and clear the registry.
    ///
    /// Each cancelled dispatch settles on its own path and releases its
    /// loading hold there; the counter is not touched here.
    pub fn cancel_all_requests(&self) {
        self.inner.pending.cancel_all();
    }

    /// Number of requests currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.count()
    }

    /// Current value of the loading reference count.
    #[must_use]
    pub fn loading_count(&self) -> i64 {
        self.inner.loading.count()
    }

    /// Run the dispatch protocol for a prepared request.
    ///
    /// Registers the fingerprint (superseding any live duplicate), holds the
    /// loading indicator unless opted out, races the transport against the
    /// cancellation handle, then settles the registry and reports the
    /// outcome.
    pub(crate) async fn dispatch(
        &self,
        prepared: PreparedRequest,
    ) -> Result<RawResponse, GatewayError> {
        let slot = self.inner.pending.begin(&prepared.fingerprint);
        let _loading = prepared
            .show_loading
            .then(|| self.inner.loading.acquire());

        let outcome = tokio::select! {
            reason = slot.cancelled() => Err(GatewayError::Cancelled { reason }),
            result = self.perform(&prepared) => result,
        };

        self.inner.pending.settle(&prepared.fingerprint, slot.id());
        if let Err(error) = &outcome {
            self.report(error);
        }
        outcome
    }

    async fn perform(&self, prepared: &PreparedRequest) -> Result<RawResponse, GatewayError> {
        let mut request = self
            .inner
            .http
            .request(prepared.method.clone(), prepared.request_url());

        if let Some(timeout) = prepared.timeout {
            request = request.timeout(timeout);
        }

        let has_content_type = prepared
            .headers
            .iter()
            .any(|(name, _)| name == CONTENT_TYPE);

        request = match &prepared.body {
            BodyKind::Empty => request,
            BodyKind::Json(serialized) => {
                if !has_content_type {
                    request = request.header(CONTENT_TYPE, "application/json");
                }
                request.body(serialized.clone())
            }
            BodyKind::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    let mut piece = reqwest::multipart::Part::bytes(part.data.to_vec());
                    if let Some(filename) = &part.filename {
                        piece = piece.file_name(filename.clone());
                    }
                    if let Some(content_type) = &part.content_type {
                        piece = piece
                            .mime_str(content_type)
                            .map_err(|e| GatewayError::Unknown(Box::new(e)))?;
                    }
                    form = form.part(part.name.clone(), piece);
                }
                request.multipart(form)
            }
        };

        for (name, value) in &prepared.headers {
            // The multipart content type (with its boundary) always wins.
            if matches!(prepared.body, BodyKind::Multipart(_)) && name == CONTENT_TYPE {
                continue;
            }
            request = request.header(name.clone(), value.clone());
        }

        let response = request.send().await.map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Business {
                status: status.as_u16(),
                message: status_notice(status.as_u16()).to_owned(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify_transport_error)?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Perform the single notification side effect for a failed outcome.
    ///
    /// Cancellations are expected control flow and stay silent.
    pub(crate) fn report(&self, error: &GatewayError) {
        match error {
            GatewayError::Cancelled { reason } => {
                tracing::debug!(%reason, "request cancelled");
            }
            GatewayError::Network(source) => {
                tracing::warn!(error = %source, "network failure");
                self.inner.notifier.error(NOTICE_NETWORK);
            }
            GatewayError::Business { status, message } => {
                tracing::warn!(status = *status, "business failure");
                self.inner.notifier.error(message);
                if *status == 401 {
                    if let Some(hook) = &self.inner.on_unauthorized {
                        hook();
                    }
                }
            }
            GatewayError::Unknown(source) => {
                tracing::warn!(error = %source, "unclassified failure");
                self.inner.notifier.error(NOTICE_REQUEST_FAILED);
            }
        }
    }
}
