use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::ApiGateway;
use crate::error::GatewayError;
use crate::fingerprint;
use crate::normalize::{DownloadedFile, filename_from_headers, unwrap_envelope};

/// Body attached to a request.
#[derive(Clone)]
pub(crate) enum BodyKind {
    /// No body.
    Empty,
    /// JSON-serialized body (stored as its serialized form).
    Json(String),
    /// Multipart form body assembled from in-memory parts.
    Multipart(Vec<FormPart>),
}

/// One part of a multipart form.
#[derive(Clone)]
pub(crate) struct FormPart {
    pub(crate) name: String,
    pub(crate) filename: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) data: Bytes,
}

/// Fully prepared dispatch input: final URL, fingerprint, body and options.
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(HeaderName, HeaderValue)>,
    pub(crate) body: BodyKind,
    pub(crate) timeout: Option<Duration>,
    pub(crate) show_loading: bool,
    pub(crate) fingerprint: String,
}

impl PreparedRequest {
    /// URL with the encoded query string appended.
    pub(crate) fn request_url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.url, query),
            None => self.url.clone(),
        }
    }
}

/// Join a request path onto the configured base URL.
///
/// Absolute URLs pass through untouched so callers can escape the base.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_owned();
    }
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Request builder with a fluent API.
///
/// Created by [`ApiGateway::get`], [`ApiGateway::post`], etc. Configuration
/// errors (bad header, unserializable query or body) are deferred and
/// surfaced when the request is sent.
///
/// # Example
///
/// ```ignore
/// let user: User = gateway
///     .get("/users/42")
///     .query(&[("expand", "profile")])
///     .send()
///     .await?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() or .download() is called"]
pub struct RequestBuilder {
    gateway: ApiGateway,
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: BodyKind,
    timeout: Option<Duration>,
    show_loading: bool,
    /// Error captured during building (deferred to send).
    error: Option<GatewayError>,
}

impl RequestBuilder {
    pub(crate) fn new(gateway: ApiGateway, method: Method, path: &str) -> Self {
        Self {
            gateway,
            method,
            path: path.to_owned(),
            query: None,
            headers: Vec::new(),
            body: BodyKind::Empty,
            timeout: None,
            show_loading: true,
            error: None,
        }
    }

    pub(crate) fn new_multipart(gateway: ApiGateway, path: &str) -> Self {
        let mut builder = Self::new(gateway, Method::POST, path);
        builder.body = BodyKind::Multipart(Vec::new());
        builder
    }

    /// Set the query string from a serializable value.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        if self.error.is_some() {
            return self;
        }
        match serde_urlencoded::to_string(query) {
            Ok(encoded) => self.query = (!encoded.is_empty()).then_some(encoded),
            Err(e) => self.error = Some(GatewayError::Unknown(Box::new(e))),
        }
        self
    }

    /// Set the request body as JSON.
    ///
    /// Sets `Content-Type: application/json` unless a content type header was
    /// supplied explicitly.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        if self.error.is_some() {
            return self;
        }
        match serde_json::to_string(body) {
            Ok(serialized) => self.body = BodyKind::Json(serialized),
            Err(e) => self.error = Some(GatewayError::Unknown(Box::new(e))),
        }
        self
    }

    /// Add a single header to the request.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.push((name, value));
            }
            (Err(e), _) => {
                self.error = Some(GatewayError::Unknown(Box::new(e)));
            }
            (_, Err(e)) => {
                self.error = Some(GatewayError::Unknown(Box::new(e)));
            }
        }
        self
    }

    /// Override the transport timeout for this request only.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Opt this request out of the global loading indicator.
    pub fn silent(mut self) -> Self {
        self.show_loading = false;
        self
    }

    /// Add a plain text field to the multipart form.
    ///
    /// Switches the body to multipart if it was not already.
    pub fn text_part(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_part(FormPart {
            name: name.into(),
            filename: None,
            content_type: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Add an in-memory file to the multipart form.
    pub fn file_part(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: Bytes,
    ) -> Self {
        self.push_part(FormPart {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: None,
            data,
        });
        self
    }

    /// Add an in-memory file with an explicit content type.
    pub fn file_part_with_type(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Bytes,
    ) -> Self {
        self.push_part(FormPart {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some(content_type.into()),
            data,
        });
        self
    }

    fn push_part(&mut self, part: FormPart) {
        match &mut self.body {
            BodyKind::Multipart(parts) => parts.push(part),
            BodyKind::Empty | BodyKind::Json(_) => self.body = BodyKind::Multipart(vec![part]),
        }
    }

    /// Send the request and unwrap the response envelope to its payload.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`GatewayError`]: `Cancelled` when superseded or
    /// bulk-cancelled, `Network` when no response arrived, `Business` for
    /// status or envelope failures, `Unknown` otherwise.
    pub async fn send<T: DeserializeOwned>(self) -> Result<T, GatewayError> {
        let (gateway, prepared) = self.prepare()?;
        let raw = gateway.dispatch(prepared).await?;
        match unwrap_envelope::<T>(raw.status, &raw.body) {
            Ok(data) => Ok(data),
            Err(error) => {
                gateway.report(&error);
                Err(error)
            }
        }
    }

    /// Send the request and return the raw payload with its parsed filename.
    ///
    /// The response body is not interpreted as an envelope.
    ///
    /// # Errors
    ///
    /// Same classification as [`send`](Self::send), minus envelope failures.
    pub async fn download(self) -> Result<DownloadedFile, GatewayError> {
        let (gateway, prepared) = self.prepare()?;
        let raw = gateway.dispatch(prepared).await?;
        Ok(DownloadedFile {
            filename: filename_from_headers(&raw.headers),
            data: raw.body,
        })
    }

    fn prepare(self) -> Result<(ApiGateway, PreparedRequest), GatewayError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let url = join_url(self.gateway.base_url(), &self.path);
        let body_repr = match &self.body {
            BodyKind::Empty => String::new(),
            BodyKind::Json(serialized) => serialized.clone(),
            BodyKind::Multipart(parts) => {
                let descriptors: Vec<String> = parts
                    .iter()
                    .map(|part| {
                        format!(
                            "{}:{}:{}",
                            part.name,
                            part.filename.as_deref().unwrap_or_default(),
                            part.data.len()
                        )
                    })
                    .collect();
                format!("multipart[{}]", descriptors.join(","))
            }
        };
        let fingerprint =
            fingerprint::compose(&self.method, &url, self.query.as_deref(), &body_repr);

        Ok((
            self.gateway,
            PreparedRequest {
                method: self.method,
                url,
                query: self.query,
                headers: self.headers,
                body: self.body,
                timeout: self.timeout,
                show_loading: self.show_loading,
                fingerprint,
            },
        ))
    }
}
