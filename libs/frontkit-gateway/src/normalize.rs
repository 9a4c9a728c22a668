//! Pure normalization steps applied to settled transport outcomes.
//!
//! Each step is a standalone function over plain data so the translation
//! rules can be exercised without a server: status classification,
//! envelope unwrapping, and download filename extraction.

use bytes::Bytes;
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

use crate::envelope::ApiEnvelope;
use crate::error::GatewayError;

/// Notice shown when no response reached the client.
pub const NOTICE_NETWORK: &str = "Network unavailable, please check your connection";
/// Notice shown on 401 responses.
pub const NOTICE_SESSION_EXPIRED: &str = "Session expired, please sign in again";
/// Notice shown on 403 responses.
pub const NOTICE_FORBIDDEN: &str = "You do not have permission to access this resource";
/// Notice shown on 404 responses.
pub const NOTICE_NOT_FOUND: &str = "Requested resource was not found";
/// Notice shown on 500 responses.
pub const NOTICE_SERVER_ERROR: &str = "Server error, please try again later";
/// Generic failure notice, also the fallback for empty envelope messages.
pub const NOTICE_REQUEST_FAILED: &str = "Request failed, please try again later";

/// Filename used when `content-disposition` is absent or unparseable.
pub const DEFAULT_DOWNLOAD_NAME: &str = "download";

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="?(.+?)"?(;|$)"#).expect("static regex should not panic")
});

/// Settled transport outcome before normalization.
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

/// Result of a file download.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Name parsed from `content-disposition`, or [`DEFAULT_DOWNLOAD_NAME`].
    pub filename: String,
    /// Raw response payload.
    pub data: Bytes,
}

/// Map an HTTP status to its user-facing notice.
pub(crate) fn status_notice(status: u16) -> &'static str {
    match status {
        401 => NOTICE_SESSION_EXPIRED,
        403 => NOTICE_FORBIDDEN,
        404 => NOTICE_NOT_FOUND,
        500 => NOTICE_SERVER_ERROR,
        _ => NOTICE_REQUEST_FAILED,
    }
}

/// Classify a transport-layer failure.
///
/// Request-construction and body-decoding defects are not network conditions;
/// everything else (connect, DNS, timeout, interrupted transfer) is.
pub(crate) fn classify_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_builder() || error.is_decode() {
        GatewayError::Unknown(Box::new(error))
    } else {
        GatewayError::Network(error)
    }
}

/// Strip the response envelope, yielding `data` on success.
///
/// A failed envelope becomes a business error carrying the backend message
/// (or the generic fallback when the message is empty). A body that is not an
/// envelope at all is an unknown failure.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, GatewayError> {
    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| GatewayError::Unknown(Box::new(e)))?;

    if !envelope.success {
        let message = if envelope.message.is_empty() {
            NOTICE_REQUEST_FAILED.to_owned()
        } else {
            envelope.message
        };
        return Err(GatewayError::Business {
            status: status.as_u16(),
            message,
        });
    }

    let data = envelope.data.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(data).map_err(|e| GatewayError::Unknown(Box::new(e)))
}

/// Extract the download filename from response headers.
pub(crate) fn filename_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| FILENAME_RE.captures(value))
        .and_then(|captures| captures.get(1))
        .map_or_else(
            || DEFAULT_DOWNLOAD_NAME.to_owned(),
            |name| name.as_str().to_owned(),
        )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        id: i64,
    }

    #[test]
    fn successful_envelope_unwraps_to_data_exactly() {
        let body = json!({"code": 0, "data": {"id": 1}, "message": "", "success": true});
        let payload: Payload =
            unwrap_envelope(StatusCode::OK, body.to_string().as_bytes()).unwrap();
        assert_eq!(payload, Payload { id: 1 });
    }

    #[test]
    fn failed_envelope_carries_its_message() {
        let body = json!({"success": false, "message": "X"});
        let result: Result<Payload, _> =
            unwrap_envelope(StatusCode::OK, body.to_string().as_bytes());
        match result {
            Err(GatewayError::Business { status, message }) => {
                assert_eq!(status, 200);
                assert_eq!(message, "X");
            }
            other => panic!("expected business error, got {other:?}"),
        }
    }

    #[test]
    fn failed_envelope_without_message_uses_the_fallback() {
        let body = json!({"success": false});
        let result: Result<Payload, _> =
            unwrap_envelope(StatusCode::OK, body.to_string().as_bytes());
        match result {
            Err(GatewayError::Business { message, .. }) => {
                assert_eq!(message, NOTICE_REQUEST_FAILED);
            }
            other => panic!("expected business error, got {other:?}"),
        }
    }

    #[test]
    fn successful_envelope_without_data_yields_unit_payloads() {
        let body = json!({"code": 0, "message": "", "success": true});
        let nothing: Option<Payload> =
            unwrap_envelope(StatusCode::OK, body.to_string().as_bytes()).unwrap();
        assert_eq!(nothing, None);
    }

    #[test]
    fn non_envelope_body_is_unknown() {
        let result: Result<Payload, _> = unwrap_envelope(StatusCode::OK, br#"{"id": 1}"#);
        assert!(matches!(result, Err(GatewayError::Unknown(_))));
    }

    #[test]
    fn status_notices_are_specific_where_defined() {
        assert_eq!(status_notice(401), NOTICE_SESSION_EXPIRED);
        assert_eq!(status_notice(403), NOTICE_FORBIDDEN);
        assert_eq!(status_notice(404), NOTICE_NOT_FOUND);
        assert_eq!(status_notice(500), NOTICE_SERVER_ERROR);
        assert_eq!(status_notice(418), NOTICE_REQUEST_FAILED);
        assert_eq!(status_notice(502), NOTICE_REQUEST_FAILED);
    }

    fn headers_with_disposition(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_DISPOSITION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn quoted_filename_is_extracted() {
        let headers = headers_with_disposition(r#"attachment; filename="report.csv""#);
        assert_eq!(filename_from_headers(&headers), "report.csv");
    }

    #[test]
    fn unquoted_filename_is_extracted() {
        let headers = headers_with_disposition("attachment; filename=data.bin");
        assert_eq!(filename_from_headers(&headers), "data.bin");
    }

    #[test]
    fn filename_stops_at_the_next_parameter() {
        let headers = headers_with_disposition(r#"attachment; filename="a.txt"; size=3"#);
        assert_eq!(filename_from_headers(&headers), "a.txt");
    }

    #[test]
    fn missing_header_falls_back_to_download() {
        assert_eq!(filename_from_headers(&HeaderMap::new()), DEFAULT_DOWNLOAD_NAME);
    }

    #[test]
    fn header_without_filename_falls_back_to_download() {
        let headers = headers_with_disposition("inline");
        assert_eq!(filename_from_headers(&headers), DEFAULT_DOWNLOAD_NAME);
    }
}
