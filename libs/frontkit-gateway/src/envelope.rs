use serde::Deserialize;

/// Standard response wrapper produced by the backend API.
///
/// Every JSON endpoint answers with this shape; the gateway strips it and
/// hands callers only `data`. `data` is optional so failure envelopes that
/// omit a payload still deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Application-level status code.
    #[serde(default)]
    pub code: i64,
    /// Payload; absent on most failure envelopes.
    pub data: Option<T>,
    /// Human-readable message accompanying the outcome.
    #[serde(default)]
    pub message: String,
    /// Whether the operation succeeded at the application level.
    pub success: bool,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_envelope_deserializes() {
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_value(json!({"code": 0, "data": {"id": 1}, "message": "", "success": true}))
                .unwrap();
        assert_eq!(envelope.code, 0);
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(json!({"id": 1})));
    }

    #[test]
    fn failure_envelope_without_data_deserializes() {
        let envelope: ApiEnvelope<serde_json::Value> =
            serde_json::from_value(json!({"success": false, "message": "X"})).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.message, "X");
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.code, 0);
    }

    #[test]
    fn missing_success_flag_is_rejected() {
        let result: Result<ApiEnvelope<serde_json::Value>, _> =
            serde_json::from_value(json!({"data": {"id": 1}}));
        assert!(result.is_err());
    }
}
