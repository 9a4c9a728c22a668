use reqwest::Method;

/// Deterministic identity of a logical request.
///
/// Two dispatches with the same method, URL, serialized query and serialized
/// body are duplicates of each other; the newer one supersedes the older.
pub(crate) fn compose(method: &Method, url: &str, query: Option<&str>, body: &str) -> String {
    [method.as_str(), url, query.unwrap_or_default(), body].join("&")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn identical_requests_share_a_fingerprint() {
        let a = compose(&Method::GET, "/api/users", Some("page=1"), "");
        let b = compose(&Method::GET, "/api/users", Some("page=1"), "");
        assert_eq!(a, b);
    }

    #[test]
    fn method_query_and_body_all_discriminate() {
        let base = compose(&Method::GET, "/api/users", None, "");
        assert_ne!(base, compose(&Method::POST, "/api/users", None, ""));
        assert_ne!(base, compose(&Method::GET, "/api/users", Some("page=2"), ""));
        assert_ne!(base, compose(&Method::GET, "/api/users", None, r#"{"id":1}"#));
        assert_ne!(base, compose(&Method::GET, "/api/teams", None, ""));
    }
}
