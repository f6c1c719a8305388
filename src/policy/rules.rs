//! Rule Definitions
//!
//! Key contributors and bypass predicates, plus the serde form used to load
//! them from configuration.

use axum::http::Request;
use serde::Deserialize;

/// Separator placed between the values of a multi-valued header or query
/// parameter, and between key components.
pub const VALUE_SEPARATOR: &str = "/";

// == Key Rule ==
/// Extracts one component of a request fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRule {
    /// The request method, verbatim
    Method,
    /// The request path, verbatim
    Path,
    /// All values of the named query parameter
    Query(String),
    /// All values of the named header
    Header(String),
}

impl KeyRule {
    /// Returns this rule's component for `request`. Absent values yield an
    /// empty string.
    pub fn extract<B>(&self, request: &Request<B>) -> String {
        match self {
            KeyRule::Method => request.method().as_str().to_string(),
            KeyRule::Path => request.uri().path().to_string(),
            KeyRule::Query(name) => query_values(request, name).join(VALUE_SEPARATOR),
            KeyRule::Header(name) => header_values(request, name).join(VALUE_SEPARATOR),
        }
    }
}

// == Bypass Rule ==
/// Decides whether a request skips the cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BypassRule {
    /// True if any value of header `name` equals `value`
    HeaderEquals { name: String, value: String },
    /// True if the request method matches, ignoring case
    MethodIn(String),
}

impl BypassRule {
    /// Returns true if `request` should skip the cache lookup.
    pub fn matches<B>(&self, request: &Request<B>) -> bool {
        match self {
            BypassRule::HeaderEquals { name, value } => header_values(request, name)
                .iter()
                .any(|candidate| candidate == value),
            BypassRule::MethodIn(method) => request.method().as_str().eq_ignore_ascii_case(method),
        }
    }
}

// == Rule ==
/// Either kind of rule, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRule")]
pub enum Rule {
    Key(KeyRule),
    Bypass(BypassRule),
    /// A rule kind this crate does not know; ignored on registration
    Unrecognized,
}

impl From<KeyRule> for Rule {
    fn from(rule: KeyRule) -> Self {
        Rule::Key(rule)
    }
}

impl From<BypassRule> for Rule {
    fn from(rule: BypassRule) -> Self {
        Rule::Bypass(rule)
    }
}

/// Configuration form: `{"kind": "header", "name": "Authorization"}`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawRule {
    Method,
    Path,
    Query { name: String },
    Header { name: String },
    BypassHeader { name: String, value: String },
    BypassMethod { method: String },
    #[serde(other)]
    Unrecognized,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        match raw {
            RawRule::Method => KeyRule::Method.into(),
            RawRule::Path => KeyRule::Path.into(),
            RawRule::Query { name } => KeyRule::Query(name).into(),
            RawRule::Header { name } => KeyRule::Header(name).into(),
            RawRule::BypassHeader { name, value } => BypassRule::HeaderEquals { name, value }.into(),
            RawRule::BypassMethod { method } => BypassRule::MethodIn(method).into(),
            RawRule::Unrecognized => Rule::Unrecognized,
        }
    }
}

// == Request Helpers ==
/// Values of header `name` in arrival order. Non-UTF-8 bytes are replaced
/// lossily; an invalid header name matches nothing.
fn header_values<B>(request: &Request<B>, name: &str) -> Vec<String> {
    request
        .headers()
        .get_all(name)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .collect()
}

/// Decoded values of query parameter `name` in arrival order. An
/// undecodable query string counts as absent.
fn query_values<B>(request: &Request<B>, name: &str) -> Vec<String> {
    let Some(query) = request.uri().query() else {
        return Vec::new();
    };

    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .unwrap_or_default()
        .into_iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: &str, uri: &str, headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_method_and_path_extraction() {
        let req = request("POST", "/a/b?x=1", &[]);

        assert_eq!(KeyRule::Method.extract(&req), "POST");
        assert_eq!(KeyRule::Path.extract(&req), "/a/b");
    }

    #[test]
    fn test_query_extraction_joins_all_values() {
        let req = request("GET", "/?name=steven&other=1&name=mike", &[]);

        assert_eq!(KeyRule::Query("name".to_string()).extract(&req), "steven/mike");
        assert_eq!(KeyRule::Query("other".to_string()).extract(&req), "1");
    }

    #[test]
    fn test_query_extraction_decodes_values() {
        let req = request("GET", "/?name=a%20b&greeting=hello+world", &[]);

        assert_eq!(KeyRule::Query("name".to_string()).extract(&req), "a b");
        assert_eq!(KeyRule::Query("greeting".to_string()).extract(&req), "hello world");
    }

    #[test]
    fn test_absent_query_is_empty() {
        let with_query = request("GET", "/?other=1", &[]);
        let without_query = request("GET", "/", &[]);
        let rule = KeyRule::Query("name".to_string());

        assert_eq!(rule.extract(&with_query), "");
        assert_eq!(rule.extract(&without_query), "");
    }

    #[test]
    fn test_header_extraction_joins_all_values() {
        let req = request("GET", "/", &[("Accept", "text/html"), ("accept", "application/json")]);

        assert_eq!(
            KeyRule::Header("Accept".to_string()).extract(&req),
            "text/html/application/json"
        );
    }

    #[test]
    fn test_absent_or_invalid_header_is_empty() {
        let req = request("GET", "/", &[]);

        assert_eq!(KeyRule::Header("Authorization".to_string()).extract(&req), "");
        assert_eq!(KeyRule::Header("not a header".to_string()).extract(&req), "");
    }

    #[test]
    fn test_bypass_header_matches_any_value() {
        let rule = BypassRule::HeaderEquals {
            name: "Cache-Status".to_string(),
            value: "bypass".to_string(),
        };

        assert!(rule.matches(&request("GET", "/", &[("Cache-Status", "bypass")])));
        assert!(rule.matches(&request(
            "GET",
            "/",
            &[("Cache-Status", "other"), ("Cache-Status", "bypass")]
        )));
        assert!(!rule.matches(&request("GET", "/", &[("Cache-Status", "Bypass")])));
        assert!(!rule.matches(&request("GET", "/", &[])));
    }

    #[test]
    fn test_bypass_method_ignores_case_on_both_sides() {
        let rule = BypassRule::MethodIn("Post".to_string());

        assert!(rule.matches(&request("POST", "/", &[])));
        assert!(rule.matches(&request("post", "/", &[])));
        assert!(!rule.matches(&request("GET", "/", &[])));
    }

    #[test]
    fn test_rules_deserialize_from_config() {
        let json = r#"[
            {"kind": "method"},
            {"kind": "header", "name": "Authorization"},
            {"kind": "query", "name": "name"},
            {"kind": "bypass_header", "name": "Cache-Status", "value": "bypass"},
            {"kind": "bypass_method", "method": "post"},
            {"kind": "cookie", "name": "session"}
        ]"#;

        let rules: Vec<Rule> = serde_json::from_str(json).unwrap();
        assert_eq!(
            rules,
            vec![
                Rule::Key(KeyRule::Method),
                Rule::Key(KeyRule::Header("Authorization".to_string())),
                Rule::Key(KeyRule::Query("name".to_string())),
                Rule::Bypass(BypassRule::HeaderEquals {
                    name: "Cache-Status".to_string(),
                    value: "bypass".to_string(),
                }),
                Rule::Bypass(BypassRule::MethodIn("post".to_string())),
                Rule::Unrecognized,
            ]
        );
    }
}
