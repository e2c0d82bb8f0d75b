//! Request descriptor: everything the cache needs to know about an outgoing call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP request description handed to both the cache and the transport.
///
/// `query` and `body` are kept as JSON values so that key derivation can
/// serialize them canonically (object keys are emitted in sorted order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            query: None,
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("get", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("post", url)
    }

    pub fn with_query(mut self, query: serde_json::Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Lower-cased method, the form used for key derivation and dispatch.
    pub fn normalized_method(&self) -> String {
        self.method.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_fields() {
        let req = RequestDescriptor::post("/users")
            .with_query(json!({"page": 2}))
            .with_body(json!({"name": "ada"}))
            .with_header("x-trace", "abc");
        assert_eq!(req.method, "post");
        assert_eq!(req.query, Some(json!({"page": 2})));
        assert_eq!(req.body, Some(json!({"name": "ada"})));
        assert_eq!(req.headers.get("x-trace").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_normalized_method() {
        assert_eq!(RequestDescriptor::new("GET", "/a").normalized_method(), "get");
    }

    #[test]
    fn test_deserialize_minimal() {
        let req: RequestDescriptor =
            serde_json::from_value(json!({"method": "get", "url": "/a"})).unwrap();
        assert_eq!(req, RequestDescriptor::get("/a"));
    }
}
