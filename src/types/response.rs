//! Response shape shared by the transport and the cache.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::request::RequestDescriptor;

/// Successful response as seen by callers.
///
/// Responses served from the cache carry status 200 and echo the request's
/// headers, so call sites can treat both paths the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse<T = serde_json::Value> {
    pub data: T,
    pub status: u16,
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl<T> HttpResponse<T> {
    pub fn new(data: T, status: u16) -> Self {
        Self {
            data,
            status,
            status_text: String::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Synthesize the response returned on a cache hit.
    pub fn from_cache(data: T, request: &RequestDescriptor) -> Self {
        Self {
            data,
            status: 200,
            status_text: "OK".to_string(),
            headers: request.headers.clone(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpResponse<serde_json::Value> {
    /// Deserialize the JSON payload into a concrete type.
    pub fn json<T: DeserializeOwned>(self) -> crate::Result<HttpResponse<T>> {
        let data = serde_json::from_value(self.data)?;
        Ok(HttpResponse {
            data,
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_cache_echoes_request_headers() {
        let req = RequestDescriptor::get("/a").with_header("accept", "application/json");
        let resp = HttpResponse::from_cache(json!([1, 2]), &req);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.status_text, "OK");
        assert_eq!(resp.headers, req.headers);
        assert!(resp.is_success());
    }

    #[test]
    fn test_json_conversion() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct User {
            id: u32,
        }
        let resp = HttpResponse::new(json!({"id": 7}), 201).json::<User>().unwrap();
        assert_eq!(resp.data, User { id: 7 });
        assert_eq!(resp.status, 201);
        assert!(HttpResponse::new(json!("x"), 200).json::<User>().is_err());
    }
}
