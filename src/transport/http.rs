use super::{HttpClient, TransportError};
use crate::types::{HttpResponse, RequestDescriptor};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Method, Proxy};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;
use url::Url;

/// reqwest-backed [`HttpClient`].
///
/// Relative descriptor URLs are resolved against an optional base URL; the
/// JSON `query` object becomes query parameters and `body` is sent as JSON.
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("REQUEST_CACHE_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("REQUEST_CACHE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self::from_client(client))
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Some(Url::parse(base_url).map_err(TransportError::from)?);
        Ok(self)
    }

    fn resolve_url(&self, url: &str) -> Result<Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        Ok(resolved.map_err(TransportError::from)?)
    }
}

/// Flatten a JSON object into query pairs. Arrays repeat the key, nulls are
/// dropped, scalars other than strings use their JSON text.
fn query_pairs(query: &serde_json::Value) -> Result<Vec<(String, String)>> {
    let map = match query {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => return Ok(Vec::new()),
        other => {
            return Err(Error::Transport(TransportError::Other(format!(
                "query must be a JSON object, got {}",
                other
            ))))
        }
    };
    let mut pairs = Vec::new();
    for (k, v) in map {
        match v {
            serde_json::Value::Null => {}
            serde_json::Value::Array(items) => {
                for item in items {
                    pairs.push((k.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((k.clone(), scalar_text(other))),
        }
    }
    Ok(pairs)
}

fn scalar_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;
        let url = self.resolve_url(&request.url)?;

        let mut req = self.client.request(method, url);
        if let Some(query) = &request.query {
            req = req.query(&query_pairs(query)?);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }

        let resp = req.send().await.map_err(TransportError::from)?;
        let status = resp.status();
        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let text = resp.text().await.map_err(TransportError::from)?;

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                message: text,
            });
        }

        let data = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        };

        Ok(HttpResponse::new(data, status.as_u16())
            .with_status_text(status.canonical_reason().unwrap_or_default())
            .with_headers(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs() {
        let pairs = query_pairs(&json!({"q": "rust", "page": 2, "tag": ["a", "b"], "skip": null}))
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "rust".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
        assert!(query_pairs(&json!([1])).is_err());
        assert!(query_pairs(&serde_json::Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_url() {
        let client = ReqwestClient::from_client(reqwest::Client::new())
            .with_base_url("http://localhost:8080/api/")
            .unwrap();
        assert_eq!(
            client.resolve_url("users").unwrap().as_str(),
            "http://localhost:8080/api/users"
        );
        assert_eq!(
            client.resolve_url("https://example.com/x").unwrap().as_str(),
            "https://example.com/x"
        );

        let bare = ReqwestClient::from_client(reqwest::Client::new());
        assert!(matches!(
            bare.resolve_url("/relative"),
            Err(Error::Transport(TransportError::Url(_)))
        ));
    }
}
