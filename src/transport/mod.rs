//! HTTP transport seam. The cache only needs [`HttpClient::execute`];
//! [`ReqwestClient`] is the bundled implementation.

mod http;

pub use http::ReqwestClient;

use crate::types::{HttpResponse, RequestDescriptor};
use crate::Result;
use async_trait::async_trait;

/// Executes a request. Non-success outcomes are returned as `Err`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<HttpResponse>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Other(String),
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn execute(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        (**self).execute(request).await
    }
}
