use crate::types::{HttpResponse, RequestDescriptor};

/// Which path served a request.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheOutcome<T = serde_json::Value> {
    /// Payload read from storage; the transport was not contacted.
    Hit(T),
    /// Real transport response (also returned when caching is disabled).
    Miss(HttpResponse<T>),
}

impl<T> CacheOutcome<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit(_))
    }

    pub fn data(&self) -> &T {
        match self {
            CacheOutcome::Hit(data) => data,
            CacheOutcome::Miss(resp) => &resp.data,
        }
    }

    /// Collapse to the common response shape. A hit becomes a 200 response
    /// that echoes the request's headers.
    pub fn into_response(self, request: &RequestDescriptor) -> HttpResponse<T> {
        match self {
            CacheOutcome::Hit(data) => HttpResponse::from_cache(data, request),
            CacheOutcome::Miss(resp) => resp,
        }
    }
}
