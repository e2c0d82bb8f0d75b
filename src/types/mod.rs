//! # Types Module
//!
//! Request and response shapes exchanged between callers, the cache layer and
//! the HTTP transport.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestDescriptor`] | Method, URL, query, body and headers of a call |
//! | [`HttpResponse`] | Response shape returned for both cache hits and misses |

pub mod request;
pub mod response;

pub use request::RequestDescriptor;
pub use response::HttpResponse;
