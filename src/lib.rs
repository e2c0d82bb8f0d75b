//! # request-cache
//!
//! Request-caching decorator for HTTP clients: successful responses are
//! memoized in a key/value storage backend and identical requests are served
//! from storage until the entry's ttl elapses.
//!
//! ## Overview
//!
//! - **Transparent**: hits and misses return the same [`HttpResponse`] shape,
//!   so call sites never branch on where the data came from.
//! - **Two backends**: a persistent store (file-backed when a directory is
//!   configured) and a session store living as long as the process.
//! - **Deterministic keys**: `method-url-query-body`, or a caller-supplied
//!   key function per call.
//! - **Error invalidation**: with `clear_on_error`, a failed refresh drops the
//!   entry; the transport error always reaches the caller untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use request_cache::{CachedClient, RequestDescriptor, ReqwestClient};
//!
//! #[tokio::main]
//! async fn main() -> request_cache::Result<()> {
//!     let http = ReqwestClient::new()?.with_base_url("https://api.example.com")?;
//!     let client = CachedClient::new(http);
//!
//!     let req = RequestDescriptor::get("/users");
//!     let first = client.cached_request(&req, None).await?; // transport
//!     let again = client.cached_request(&req, None).await?; // storage
//!     assert_eq!(first.data, again.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`CachedClient`], per-call [`CacheOptions`], [`CacheOutcome`] |
//! | [`cache`] | Entry store, key derivation, clock, statistics |
//! | [`storage`] | Raw key/value backends |
//! | [`transport`] | [`HttpClient`] seam and the reqwest implementation |
//! | [`config`] | [`CacheConfig`] from code, environment or file |
//! | [`types`] | Request and response shapes |

pub mod cache;
pub mod client;
pub mod config;
pub mod storage;
pub mod transport;
pub mod types;

pub use client::{CacheOptions, CacheOutcome, CachedClient, CachedClientBuilder};
pub use config::CacheConfig;
pub use storage::{Backend, FileStorage, MemoryStorage, Storage};
pub use transport::{HttpClient, ReqwestClient};
pub use types::{HttpResponse, RequestDescriptor};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
