//! Cached request client.
//!
//! [`CachedClient`] wraps an [`HttpClient`](crate::transport::HttpClient) and
//! answers repeated identical requests from storage until their ttl elapses.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod options;
pub mod outcome;

pub use builder::CachedClientBuilder;
pub use self::core::CachedClient;
pub use options::CacheOptions;
pub use outcome::CacheOutcome;
