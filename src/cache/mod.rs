//! Generic request memoization.
//!
//! This module is transport-agnostic. It provides:
//! - A `QueryKey` trait giving requests a stable hash and a group name
//! - A `MemoTable` holding one shared future per key
//! - A `CacheLayer` that joins identical in-flight requests, keeps
//!   resolved results for the session, and evicts failures

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use traits::QueryKey;
