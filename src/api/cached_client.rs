//! Fetch gateway: the transport wrapped with request memoization.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::cache::CacheLayer;

use super::api_types::Operation;
use super::cache::RequestKey;
use super::client::Transport;
use super::error::FetchError;

/// Single point of network access.
///
/// Reads go through `fetch_cached`, which memoizes by (operation, params)
/// for the lifetime of the gateway. Mutations go through `fetch_uncached`.
/// Clones share the transport and the memo table.
#[derive(Clone)]
pub struct FetchGateway {
  transport: Arc<dyn Transport>,
  cache: CacheLayer<Value, FetchError>,
}

impl FetchGateway {
  pub fn new(transport: Arc<dyn Transport>) -> Self {
    Self {
      transport,
      cache: CacheLayer::new(),
    }
  }

  /// Memoized request. Identical in-flight or resolved requests are not
  /// reissued.
  pub async fn fetch_cached<T, P>(&self, operation: Operation, params: &P) -> Result<T, FetchError>
  where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
  {
    let key = RequestKey::new(operation, params)?;
    let value = self
      .cache
      .fetch(&key, || self.transport.request(operation, key.params.clone()))
      .await?;
    decode(value)
  }

  /// Always issues a fresh request (not cached - write operation).
  pub async fn fetch_uncached<T, P>(&self, operation: Operation, params: &P) -> Result<T, FetchError>
  where
    T: DeserializeOwned,
    P: Serialize + ?Sized,
  {
    let params = serde_json::to_value(params)?;
    let value = self.transport.request(operation, params).await?;
    decode(value)
  }

  /// Drop the memoized result of one request.
  #[allow(dead_code)]
  pub fn forget<P: Serialize + ?Sized>(&self, operation: Operation, params: &P) -> bool {
    match RequestKey::new(operation, params) {
      Ok(key) => self.cache.forget(&key),
      Err(_) => false,
    }
  }

  /// Drop every memoized result of an operation.
  pub fn forget_operation(&self, operation: Operation) -> usize {
    self.cache.forget_group(operation.as_str())
  }

  pub fn cached_requests(&self) -> usize {
    self.cache.len()
  }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, FetchError> {
  Ok(serde_json::from_value(value)?)
}
