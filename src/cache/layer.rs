//! Cache layer that memoizes request futures by key.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::storage::MemoTable;
use super::traits::QueryKey;

/// Memoizing layer in front of a request function.
///
/// Entries live until explicitly forgotten; there is no expiry. A request
/// that fails is evicted once it settles so the next caller issues a new
/// one. Clones share the same table.
pub struct CacheLayer<V, E> {
  table: Arc<Mutex<MemoTable<Result<V, E>>>>,
}

impl<V, E> CacheLayer<V, E>
where
  V: Clone + Send + Sync + 'static,
  E: Clone + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      table: Arc::new(Mutex::new(MemoTable::new())),
    }
  }

  fn lock(&self) -> MutexGuard<'_, MemoTable<Result<V, E>>> {
    // The table holds no invariants a panicking holder could break.
    self.table.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Fetch through the memo table.
  ///
  /// If an entry exists for `key` (in flight or resolved) its result is
  /// returned and `fetcher` is never called. Otherwise `fetcher` is called
  /// once and its future is stored for later callers.
  pub async fn fetch<K, F>(&self, key: &K, fetcher: F) -> Result<V, E>
  where
    K: QueryKey,
    F: FnOnce() -> BoxFuture<'static, Result<V, E>>,
  {
    let hash = key.cache_hash();

    let shared = {
      let mut table = self.lock();
      match table.get(&hash) {
        Some(existing) => {
          debug!(request = %key.description(), "Reusing memoized request");
          existing
        }
        None => {
          let shared = fetcher().shared();
          table.insert(hash.clone(), key.group(), shared.clone());
          shared
        }
      }
    };

    let result = shared.clone().await;

    if result.is_err() && self.lock().remove_if_same(&hash, &shared) {
      debug!(request = %key.description(), "Evicted failed request");
    }

    result
  }

  /// Drop the entry for one key.
  pub fn forget<K: QueryKey>(&self, key: &K) -> bool {
    self.lock().remove(&key.cache_hash())
  }

  /// Drop every entry in a group.
  pub fn forget_group(&self, group: &str) -> usize {
    self.lock().remove_group(group)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }
}

impl<V, E> Default for CacheLayer<V, E>
where
  V: Clone + Send + Sync + 'static,
  E: Clone + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<V, E> Clone for CacheLayer<V, E> {
  fn clone(&self) -> Self {
    Self {
      table: Arc::clone(&self.table),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use tokio::sync::oneshot;

  struct Key(&'static str);

  impl QueryKey for Key {
    fn cache_hash(&self) -> String {
      self.0.to_string()
    }

    fn group(&self) -> &'static str {
      "test"
    }

    fn description(&self) -> String {
      self.0.to_string()
    }
  }

  #[tokio::test]
  async fn test_resolved_entry_is_reused() {
    let layer: CacheLayer<u32, String> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..3 {
      let calls = calls.clone();
      let value = layer
        .fetch(&Key("a"), move || {
          async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 10) }.boxed()
        })
        .await;
      assert_eq!(value, Ok(10));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(layer.len(), 1);
  }

  #[tokio::test]
  async fn test_in_flight_request_is_joined() {
    let layer: CacheLayer<u32, String> = CacheLayer::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (release, gate) = oneshot::channel::<()>();

    let first = {
      let layer = layer.clone();
      let calls = calls.clone();
      tokio::spawn(async move {
        layer
          .fetch(&Key("a"), move || {
            async move {
              calls.fetch_add(1, Ordering::SeqCst);
              let _ = gate.await;
              Ok(7)
            }
            .boxed()
          })
          .await
      })
    };
    while calls.load(Ordering::SeqCst) == 0 {
      tokio::task::yield_now().await;
    }

    let second = {
      let layer = layer.clone();
      let calls = calls.clone();
      tokio::spawn(async move {
        layer
          .fetch(&Key("a"), move || {
            async move {
              calls.fetch_add(1, Ordering::SeqCst);
              Ok(8)
            }
            .boxed()
          })
          .await
      })
    };
    tokio::task::yield_now().await;

    release.send(()).unwrap();
    assert_eq!(first.await.unwrap(), Ok(7));
    assert_eq!(second.await.unwrap(), Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_failure_is_evicted() {
    let layer: CacheLayer<u32, String> = CacheLayer::new();

    let failed = layer
      .fetch(&Key("a"), || async { Err("down".to_string()) }.boxed())
      .await;
    assert_eq!(failed, Err("down".to_string()));
    assert_eq!(layer.len(), 0);

    let retried = layer.fetch(&Key("a"), || async { Ok(1) }.boxed()).await;
    assert_eq!(retried, Ok(1));
  }

  #[tokio::test]
  async fn test_forget_forces_new_request() {
    let layer: CacheLayer<u32, String> = CacheLayer::new();
    let _ = layer.fetch(&Key("a"), || async { Ok(1) }.boxed()).await;
    let _ = layer.fetch(&Key("b"), || async { Ok(2) }.boxed()).await;

    assert!(layer.forget(&Key("a")));
    let value = layer.fetch(&Key("a"), || async { Ok(3) }.boxed()).await;
    assert_eq!(value, Ok(3));

    assert_eq!(layer.forget_group("test"), 2);
    assert_eq!(layer.len(), 0);
  }
}
