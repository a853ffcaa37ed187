//! Async query slot for data fetching with loading state.
//!
//! A `Query<T, R>` owns the last known data of type `T`, a loading flag and
//! at most one in-flight fetch producing `R`. Fetches run as spawned tasks;
//! their results come back over a channel and are applied only when the
//! owner calls `poll()` or `wait()`, so all state changes happen on the
//! owner's side.
//!
//! # Example
//!
//! ```ignore
//! let mut query: Query<Vec<Employee>> = Query::new("employees", replace);
//!
//! let gateway = gateway.clone();
//! query.fetch(async move { gateway.fetch_cached(Operation::Employees, &NoParams {}).await });
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use std::future::Future;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::api::FetchError;

/// Combines the previous data (if any) with a fetched result.
pub type Merge<T, R> = fn(Option<T>, R) -> T;

/// Merge that discards the previous data.
pub fn replace<T>(_previous: Option<T>, next: T) -> T {
  next
}

/// Async query for data fetching with state management.
///
/// Failed fetches keep the previous data and record the error message.
/// Invalidation drops the in-flight receiver, so a result that resolves
/// afterwards is never applied.
pub struct Query<T, R = T> {
  label: &'static str,
  data: Option<T>,
  loading: bool,
  last_error: Option<String>,
  generation: u64,
  merge: Merge<T, R>,
  receiver: Option<oneshot::Receiver<Result<R, FetchError>>>,
}

impl<T, R: Send + 'static> Query<T, R> {
  /// Create an empty query. `label` names the query in logs.
  pub fn new(label: &'static str, merge: Merge<T, R>) -> Self {
    Self {
      label,
      data: None,
      loading: false,
      last_error: None,
      generation: 0,
      merge,
      receiver: None,
    }
  }

  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  /// Message of the most recent failed fetch, cleared by the next success.
  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  /// Bumped by every fetch start and every invalidation.
  #[allow(dead_code)]
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Start a fetch unless one is already in flight.
  ///
  /// Returns `false` (and drops `future` unpolled) while loading.
  pub fn fetch<Fut>(&mut self, future: Fut) -> bool
  where
    Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
  {
    if self.loading {
      debug!(query = self.label, "Fetch already in flight");
      return false;
    }
    self.start_fetch(future);
    true
  }

  /// Start a fetch, discarding any one in flight.
  pub fn refetch<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
  {
    if self.receiver.take().is_some() {
      debug!(query = self.label, generation = self.generation, "Discarding in-flight fetch");
    }
    self.start_fetch(future);
  }

  /// Reset to empty, error included. Any in-flight result is discarded
  /// when it lands.
  pub fn invalidate(&mut self) {
    self.generation += 1;
    if self.receiver.take().is_some() {
      debug!(query = self.label, generation = self.generation, "Invalidated with fetch in flight");
    }
    self.data = None;
    self.loading = false;
    self.last_error = None;
  }

  /// Apply a pending result if it has arrived.
  ///
  /// Returns `true` if the state changed. Call this in your event loop
  /// tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      // Task dropped without sending
      Err(oneshot::error::TryRecvError::Closed) => Err(FetchError::Cancelled),
    };
    self.receiver = None;
    self.apply(result);
    true
  }

  /// Wait for the pending fetch, if any, and apply its result.
  ///
  /// Returns `true` if a result was applied.
  pub async fn wait(&mut self) -> bool {
    let result = match self.receiver.as_mut() {
      Some(rx) => rx.await.unwrap_or(Err(FetchError::Cancelled)),
      None => return false,
    };
    self.receiver = None;
    self.apply(result);
    true
  }

  fn apply(&mut self, result: Result<R, FetchError>) {
    self.loading = false;
    match result {
      Ok(next) => {
        let previous = self.data.take();
        self.data = Some((self.merge)(previous, next));
        self.last_error = None;
      }
      Err(e) => {
        warn!(query = self.label, generation = self.generation, error = %e, "Fetch failed");
        self.last_error = Some(e.to_string());
      }
    }
  }

  fn start_fetch<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<R, FetchError>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.loading = true;
    self.generation += 1;

    tokio::spawn(async move {
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(future.await);
    });
  }
}

// Query is not Clone because the receiver is owned.

impl<T: std::fmt::Debug, R> std::fmt::Debug for Query<T, R> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("label", &self.label)
      .field("data", &self.data)
      .field("loading", &self.loading)
      .field("last_error", &self.last_error)
      .field("generation", &self.generation)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  fn append(previous: Option<Vec<u32>>, next: Vec<u32>) -> Vec<u32> {
    let mut all = previous.unwrap_or_default();
    all.extend(next);
    all
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query: Query<Vec<u32>> = Query::new("test", replace);
    assert!(query.data().is_none());
    assert!(!query.is_loading());

    assert!(query.fetch(async { Ok(vec![1, 2, 3]) }));
    assert!(query.is_loading());

    assert!(query.wait().await);
    assert!(!query.is_loading());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error_keeps_data() {
    let mut query: Query<u32> = Query::new("test", replace);
    query.fetch(async { Ok(1) });
    query.wait().await;

    query.fetch(async { Err(FetchError::Transport("Something went wrong".to_string())) });
    query.wait().await;

    assert!(!query.is_loading());
    assert_eq!(query.data(), Some(&1));
    assert_eq!(query.last_error(), Some("Transport error: Something went wrong"));
  }

  #[tokio::test]
  async fn test_merge_accumulates() {
    let mut query: Query<Vec<u32>> = Query::new("test", append);
    query.fetch(async { Ok(vec![1]) });
    query.wait().await;
    query.fetch(async { Ok(vec![2, 3]) });
    query.wait().await;
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let mut query: Query<u32> = Query::new("test", replace);
    assert!(query.fetch(async {
      tokio::time::sleep(Duration::from_millis(20)).await;
      Ok(42)
    }));

    // Second fetch should be no-op
    assert!(!query.fetch(async { Ok(7) }));
    query.wait().await;
    assert_eq!(query.data(), Some(&42));
  }

  #[tokio::test]
  async fn test_refetch_discards_pending() {
    let (release, gate) = oneshot::channel::<()>();
    let mut query: Query<u32> = Query::new("test", replace);

    query.fetch(async move {
      let _ = gate.await;
      Ok(1)
    });
    query.refetch(async { Ok(2) });
    let _ = release.send(());

    query.wait().await;
    assert_eq!(query.data(), Some(&2));
  }

  #[tokio::test]
  async fn test_invalidate_discards_late_result() {
    let (release, gate) = oneshot::channel::<()>();
    let mut query: Query<u32> = Query::new("test", replace);
    query.fetch(async move {
      let _ = gate.await;
      Ok(1)
    });
    let generation = query.generation();

    query.invalidate();
    assert!(!query.is_loading());
    assert!(query.generation() > generation);

    let _ = release.send(());
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(!query.poll());
    assert!(!query.wait().await);
    assert!(query.data().is_none());
  }

  #[tokio::test]
  async fn test_invalidate_clears_error() {
    let mut query: Query<u32> = Query::new("test", replace);
    query.fetch(async { Err(FetchError::Transport("offline".to_string())) });
    query.wait().await;
    assert!(query.last_error().is_some());

    query.invalidate();
    assert!(query.last_error().is_none());
  }

  #[tokio::test]
  async fn test_poll_applies_when_ready() {
    let mut query: Query<u32> = Query::new("test", replace);
    assert!(!query.poll());

    query.fetch(async { Ok(5) });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&5));
    assert!(!query.poll());
  }
}
