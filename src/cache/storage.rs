//! In-memory table of memoized request futures.

use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;

/// A request future that any number of callers can await.
pub type SharedFetch<O> = Shared<BoxFuture<'static, O>>;

struct MemoEntry<O> {
  group: &'static str,
  future: SharedFetch<O>,
}

/// Keyed store of shared request futures.
///
/// An entry is either still in flight or already resolved; `Shared` hands
/// the resolved output to late callers without polling the request again.
pub struct MemoTable<O> {
  entries: HashMap<String, MemoEntry<O>>,
}

impl<O: Clone> MemoTable<O> {
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  pub fn get(&self, hash: &str) -> Option<SharedFetch<O>> {
    self.entries.get(hash).map(|e| e.future.clone())
  }

  pub fn insert(&mut self, hash: String, group: &'static str, future: SharedFetch<O>) {
    self.entries.insert(hash, MemoEntry { group, future });
  }

  /// Remove the entry only if it still holds `future`. A newer request
  /// stored under the same key is left alone.
  pub fn remove_if_same(&mut self, hash: &str, future: &SharedFetch<O>) -> bool {
    match self.entries.get(hash) {
      Some(entry) if entry.future.ptr_eq(future) => {
        self.entries.remove(hash);
        true
      }
      _ => false,
    }
  }

  pub fn remove(&mut self, hash: &str) -> bool {
    self.entries.remove(hash).is_some()
  }

  /// Remove every entry of a group, returning how many were dropped.
  pub fn remove_group(&mut self, group: &str) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, e| e.group != group);
    before - self.entries.len()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }
}

impl<O: Clone> Default for MemoTable<O> {
  fn default() -> Self {
    Self::new()
  }
}
