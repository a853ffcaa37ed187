//! Locally applied approval overrides.

use serde::Deserialize;
use std::collections::HashMap;

use crate::api::types::Transaction;

/// What to do with an optimistic approval when the server rejects it.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmFailurePolicy {
  /// Keep showing the optimistic value
  #[default]
  Keep,
  /// Restore the entry that existed before the toggle
  Revert,
}

/// Transaction id to displayed approval. Absent ids show the fetched
/// value. Entries are never dropped implicitly, only by an explicit
/// `restore`.
#[derive(Debug, Clone, Default)]
pub struct ApprovalOverlay {
  entries: HashMap<String, bool>,
}

impl ApprovalOverlay {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or overwrite an entry, returning the previous one.
  pub fn set(&mut self, transaction_id: &str, value: bool) -> Option<bool> {
    self.entries.insert(transaction_id.to_string(), value)
  }

  pub fn get(&self, transaction_id: &str) -> Option<bool> {
    self.entries.get(transaction_id).copied()
  }

  /// Put back an earlier entry state; `None` removes the entry.
  pub fn restore(&mut self, transaction_id: &str, previous: Option<bool>) {
    match previous {
      Some(value) => {
        self.entries.insert(transaction_id.to_string(), value);
      }
      None => {
        self.entries.remove(transaction_id);
      }
    }
  }

  /// Displayed approval for a fetched transaction
  pub fn approved(&self, transaction: &Transaction) -> bool {
    self.get(&transaction.id).unwrap_or(transaction.approved)
  }

  /// Copies of `transactions` with the overlay applied. The input is not
  /// modified.
  pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
      .iter()
      .map(|t| Transaction {
        approved: self.approved(t),
        ..t.clone()
      })
      .collect()
  }

  #[allow(dead_code)]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
