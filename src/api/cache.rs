//! Memoization keys for remote operations.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

use super::api_types::Operation;
use super::error::FetchError;

/// Identifies one remote call: the operation plus its parameters in
/// canonical JSON form.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestKey {
  pub operation: Operation,
  pub params: Value,
}

impl RequestKey {
  pub fn new<P: Serialize + ?Sized>(operation: Operation, params: &P) -> Result<Self, FetchError> {
    Ok(Self {
      operation,
      params: serde_json::to_value(params)?,
    })
  }
}

impl QueryKey for RequestKey {
  fn cache_hash(&self) -> String {
    // serde_json objects keep keys sorted, so equal params print equally
    let input = format!("{}:{}", self.operation, self.params);

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn group(&self) -> &'static str {
    self.operation.as_str()
  }

  fn description(&self) -> String {
    format!("{} {}", self.operation, self.params)
  }
}
