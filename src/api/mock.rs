//! Scripted in-process transport for tests.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use super::api_types::Operation;
use super::client::Transport;
use super::error::FetchError;

struct Reply {
  result: Result<Value, FetchError>,
  gate: Option<oneshot::Receiver<()>>,
}

/// Replies from per-operation queues in call order and records every call.
/// A call with nothing queued fails with a transport error.
#[derive(Default)]
pub struct MockTransport {
  replies: Mutex<HashMap<Operation, VecDeque<Reply>>>,
  calls: Mutex<Vec<(Operation, Value)>>,
}

impl MockTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  fn push(&self, operation: Operation, reply: Reply) {
    self
      .replies
      .lock()
      .unwrap()
      .entry(operation)
      .or_default()
      .push_back(reply);
  }

  pub fn reply(&self, operation: Operation, value: Value) {
    self.push(
      operation,
      Reply {
        result: Ok(value),
        gate: None,
      },
    );
  }

  pub fn fail(&self, operation: Operation, error: FetchError) {
    self.push(
      operation,
      Reply {
        result: Err(error),
        gate: None,
      },
    );
  }

  /// Queue a reply that is held back until the returned sender fires.
  pub fn reply_gated(&self, operation: Operation, result: Result<Value, FetchError>) -> oneshot::Sender<()> {
    let (release, gate) = oneshot::channel();
    self.push(
      operation,
      Reply {
        result,
        gate: Some(gate),
      },
    );
    release
  }

  /// Params of every call made for `operation`, in order.
  pub fn calls(&self, operation: Operation) -> Vec<Value> {
    self
      .calls
      .lock()
      .unwrap()
      .iter()
      .filter(|(op, _)| *op == operation)
      .map(|(_, params)| params.clone())
      .collect()
  }

  pub fn call_count(&self, operation: Operation) -> usize {
    self.calls(operation).len()
  }
}

impl Transport for MockTransport {
  fn request(&self, operation: Operation, params: Value) -> BoxFuture<'static, Result<Value, FetchError>> {
    self.calls.lock().unwrap().push((operation, params));
    let reply = self
      .replies
      .lock()
      .unwrap()
      .get_mut(&operation)
      .and_then(|queue| queue.pop_front());

    async move {
      let Some(Reply { result, gate }) = reply else {
        return Err(FetchError::Transport(format!("no scripted reply for {}", operation)));
      };
      if let Some(gate) = gate {
        let _ = gate.await;
      }
      result
    }
    .boxed()
  }
}
