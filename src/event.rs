use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// A line typed on stdin
  Line(String),
  /// Periodic tick for applying fetch results
  Tick,
  /// Stdin reached end of input
  Closed,
}

/// Event handler that produces events from stdin lines and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn stdin reader
    let input_tx = tx.clone();
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        match lines.next_line().await {
          Ok(Some(line)) => {
            if input_tx.send(Event::Line(line)).is_err() {
              break;
            }
          }
          Ok(None) | Err(_) => {
            let _ = input_tx.send(Event::Closed);
            break;
          }
        }
      }
    });

    // Spawn ticker
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(tick_rate);
      loop {
        interval.tick().await;
        if tx.send(Event::Tick).is_err() {
          break;
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
