//! Paginated transaction cache.
//!
//! Pages accumulate in request order. The cursor for the next request is
//! the `next_page` of the last page received; `None` ends the feed.

use tracing::debug;

use crate::api::api_types::{PaginatedRequestParams, PaginatedResponse};
use crate::api::types::Transaction;
use crate::api::{FetchGateway, Operation};
use crate::query::Query;

pub type TransactionPage = PaginatedResponse<Vec<Transaction>>;

/// Append a page to what has been accumulated so far.
fn append_page(previous: Option<TransactionPage>, page: TransactionPage) -> TransactionPage {
  match previous {
    None => page,
    Some(mut accumulated) => {
      accumulated.data.extend(page.data);
      accumulated.next_page = page.next_page;
      accumulated
    }
  }
}

pub struct PaginatedTransactions {
  query: Query<TransactionPage>,
}

impl PaginatedTransactions {
  pub fn new() -> Self {
    Self {
      query: Query::new("paginatedTransactions", append_page),
    }
  }

  /// Request the next page: page 0 when empty, otherwise the stored
  /// cursor.
  ///
  /// No-op while a page is in flight (the cursor has not advanced yet) and
  /// once the feed is exhausted.
  pub fn fetch_next_page(&mut self, gateway: &FetchGateway) -> bool {
    let page = match self.query.data() {
      None => 0,
      Some(current) => match current.next_page {
        Some(page) => page,
        None => {
          debug!("No further transaction pages");
          return false;
        }
      },
    };

    let gateway = gateway.clone();
    self.query.fetch(async move {
      gateway
        .fetch_cached(
          Operation::PaginatedTransactions,
          &PaginatedRequestParams { page: Some(page) },
        )
        .await
    })
  }

  /// True once at least one page exists and the last page had a cursor.
  pub fn has_more(&self) -> bool {
    self
      .query
      .data()
      .is_some_and(|current| current.next_page.is_some())
  }

  pub fn invalidate(&mut self) {
    self.query.invalidate();
  }

  pub fn page(&self) -> Option<&TransactionPage> {
    self.query.data()
  }

  pub fn transactions(&self) -> Option<&[Transaction]> {
    self.query.data().map(|p| p.data.as_slice())
  }

  pub fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  pub fn last_error(&self) -> Option<&str> {
    self.query.last_error()
  }

  pub fn poll(&mut self) -> bool {
    self.query.poll()
  }

  pub async fn wait(&mut self) -> bool {
    self.query.wait().await
  }
}

impl Default for PaginatedTransactions {
  fn default() -> Self {
    Self::new()
  }
}
