//! Transactions scoped to a single employee.

use tracing::debug;

use crate::api::api_types::RequestByEmployeeParams;
use crate::api::types::{is_sentinel_id, Transaction};
use crate::api::{FetchGateway, Operation};
use crate::query::{replace, Query};

/// One employee's full transaction list.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeTransactions {
  pub employee_id: String,
  pub transactions: Vec<Transaction>,
}

pub struct ScopedTransactions {
  query: Query<EmployeeTransactions>,
  /// Employee of the most recent request, loaded or in flight
  requested: Option<String>,
}

impl ScopedTransactions {
  pub fn new() -> Self {
    Self {
      query: Query::new("transactionsByEmployee", replace),
      requested: None,
    }
  }

  /// Request the transactions of one employee, replacing the current list
  /// when it arrives.
  ///
  /// No-op for the sentinel id, and for the employee that is already
  /// loaded or loading. A different employee supersedes any request in
  /// flight.
  pub fn fetch_for_employee(&mut self, gateway: &FetchGateway, employee_id: &str) -> bool {
    if is_sentinel_id(employee_id) {
      debug!("Ignoring scoped fetch for the all-employees filter");
      return false;
    }

    let already_loaded = self.employee_id() == Some(employee_id);
    let already_loading = self.query.is_loading() && self.requested.as_deref() == Some(employee_id);
    if already_loading || (already_loaded && !self.query.is_loading()) {
      debug!(employee_id, "Employee transactions already present");
      return false;
    }

    self.requested = Some(employee_id.to_string());
    let gateway = gateway.clone();
    let employee_id = employee_id.to_string();
    self.query.refetch(async move {
      let params = RequestByEmployeeParams {
        employee_id: employee_id.clone(),
      };
      let transactions = gateway
        .fetch_cached(Operation::TransactionsByEmployee, &params)
        .await?;
      Ok(EmployeeTransactions {
        employee_id,
        transactions,
      })
    });
    true
  }

  pub fn invalidate(&mut self) {
    self.query.invalidate();
    self.requested = None;
  }

  /// Employee whose transactions are currently held
  pub fn employee_id(&self) -> Option<&str> {
    self.query.data().map(|d| d.employee_id.as_str())
  }

  pub fn transactions(&self) -> Option<&[Transaction]> {
    self.query.data().map(|d| d.transactions.as_slice())
  }

  /// True when holding or fetching a scoped list
  pub fn is_active(&self) -> bool {
    self.query.data().is_some() || self.query.is_loading()
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

impl Default for ScopedTransactions {
  fn default() -> Self {
    Self::new()
  }
}
