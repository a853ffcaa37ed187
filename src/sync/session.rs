//! Review session: combines the three caches with the approval overlay
//! and decides what to invalidate and fetch when the filter changes.
//!
//! At most one transaction source is active. A scoped (single employee)
//! list takes precedence over the paginated feed, and the two are
//! invalidated against each other on every filter change.

use serde::de::IgnoredAny;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::api_types::SetTransactionApprovalParams;
use crate::api::types::{Employee, Transaction};
use crate::api::{FetchError, FetchGateway, Operation};

use super::employees::EmployeeDirectory;
use super::overlay::{ApprovalOverlay, ConfirmFailurePolicy};
use super::paginated::PaginatedTransactions;
use super::scoped::ScopedTransactions;

/// Progress of a full reload. Employees are loaded to completion before
/// the first transaction page is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStage {
  Idle,
  Employees,
  Transactions,
}

/// Settled approval confirmation
#[derive(Debug)]
struct Confirmation {
  transaction_id: String,
  value: bool,
  /// Overlay entry before the optimistic update
  previous: Option<bool>,
  result: Result<(), FetchError>,
}

pub struct ReviewSession {
  gateway: FetchGateway,
  policy: ConfirmFailurePolicy,
  employees: EmployeeDirectory,
  paginated: PaginatedTransactions,
  scoped: ScopedTransactions,
  overlay: ApprovalOverlay,
  reload: ReloadStage,
  /// Current filter; the sentinel means all employees
  selected: Employee,
  confirm_tx: mpsc::UnboundedSender<Confirmation>,
  confirm_rx: mpsc::UnboundedReceiver<Confirmation>,
  confirmations_in_flight: usize,
}

impl ReviewSession {
  pub fn new(gateway: FetchGateway, policy: ConfirmFailurePolicy) -> Self {
    let (confirm_tx, confirm_rx) = mpsc::unbounded_channel();
    Self {
      gateway,
      policy,
      employees: EmployeeDirectory::new(),
      paginated: PaginatedTransactions::new(),
      scoped: ScopedTransactions::new(),
      overlay: ApprovalOverlay::new(),
      reload: ReloadStage::Idle,
      selected: Employee::all(),
      confirm_tx,
      confirm_rx,
      confirmations_in_flight: 0,
    }
  }

  // ===== Actions =====

  /// Show all employees: drop the scoped list, then load the directory and
  /// the first transaction page, in that order, if they are empty.
  ///
  /// A failed directory load does not stop the transaction load.
  pub fn load_all(&mut self) {
    info!("Loading all transactions");
    self.selected = Employee::all();
    self.scoped.invalidate();
    self.reload = ReloadStage::Employees;
    if self.employees.employees().is_none() {
      self.employees.fetch_all(&self.gateway);
    }
    self.advance_reload();
  }

  /// Apply a filter selection. `None` and the sentinel select all
  /// employees.
  pub fn on_employee_filter_change(&mut self, employee: Option<&Employee>) {
    let employee = match employee {
      Some(e) if !e.is_sentinel() => e,
      _ => return self.load_all(),
    };

    info!(employee_id = %employee.id, "Filtering by employee");
    self.selected = employee.clone();
    if self.reload != ReloadStage::Idle {
      debug!(stage = ?self.reload, "Abandoning reload for scoped selection");
      self.reload = ReloadStage::Idle;
    }
    self.paginated.invalidate();
    self.scoped.fetch_for_employee(&self.gateway, &employee.id);
  }

  /// Request the next page of the paginated feed. Ignored while a scoped
  /// list is active or when no further page exists.
  pub fn on_request_more_pages(&mut self) -> bool {
    if !self.has_more_data() {
      debug!("No more pages to request");
      return false;
    }
    self.paginated.fetch_next_page(&self.gateway)
  }

  /// Toggle a transaction's approval: update the overlay now, confirm with
  /// the server in the background.
  pub fn on_transaction_approval(&mut self, transaction_id: &str, value: bool) {
    let previous = self.set_approval(transaction_id, value);
    self.send_confirmation(transaction_id, value, previous);
  }

  /// Optimistic overlay update, visible in the next `transactions()`.
  /// Returns the previous overlay entry.
  pub fn set_approval(&mut self, transaction_id: &str, value: bool) -> Option<bool> {
    self.overlay.set(transaction_id, value)
  }

  /// Send the uncached approval request. Under the revert policy a
  /// failure removes the overlay entry.
  #[allow(dead_code)]
  pub fn confirm_approval(&mut self, transaction_id: &str, value: bool) {
    self.send_confirmation(transaction_id, value, None);
  }

  fn send_confirmation(&mut self, transaction_id: &str, value: bool, previous: Option<bool>) {
    let gateway = self.gateway.clone();
    let tx = self.confirm_tx.clone();
    let transaction_id = transaction_id.to_string();
    self.confirmations_in_flight += 1;

    tokio::spawn(async move {
      let params = SetTransactionApprovalParams {
        transaction_id: transaction_id.clone(),
        value,
      };
      // Any acknowledgement body counts as success
      let result = gateway
        .fetch_uncached::<IgnoredAny, _>(Operation::SetTransactionApproval, &params)
        .await
        .map(|_| ());
      let _ = tx.send(Confirmation {
        transaction_id,
        value,
        previous,
        result,
      });
    });
  }

  /// Forget every memoized read, clear all caches and load the current
  /// selection again. Overlay entries are kept.
  pub fn refresh(&mut self) {
    let forgotten: usize = Operation::READS
      .iter()
      .map(|op| self.gateway.forget_operation(*op))
      .sum();
    info!(
      forgotten,
      remaining = self.gateway.cached_requests(),
      "Refreshing from server"
    );

    self.employees.invalidate();
    self.paginated.invalidate();
    self.scoped.invalidate();
    self.reload = ReloadStage::Idle;

    let selected = self.selected.clone();
    if selected.is_sentinel() {
      self.load_all();
    } else {
      self.employees.fetch_all(&self.gateway);
      self.on_employee_filter_change(Some(&selected));
    }
  }

  // ===== Result handling =====

  /// Apply every result that has arrived. Returns `true` if anything
  /// changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = self.employees.poll();
    changed |= self.paginated.poll();
    changed |= self.scoped.poll();

    while let Ok(confirmation) = self.confirm_rx.try_recv() {
      self.apply_confirmation(confirmation);
      changed = true;
    }

    changed |= self.advance_reload();
    changed
  }

  /// Wait until nothing is in flight, applying results as they arrive.
  pub async fn settle(&mut self) {
    loop {
      self.poll();

      if self.employees.is_loading() {
        self.employees.wait().await;
      } else if self.paginated.is_loading() {
        self.paginated.wait().await;
      } else if self.scoped.is_loading() {
        self.scoped.wait().await;
      } else if self.confirmations_in_flight > 0 {
        match self.confirm_rx.recv().await {
          Some(confirmation) => self.apply_confirmation(confirmation),
          None => self.confirmations_in_flight = 0,
        }
      } else {
        break;
      }
    }
  }

  fn apply_confirmation(&mut self, confirmation: Confirmation) {
    self.confirmations_in_flight = self.confirmations_in_flight.saturating_sub(1);
    let Confirmation {
      transaction_id,
      value,
      previous,
      result,
    } = confirmation;

    let Err(e) = result else {
      debug!(%transaction_id, value, "Approval confirmed");
      return;
    };
    warn!(%transaction_id, value, error = %e, "Failed to update transaction approval");

    // A later toggle of the same transaction wins over the revert
    if self.policy == ConfirmFailurePolicy::Revert && self.overlay.get(&transaction_id) == Some(value) {
      info!(%transaction_id, "Reverting optimistic approval");
      self.overlay.restore(&transaction_id, previous);
    }
  }

  /// Move the reload forward as far as completed fetches allow.
  fn advance_reload(&mut self) -> bool {
    let start = self.reload;
    loop {
      match self.reload {
        ReloadStage::Idle => break,
        ReloadStage::Employees => {
          if self.employees.is_loading() {
            break;
          }
          self.reload = ReloadStage::Transactions;
          if self.paginated.page().is_none() {
            self.paginated.fetch_next_page(&self.gateway);
          }
        }
        ReloadStage::Transactions => {
          if self.paginated.is_loading() {
            break;
          }
          self.reload = ReloadStage::Idle;
        }
      }
    }
    self.reload != start
  }

  // ===== Outputs =====

  pub fn employees(&self) -> Option<&[Employee]> {
    self.employees.employees()
  }

  pub fn employee(&self, id: &str) -> Option<&Employee> {
    self.employees.find(id)
  }

  /// Filter choices, sentinel first
  pub fn selection_items(&self) -> Vec<Employee> {
    self.employees.selection_items()
  }

  pub fn employees_loading(&self) -> bool {
    self.employees.is_loading()
  }

  pub fn selected(&self) -> &Employee {
    &self.selected
  }

  /// The scoped list if present, else the paginated feed.
  pub fn active_source(&self) -> Option<&[Transaction]> {
    self.scoped.transactions().or_else(|| self.paginated.transactions())
  }

  /// The active source with overlay approvals applied.
  pub fn transactions(&self) -> Option<Vec<Transaction>> {
    self.active_source().map(|source| self.overlay.apply(source))
  }

  pub fn transactions_loading(&self) -> bool {
    self.paginated.is_loading() || self.scoped.is_loading()
  }

  /// Whether to offer the next page. Always false while scoped.
  pub fn has_more_data(&self) -> bool {
    !self.scoped.is_active() && self.paginated.has_more()
  }

  /// True while a full reload is in progress
  pub fn is_loading(&self) -> bool {
    self.reload != ReloadStage::Idle
  }

  pub fn reload_stage(&self) -> ReloadStage {
    self.reload
  }

  #[allow(dead_code)]
  pub fn overlay(&self) -> &ApprovalOverlay {
    &self.overlay
  }

  pub fn confirmations_in_flight(&self) -> usize {
    self.confirmations_in_flight
  }

  /// Most recent fetch failure across the caches, if any
  pub fn last_error(&self) -> Option<&str> {
    self
      .scoped
      .last_error()
      .or_else(|| self.paginated.last_error())
      .or_else(|| self.employees.last_error())
  }
}
