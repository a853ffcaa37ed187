//! Plain-text rendering of session state.

use std::fmt::Write;

use crate::api::types::{Employee, Transaction};
use crate::commands::get_suggestions;
use crate::sync::ReviewSession;

/// Render the transaction list for the current filter
pub fn render_transactions(session: &ReviewSession) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Filter: {}", session.selected().display_name());

  match session.transactions() {
    None if session.transactions_loading() || session.is_loading() => {
      out.push_str("Loading transactions...\n");
    }
    None => out.push_str("No transactions loaded.\n"),
    Some(transactions) if transactions.is_empty() => out.push_str("No transactions.\n"),
    Some(transactions) => {
      for transaction in &transactions {
        out.push_str(&transaction_line(transaction));
        out.push('\n');
      }
    }
  }

  if session.has_more_data() {
    if session.transactions_loading() {
      out.push_str("Loading more...\n");
    } else {
      out.push_str("More transactions available: type 'more'\n");
    }
  }

  if let Some(error) = session.last_error() {
    let _ = writeln!(out, "Last error: {}", error);
  }

  out
}

fn transaction_line(transaction: &Transaction) -> String {
  let date = match transaction.day() {
    Some(day) => day.to_string(),
    None => transaction.date.clone(),
  };
  format!(
    "[{}] {:<12} {:<10}  {:<24} {:<20} {:>10.2}",
    if transaction.approved { "x" } else { " " },
    transaction.id,
    date,
    transaction.merchant,
    transaction.employee.display_name(),
    transaction.amount,
  )
}

/// Render the employee filter choices
pub fn render_employees(session: &ReviewSession) -> String {
  if session.employees_loading() {
    return "Loading employees...\n".to_string();
  }

  let items = session.selection_items();
  if items.is_empty() {
    return "No employees loaded.\n".to_string();
  }

  let selected = session.selected();
  let mut out = String::new();
  for employee in &items {
    out.push_str(&employee_line(employee, employee.id == selected.id));
    out.push('\n');
  }
  out
}

fn employee_line(employee: &Employee, selected: bool) -> String {
  let id = if employee.is_sentinel() { "all" } else { employee.id.as_str() };
  format!(
    "{} {:<12} {}",
    if selected { "*" } else { " " },
    id,
    employee.display_name()
  )
}

/// Render the command list, narrowed to suggestions for `filter`
pub fn render_help(filter: &str) -> String {
  let suggestions = get_suggestions(filter);
  if suggestions.is_empty() {
    return format!("No commands match '{}'.\n", filter);
  }

  let mut out = String::from("Commands:\n");
  for cmd in suggestions {
    let _ = writeln!(out, "  {:<28} {}", cmd.usage, cmd.description);
  }
  out
}
