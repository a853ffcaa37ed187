//! Employee directory cache.

use tracing::warn;

use crate::api::api_types::NoParams;
use crate::api::types::Employee;
use crate::api::{FetchGateway, Operation};
use crate::query::Query;

/// The full employee list, fetched once through the memoized path.
pub struct EmployeeDirectory {
  query: Query<Vec<Employee>>,
}

/// Store a fetched directory, dropping any record that claims the
/// sentinel id.
fn store_directory(_previous: Option<Vec<Employee>>, fetched: Vec<Employee>) -> Vec<Employee> {
  let before = fetched.len();
  let employees: Vec<Employee> = fetched.into_iter().filter(|e| !e.is_sentinel()).collect();
  if employees.len() != before {
    warn!(dropped = before - employees.len(), "Directory contained sentinel employee records");
  }
  employees
}

impl EmployeeDirectory {
  pub fn new() -> Self {
    Self {
      query: Query::new("employees", store_directory),
    }
  }

  /// Request the employee list. No-op while a request is in flight.
  pub fn fetch_all(&mut self, gateway: &FetchGateway) -> bool {
    let gateway = gateway.clone();
    self
      .query
      .fetch(async move { gateway.fetch_cached(Operation::Employees, &NoParams {}).await })
  }

  pub fn invalidate(&mut self) {
    self.query.invalidate();
  }

  pub fn employees(&self) -> Option<&[Employee]> {
    self.query.data().map(Vec::as_slice)
  }

  pub fn find(&self, id: &str) -> Option<&Employee> {
    self.employees()?.iter().find(|e| e.id == id)
  }

  /// Filter choices: the "all employees" sentinel followed by the
  /// directory. Empty until the directory has loaded.
  pub fn selection_items(&self) -> Vec<Employee> {
    match self.employees() {
      Some(employees) => std::iter::once(Employee::all())
        .chain(employees.iter().cloned())
        .collect(),
      None => Vec::new(),
    }
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

impl Default for EmployeeDirectory {
  fn default() -> Self {
    Self::new()
  }
}
