//! Remote operation vocabulary and the request/response shapes that go
//! with each operation.

use serde::{Deserialize, Serialize};

/// Named remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
  Employees,
  PaginatedTransactions,
  TransactionsByEmployee,
  SetTransactionApproval,
}

impl Operation {
  /// Read operations, safe to memoize
  pub const READS: [Operation; 3] = [
    Operation::Employees,
    Operation::PaginatedTransactions,
    Operation::TransactionsByEmployee,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Employees => "employees",
      Self::PaginatedTransactions => "paginatedTransactions",
      Self::TransactionsByEmployee => "transactionsByEmployee",
      Self::SetTransactionApproval => "setTransactionApproval",
    }
  }
}

impl std::fmt::Display for Operation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One page of a paginated collection. `next_page == None` means there are
/// no further pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
  pub data: T,
  pub next_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedRequestParams {
  pub page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestByEmployeeParams {
  pub employee_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTransactionApprovalParams {
  pub transaction_id: String,
  pub value: bool,
}

/// Parameters for operations that take none
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NoParams {}
