use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reserved id of the "all employees" filter value
pub const EMPTY_EMPLOYEE_ID: &str = "";

/// Employee from the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub id: String,
  pub first_name: String,
  pub last_name: String,
}

impl Employee {
  /// The "no filter" selection. Never part of the fetched directory.
  pub fn all() -> Self {
    Self {
      id: EMPTY_EMPLOYEE_ID.to_string(),
      first_name: "All".to_string(),
      last_name: "Employees".to_string(),
    }
  }

  pub fn is_sentinel(&self) -> bool {
    is_sentinel_id(&self.id)
  }

  pub fn display_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

pub fn is_sentinel_id(id: &str) -> bool {
  id == EMPTY_EMPLOYEE_ID
}

/// A reviewable transaction.
/// `approved` is the last state reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: String,
  pub amount: f64,
  pub employee: Employee,
  pub merchant: String,
  /// As sent by the server; not validated
  pub date: String,
  pub approved: bool,
}

impl Transaction {
  /// Calendar day of `date` when it is an ISO date or an RFC 3339
  /// timestamp.
  pub fn day(&self) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
      .ok()
      .or_else(|| DateTime::parse_from_rfc3339(&self.date).ok().map(|dt| dt.date_naive()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sentinel() {
    let all = Employee::all();
    assert!(all.is_sentinel());
    assert_eq!(all.display_name(), "All Employees");

    let real = Employee {
      id: "1".to_string(),
      first_name: "A".to_string(),
      last_name: "B".to_string(),
    };
    assert!(!real.is_sentinel());
  }

  #[test]
  fn test_transaction_wire_shape() {
    let json = serde_json::json!({
      "id": "t1",
      "amount": 5.0,
      "employee": { "id": "1", "firstName": "A", "lastName": "B" },
      "merchant": "M",
      "date": "2024-01-01",
      "approved": false
    });
    let txn: Transaction = serde_json::from_value(json).unwrap();
    assert_eq!(txn.employee.first_name, "A");
    assert_eq!(txn.day(), NaiveDate::from_ymd_opt(2024, 1, 1));
    assert!(!txn.approved);
  }

  #[test]
  fn test_date_formats_are_accepted() {
    let with_date = |date: &str| {
      serde_json::json!({
        "id": "t1",
        "amount": 5,
        "employee": { "id": "1", "firstName": "A", "lastName": "B" },
        "merchant": "M",
        "date": date,
        "approved": true
      })
    };

    let stamped: Transaction = serde_json::from_value(with_date("2024-03-05T10:30:00Z")).unwrap();
    assert_eq!(stamped.day(), NaiveDate::from_ymd_opt(2024, 3, 5));

    let opaque: Transaction = serde_json::from_value(with_date("last Tuesday")).unwrap();
    assert_eq!(opaque.date, "last Tuesday");
    assert_eq!(opaque.day(), None);
  }
}
