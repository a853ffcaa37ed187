//! Client-side synchronization of employees and transactions.
//!
//! - `EmployeeDirectory`: the full employee list
//! - `PaginatedTransactions`: the global feed, accumulated page by page
//! - `ScopedTransactions`: one employee's full list
//! - `ApprovalOverlay`: optimistic approval overrides
//! - `ReviewSession`: merges the active source with the overlay and
//!   drives invalidation on filter changes

pub mod employees;
pub mod overlay;
pub mod paginated;
pub mod scoped;
pub mod session;

pub use overlay::ConfirmFailurePolicy;
pub use session::ReviewSession;
