//! Remote transaction service client.
//!
//! The service exposes four named operations (`employees`,
//! `paginatedTransactions`, `transactionsByEmployee`,
//! `setTransactionApproval`). `FetchGateway` is the only way the rest of
//! the crate reaches them.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use api_types::Operation;
pub use cached_client::FetchGateway;
pub use client::HttpTransport;
pub use error::FetchError;
