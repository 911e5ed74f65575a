// Application layer - the only code path that changes balances.
// Clients (HTTP handlers, CLI) go through LedgerService; business rules
// (amount positivity, sufficient balance, account existence) live here.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
