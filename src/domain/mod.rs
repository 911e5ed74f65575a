mod account;
mod entry;
mod ledger;
mod points;

pub use account::*;
pub use entry::*;
pub use ledger::*;
pub use points::*;
