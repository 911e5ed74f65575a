use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Points};

/// Insertion sequence of a ledger entry; higher is newer.
pub type EntryId = i64;

/// Description recorded for an account's starting balance.
pub const OPENING_BALANCE_DESCRIPTION: &str = "Opening balance";

/// One immutable change to an account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Assigned by the repository on insert
    pub id: EntryId,
    pub account_id: AccountId,
    /// Positive for credits, negative for debits
    pub delta: Points,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_credit(&self) -> bool {
        self.delta > 0
    }

    pub fn is_debit(&self) -> bool {
        self.delta < 0
    }
}

/// Description recorded for a redemption at a shop.
pub fn redemption_description(shop_name: &str) -> String {
    format!("Redeemed at {}", shop_name)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn entry(delta: Points) -> LedgerEntry {
        LedgerEntry {
            id: 1,
            account_id: Uuid::new_v4(),
            delta,
            description: "test".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_credit_and_debit() {
        assert!(entry(40).is_credit());
        assert!(!entry(40).is_debit());
        assert!(entry(-220).is_debit());
        assert!(!entry(-220).is_credit());
    }

    #[test]
    fn test_redemption_description() {
        assert_eq!(redemption_description("FreshBasket"), "Redeemed at FreshBasket");
    }
}
