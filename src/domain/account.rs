use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Points;

pub type AccountId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Households that earn points by handing over segregated waste
    Resident,
    /// Collection staff who scan waste and award points
    Collector,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Resident => "resident",
            Role::Collector => "collector",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "resident" => Some(Role::Resident),
            "collector" => Some(Role::Collector),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A points account. The balance is a cached sum of the account's ledger
/// entries and only changes together with an entry insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub role: Role,
    pub balance: Points,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            role,
            balance: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Resident, Role::Collector] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::from_str("Resident"), Some(Role::Resident));
        assert_eq!(Role::from_str(" COLLECTOR "), Some(Role::Collector));
        assert_eq!(Role::from_str("shopkeeper"), None);
    }

    #[test]
    fn test_new_account_starts_empty() {
        let account = Account::new("Ravi".into(), Role::Resident);
        assert_eq!(account.balance, 0);
        assert_eq!(account.role, Role::Resident);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Collector).unwrap();
        assert_eq!(json, "\"collector\"");
    }
}
