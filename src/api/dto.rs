use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::AccountSummary;
use crate::domain::{LedgerEntry, Points};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Collector awards points to a resident.
#[derive(Debug, Serialize, Deserialize)]
pub struct RewardRequest {
    pub resident_name: String,
    pub amount: Points,
    pub description: String,
}

/// Resident spends points at a shop.
#[derive(Debug, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub resident_name: String,
    pub amount: Points,
    pub shop_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub message: String,
    pub new_balance: Points,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    pub amount: Points,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub points: Points,
    pub history: Vec<HistoryItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<LedgerEntry> for HistoryItem {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            amount: entry.delta,
            description: entry.description,
            timestamp: entry.created_at,
        }
    }
}

impl From<AccountSummary> for UserResponse {
    fn from(summary: AccountSummary) -> Self {
        Self {
            username: summary.account.name,
            points: summary.account.balance,
            history: summary.history.into_iter().map(HistoryItem::from).collect(),
        }
    }
}
