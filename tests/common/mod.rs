// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use greenreward::application::LedgerService;
use greenreward::domain::{compute_balance, Points, Role};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Sum of an account's entry deltas, read back from storage
pub async fn entry_sum(service: &LedgerService, name: &str) -> Result<Points> {
    let entries = service.entries(name).await?;
    Ok(compute_balance(&entries))
}

/// Test fixture: accounts matching the pilot neighbourhood
pub struct StandardAccounts;

impl StandardAccounts {
    pub const RAVI_OPENING: Points = 12450;

    /// Ravi (resident, 12,450 points) and Suresh (collector, 0 points)
    pub async fn create(service: &LedgerService) -> Result<()> {
        service
            .open_account("Ravi".into(), Role::Resident, Self::RAVI_OPENING)
            .await?;
        service
            .open_account("Suresh".into(), Role::Collector, 0)
            .await?;
        Ok(())
    }
}
