use tracing::{debug, info, warn};

use crate::domain::{
    apply_delta, build_integrity_report, validate_amount, Account, IntegrityReport, LedgerEntry,
    Points, Role,
};
use crate::storage::{PostOutcome, Repository};

use super::AppError;

/// Number of entries shown alongside an account summary.
pub const RECENT_HISTORY_LIMIT: usize = 5;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (HTTP API, CLI, tests).
pub struct LedgerService {
    repo: Repository,
}

/// An account together with its most recent entries, newest first.
pub struct AccountSummary {
    pub account: Account,
    pub history: Vec<LedgerEntry>,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open the database at the given path, creating it and its schema if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Release pooled connections.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    // ========================
    // Account operations
    // ========================

    /// Provision a new account with an optional starting balance.
    pub async fn open_account(
        &self,
        name: String,
        role: Role,
        opening_balance: Points,
    ) -> Result<Account, AppError> {
        if opening_balance < 0 {
            return Err(AppError::InvalidAmount(format!(
                "Opening balance cannot be negative, got {}",
                opening_balance
            )));
        }

        if self.repo.get_account_by_name(&name).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(name));
        }

        let mut account = Account::new(name, role);
        account.balance = opening_balance;

        self.repo.save_account(&account).await?;
        info!(account = %account.name, role = %account.role, balance = opening_balance, "opened account");
        Ok(account)
    }

    /// Get an account by name.
    pub async fn get_account(&self, name: &str) -> Result<Account, AppError> {
        self.repo
            .get_account_by_name(name)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(name.to_string()))
    }

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.repo.list_accounts().await?)
    }

    /// The most recent `limit` entries for an account, newest first.
    pub async fn recent_history(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let account = self.get_account(name).await?;
        Ok(self.repo.list_recent_entries(account.id, limit).await?)
    }

    /// Account plus its recent history.
    pub async fn account_summary(&self, name: &str) -> Result<AccountSummary, AppError> {
        let account = self.get_account(name).await?;
        let history = self
            .repo
            .list_recent_entries(account.id, RECENT_HISTORY_LIMIT)
            .await?;
        Ok(AccountSummary { account, history })
    }

    /// Every entry of an account, oldest first.
    pub async fn entries(&self, name: &str) -> Result<Vec<LedgerEntry>, AppError> {
        let account = self.get_account(name).await?;
        Ok(self.repo.list_entries_for_account(account.id).await?)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Add points to an account. Returns the new balance.
    pub async fn credit(
        &self,
        name: &str,
        amount: Points,
        description: &str,
    ) -> Result<Points, AppError> {
        validate_amount(amount).map_err(|e| AppError::from_ledger(name, e))?;
        let new_balance = self.post(name, amount, description).await?;
        info!(account = name, amount, new_balance, "credited points");
        Ok(new_balance)
    }

    /// Remove points from an account. Fails without side effects when the
    /// balance is lower than `amount`. Returns the new balance.
    pub async fn debit(
        &self,
        name: &str,
        amount: Points,
        description: &str,
    ) -> Result<Points, AppError> {
        validate_amount(amount).map_err(|e| AppError::from_ledger(name, e))?;
        let new_balance = self.post(name, -amount, description).await?;
        info!(account = name, amount, new_balance, "debited points");
        Ok(new_balance)
    }

    async fn post(&self, name: &str, delta: Points, description: &str) -> Result<Points, AppError> {
        let account = self.get_account(name).await?;

        match self.repo.post_entry(account.id, delta, description).await? {
            PostOutcome::Posted { entry, new_balance } => {
                debug!(account = name, entry_id = entry.id, delta, "posted entry");
                Ok(new_balance)
            }
            PostOutcome::Rejected { balance } => {
                let err = match apply_delta(balance, delta) {
                    Err(err) => AppError::from_ledger(name, err),
                    // The balance moved between the update and the re-read.
                    Ok(_) => AppError::Database(anyhow::anyhow!(
                        "Balance update for {} was rejected at balance {}",
                        name,
                        balance
                    )),
                };
                warn!(account = name, delta, balance, "rejected entry: {}", err);
                Err(err)
            }
            PostOutcome::AccountMissing => Err(AppError::AccountNotFound(name.to_string())),
        }
    }

    // ========================
    // Integrity operations
    // ========================

    /// Check every cached balance against the sum of its entries.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let accounts = self.repo.list_accounts().await?;
        let sums = self.repo.sum_entries_by_account().await?;
        let entry_count = self.repo.count_entries().await?;
        let zero_delta = self.repo.list_zero_delta_entries().await?;

        let report = build_integrity_report(&accounts, &sums, entry_count, &zero_delta);
        if !report.is_healthy() {
            warn!(issues = report.issues.len(), "ledger integrity check found issues");
        }
        Ok(report)
    }
}
