use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    balance_bounds, Account, AccountId, EntryId, LedgerEntry, Points, Role,
    OPENING_BALANCE_DESCRIPTION,
};

use super::MIGRATION_001_INITIAL;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of posting an entry against an account.
#[derive(Debug, Clone)]
pub enum PostOutcome {
    /// The balance was updated and the entry appended in one transaction.
    Posted {
        entry: LedgerEntry,
        new_balance: Points,
    },
    /// The account exists but its balance cannot absorb the delta.
    /// Nothing was written.
    Rejected { balance: Points },
    /// No account with the given ID exists.
    AccountMissing,
}

/// Repository for persisting and querying accounts and ledger entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    /// Foreign keys are enforced and writers wait on a busy database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ========================
    // Account operations
    // ========================

    /// Insert a new account together with its opening entry.
    /// The account's `balance` is taken as the opening balance; a non-zero
    /// opening balance is recorded as a ledger entry in the same transaction.
    pub async fn save_account(&self, account: &Account) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, role, balance, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Failed to save account")?;

        if account.balance != 0 {
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (account_id, delta, description, created_at)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(account.id.to_string())
            .bind(account.balance)
            .bind(OPENING_BALANCE_DESCRIPTION)
            .bind(account.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .context("Failed to save opening balance entry")?;
        }

        tx.commit().await.context("Failed to commit account")?;
        Ok(())
    }

    /// Get an account by name.
    pub async fn get_account_by_name(&self, name: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, role, balance, created_at
            FROM accounts
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    /// List all accounts, ordered by name.
    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT id, name, role, balance, created_at FROM accounts ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id_str: String = row.get("id");
        let role_str: String = row.get("role");
        let created_at_str: String = row.get("created_at");

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            name: row.get("name"),
            role: Role::from_str(&role_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid role: {}", role_str))?,
            balance: row.get("balance"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    // ========================
    // Ledger operations
    // ========================

    /// Apply `delta` to an account balance and append the matching entry.
    ///
    /// The balance check and the update are a single conditional `UPDATE`,
    /// so concurrent posts against the same account cannot both pass the
    /// check. The entry insert shares the transaction; if anything fails the
    /// transaction is dropped and rolled back.
    pub async fn post_entry(
        &self,
        account_id: AccountId,
        delta: Points,
        description: &str,
    ) -> Result<PostOutcome> {
        let (min_balance, max_balance) = balance_bounds(delta);
        let created_at = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + ?
            WHERE id = ? AND balance >= ? AND balance <= ?
            RETURNING balance
            "#,
        )
        .bind(delta)
        .bind(account_id.to_string())
        .bind(min_balance)
        .bind(max_balance)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update balance")?;

        let Some(updated) = updated else {
            let current = sqlx::query("SELECT balance FROM accounts WHERE id = ?")
                .bind(account_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to fetch balance")?;

            return Ok(match current {
                Some(row) => PostOutcome::Rejected {
                    balance: row.get("balance"),
                },
                None => PostOutcome::AccountMissing,
            });
        };
        let new_balance: Points = updated.get("balance");

        let inserted = sqlx::query(
            r#"
            INSERT INTO ledger_entries (account_id, delta, description, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(account_id.to_string())
        .bind(delta)
        .bind(description)
        .bind(created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save ledger entry")?;

        tx.commit().await.context("Failed to commit ledger entry")?;

        Ok(PostOutcome::Posted {
            entry: LedgerEntry {
                id: inserted.get("id"),
                account_id,
                delta,
                description: description.to_string(),
                created_at,
            },
            new_balance,
        })
    }

    /// Most recent entries for an account, newest first.
    pub async fn list_recent_entries(
        &self,
        account_id: AccountId,
        limit: usize,
    ) -> Result<Vec<LedgerEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT id, account_id, delta, description, created_at
            FROM ledger_entries
            WHERE account_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(account_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list recent entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// All entries for an account, oldest first.
    pub async fn list_entries_for_account(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, delta, description, created_at
            FROM ledger_entries
            WHERE account_id = ?
            ORDER BY id
            "#,
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list entries for account")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Sum entry deltas per account in a single query.
    /// Accounts with no entries are absent from the map (sum = 0).
    pub async fn sum_entries_by_account(&self) -> Result<HashMap<AccountId, Points>> {
        let rows = sqlx::query(
            r#"
            SELECT account_id, SUM(delta) as total
            FROM ledger_entries
            GROUP BY account_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum entries by account")?;

        let mut sums = HashMap::new();
        for row in rows {
            let account_id_str: String = row.get("account_id");
            let total: Points = row.get("total");
            let account_id = Uuid::parse_str(&account_id_str).context("Invalid account ID")?;
            sums.insert(account_id, total);
        }

        Ok(sums)
    }

    /// Count all ledger entries.
    pub async fn count_entries(&self) -> Result<i64> {
        let count: i64 = sqlx::query("SELECT COUNT(*) as count FROM ledger_entries")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count entries")?
            .get("count");
        Ok(count)
    }

    /// IDs of entries that record no change.
    pub async fn list_zero_delta_entries(&self) -> Result<Vec<EntryId>> {
        let rows = sqlx::query("SELECT id FROM ledger_entries WHERE delta = 0 ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list zero-delta entries")?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let account_id_str: String = row.get("account_id");
        let created_at_str: String = row.get("created_at");

        Ok(LedgerEntry {
            id: row.get("id"),
            account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
            delta: row.get("delta"),
            description: row.get("description"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
