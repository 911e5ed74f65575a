use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::api;
use crate::application::{LedgerService, RECENT_HISTORY_LIMIT};
use crate::domain::{format_points, parse_points, redemption_description, Role};

/// GreenReward - points ledger for waste-collection rewards
#[derive(Parser)]
#[command(name = "greenreward")]
#[command(about = "Reward points for segregated waste, redeemable at local shops")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "GREENREWARD_DB", default_value = "greenreward.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "GREENREWARD_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
    },

    /// Provision a new account
    Open {
        /// Account name (must be unique)
        name: String,

        /// Role: resident, collector
        #[arg(short, long, default_value = "resident")]
        role: String,

        /// Starting balance (e.g., "12,450")
        #[arg(short, long, default_value = "0")]
        balance: String,
    },

    /// Show balance and recent activity for an account
    Balance {
        /// Account name
        name: String,

        /// Number of entries to show
        #[arg(short, long, default_value_t = RECENT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Award points to an account
    Reward {
        /// Account name
        name: String,

        /// Points to award
        amount: String,

        /// What the points are for (e.g., "Dry waste scan")
        #[arg(short, long)]
        description: String,
    },

    /// Redeem points at a shop
    Redeem {
        /// Account name
        name: String,

        /// Points to spend
        amount: String,

        /// Shop where the points are spent
        #[arg(short, long)]
        shop: String,
    },

    /// Verify cached balances against the ledger
    Check,
}

impl Cli {
    /// Install the global tracing subscriber. `RUST_LOG` takes precedence;
    /// otherwise `--verbose` selects DEBUG and the default is INFO.
    pub fn init_logging(&self) {
        let level = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Serve { bind } => {
                let service = LedgerService::init(&self.database).await?;
                info!(database = %self.database, "starting API server");
                api::serve(Arc::new(service), &bind).await?;
            }

            Commands::Open {
                name,
                role,
                balance,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let role = Role::from_str(&role).with_context(|| {
                    format!("Invalid role '{}'. Use: resident, collector", role)
                })?;
                let balance = parse_points(&balance).context("Invalid balance")?;

                let account = service.open_account(name, role, balance).await?;
                println!(
                    "Opened {} account '{}' with {} points",
                    account.role,
                    account.name,
                    format_points(account.balance)
                );
            }

            Commands::Balance { name, limit } => {
                let service = LedgerService::connect(&self.database).await?;
                run_balance_command(&service, &name, limit).await?;
            }

            Commands::Reward {
                name,
                amount,
                description,
            } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount = parse_points(&amount).context("Invalid amount")?;

                let new_balance = service.credit(&name, amount, &description).await?;
                println!(
                    "Rewarded {} points to {}. New balance: {}",
                    format_points(amount),
                    name,
                    format_points(new_balance)
                );
            }

            Commands::Redeem { name, amount, shop } => {
                let service = LedgerService::connect(&self.database).await?;
                let amount = parse_points(&amount).context("Invalid amount")?;

                let new_balance = service
                    .debit(&name, amount, &redemption_description(&shop))
                    .await?;
                println!(
                    "Redeemed {} points at {}. New balance: {}",
                    format_points(amount),
                    shop,
                    format_points(new_balance)
                );
            }

            Commands::Check => {
                let service = LedgerService::connect(&self.database).await?;
                run_check_command(&service).await?;
            }
        }

        Ok(())
    }
}

async fn run_balance_command(service: &LedgerService, name: &str, limit: usize) -> Result<()> {
    let account = service.get_account(name).await?;
    let history = service.recent_history(name, limit).await?;

    println!("{} ({})", account.name, account.role);
    println!("Points: {}", format_points(account.balance));

    if history.is_empty() {
        println!("\nNo activity yet.");
        return Ok(());
    }

    println!("\nRecent activity:");
    for entry in history {
        let sign = if entry.is_credit() { "+" } else { "" };
        println!(
            "  {}  {:>10}  {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            format!("{}{}", sign, format_points(entry.delta)),
            entry.description
        );
    }

    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Accounts: {}", report.account_count);
    println!("Entries:  {}", report.entry_count);
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
    } else {
        println!("Issues found:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
        anyhow::bail!("Ledger integrity check failed");
    }

    Ok(())
}
