use std::collections::HashMap;

use super::{Account, AccountId, EntryId, LedgerEntry, Points};

/// Compute an account balance from its ledger entries.
pub fn compute_balance(entries: &[LedgerEntry]) -> Points {
    entries.iter().map(|entry| entry.delta).sum()
}

/// Reject amounts that are not strictly positive.
pub fn validate_amount(amount: Points) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    Ok(())
}

/// Apply a signed delta to a balance, enforcing that the result stays
/// non-negative and representable.
pub fn apply_delta(balance: Points, delta: Points) -> Result<Points, LedgerError> {
    let new_balance = balance
        .checked_add(delta)
        .ok_or(LedgerError::Overflow { balance, delta })?;
    if new_balance < 0 {
        return Err(LedgerError::InsufficientBalance {
            balance,
            required: -delta,
        });
    }
    Ok(new_balance)
}

/// The bounds a balance must satisfy *before* `delta` is applied so that
/// `apply_delta` succeeds: `(min_balance, max_balance)`, inclusive.
pub fn balance_bounds(delta: Points) -> (Points, Points) {
    if delta >= 0 {
        (0, Points::MAX - delta)
    } else {
        (delta.checked_neg().unwrap_or(Points::MAX), Points::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NonPositiveAmount(Points),
    InsufficientBalance { balance: Points, required: Points },
    Overflow { balance: Points, delta: Points },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::NonPositiveAmount(amount) => {
                write!(f, "Amount must be positive, got {}", amount)
            }
            LedgerError::InsufficientBalance { balance, required } => {
                write!(f, "Balance {} is less than required {}", balance, required)
            }
            LedgerError::Overflow { balance, delta } => {
                write!(f, "Applying {} to balance {} would overflow", delta, balance)
            }
        }
    }
}

impl std::error::Error for LedgerError {}

/// A problem found while checking cached balances against the entry log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    BalanceMismatch {
        account: String,
        cached: Points,
        computed: Points,
    },
    NegativeBalance {
        account: String,
        balance: Points,
    },
    ZeroDeltaEntry(EntryId),
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::BalanceMismatch {
                account,
                cached,
                computed,
            } => write!(
                f,
                "Account '{}' caches balance {} but its entries sum to {}",
                account, cached, computed
            ),
            IntegrityIssue::NegativeBalance { account, balance } => {
                write!(f, "Account '{}' has negative balance {}", account, balance)
            }
            IntegrityIssue::ZeroDeltaEntry(id) => write!(f, "Entry #{} has a zero delta", id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub account_count: usize,
    pub entry_count: i64,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Compare each account's cached balance with the sum of its entries.
/// Accounts missing from `computed` have no entries (sum = 0).
pub fn build_integrity_report(
    accounts: &[Account],
    computed: &HashMap<AccountId, Points>,
    entry_count: i64,
    zero_delta_entries: &[EntryId],
) -> IntegrityReport {
    let mut issues = Vec::new();

    for account in accounts {
        let sum = computed.get(&account.id).copied().unwrap_or(0);
        if sum != account.balance {
            issues.push(IntegrityIssue::BalanceMismatch {
                account: account.name.clone(),
                cached: account.balance,
                computed: sum,
            });
        }
        if account.balance < 0 {
            issues.push(IntegrityIssue::NegativeBalance {
                account: account.name.clone(),
                balance: account.balance,
            });
        }
    }

    issues.extend(
        zero_delta_entries
            .iter()
            .map(|id| IntegrityIssue::ZeroDeltaEntry(*id)),
    );

    IntegrityReport {
        account_count: accounts.len(),
        entry_count,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::Role;

    fn make_entry(account_id: AccountId, id: EntryId, delta: Points) -> LedgerEntry {
        LedgerEntry {
            id,
            account_id,
            delta,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    fn make_account(name: &str, balance: Points) -> Account {
        let mut account = Account::new(name.into(), Role::Resident);
        account.balance = balance;
        account
    }

    #[test]
    fn test_compute_balance_empty() {
        assert_eq!(compute_balance(&[]), 0);
    }

    #[test]
    fn test_compute_balance_mixed() {
        let ravi = make_account("Ravi", 0);
        let entries = vec![
            make_entry(ravi.id, 1, 12450),
            make_entry(ravi.id, 2, 40),
            make_entry(ravi.id, 3, -220),
        ];
        assert_eq!(compute_balance(&entries), 12270);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert_eq!(validate_amount(0), Err(LedgerError::NonPositiveAmount(0)));
        assert_eq!(
            validate_amount(-40),
            Err(LedgerError::NonPositiveAmount(-40))
        );
    }

    #[test]
    fn test_apply_delta_credit_and_debit() {
        assert_eq!(apply_delta(12450, 40), Ok(12490));
        assert_eq!(apply_delta(12490, -220), Ok(12270));
        assert_eq!(apply_delta(220, -220), Ok(0));
    }

    #[test]
    fn test_apply_delta_insufficient() {
        assert_eq!(
            apply_delta(12270, -50000),
            Err(LedgerError::InsufficientBalance {
                balance: 12270,
                required: 50000
            })
        );
    }

    #[test]
    fn test_apply_delta_overflow() {
        assert!(matches!(
            apply_delta(Points::MAX, 1),
            Err(LedgerError::Overflow { .. })
        ));
    }

    #[test]
    fn test_balance_bounds_agree_with_apply_delta() {
        for delta in [40, -220, 1, -1, Points::MAX, -Points::MAX] {
            let (min, max) = balance_bounds(delta);
            assert!(apply_delta(min, delta).is_ok(), "min for {}", delta);
            assert!(apply_delta(max, delta).is_ok(), "max for {}", delta);
            if min > 0 {
                assert!(apply_delta(min - 1, delta).is_err());
            }
            if max < Points::MAX {
                assert!(apply_delta(max + 1, delta).is_err());
            }
        }
    }

    #[test]
    fn test_integrity_report_healthy() {
        let ravi = make_account("Ravi", 12270);
        let suresh = make_account("Suresh", 0);
        let computed = HashMap::from([(ravi.id, 12270)]);

        let report = build_integrity_report(&[ravi, suresh], &computed, 3, &[]);

        assert!(report.is_healthy());
        assert_eq!(report.account_count, 2);
        assert_eq!(report.entry_count, 3);
    }

    #[test]
    fn test_integrity_report_detects_mismatch_and_zero_delta() {
        let ravi = make_account("Ravi", 12450);
        let computed = HashMap::from([(ravi.id, -60)]);

        let report = build_integrity_report(&[ravi], &computed, 3, &[7]);

        assert!(!report.is_healthy());
        assert_eq!(
            report.issues,
            vec![
                IntegrityIssue::BalanceMismatch {
                    account: "Ravi".into(),
                    cached: 12450,
                    computed: -60,
                },
                IntegrityIssue::ZeroDeltaEntry(7),
            ]
        );
    }
}
