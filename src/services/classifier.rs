//! Ledger classification: maps a raw entry's free-text name to a semantic
//! class and normalizes its amount to a monthly figure. Pure functions of the
//! inputs; no storage access.

use crate::models::{Frequency, LedgerEntry};

/// Semantic class of a ledger entry, derived from its name at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryClass {
    Income,
    Expense,
    Investment,
    LoanPayment,
    /// Keyword-matched entries without the expense prefix are excluded from
    /// every total (they would otherwise inflate income).
    Excluded,
}

const EXPENSE_PREFIX: &str = "expense:";

const INVESTMENT_KEYWORDS: &[&str] = &[
    "stock",
    "mutual",
    "sip",
    "investment",
    "crypto",
    "gold",
    "fd",
    "deposit",
    "bond",
];

const LOAN_KEYWORDS: &[&str] = &["loan", "emi"];

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| name.contains(k))
}

/// Classify an entry by its name. Case-insensitive and deterministic: the
/// same string always yields the same class.
pub fn classify_name(name: &str) -> EntryClass {
    let name = name.to_lowercase();

    if name.starts_with(EXPENSE_PREFIX) {
        if contains_any(&name, INVESTMENT_KEYWORDS) {
            EntryClass::Investment
        } else if contains_any(&name, LOAN_KEYWORDS) {
            EntryClass::LoanPayment
        } else {
            EntryClass::Expense
        }
    } else if contains_any(&name, INVESTMENT_KEYWORDS) || contains_any(&name, LOAN_KEYWORDS) {
        EntryClass::Excluded
    } else {
        EntryClass::Income
    }
}

/// Normalize an amount to a monthly figure. One-time entries contribute 0.
pub fn monthly_amount(amount: f64, frequency: Frequency) -> f64 {
    amount * frequency.monthly_factor()
}

/// Classify a stored entry and compute its monthly contribution.
///
/// A row with an unrecognized frequency string contributes 0 rather than
/// erroring; classification itself never fails.
pub fn classify_entry(entry: &LedgerEntry) -> (EntryClass, f64) {
    let class = classify_name(&entry.name);
    let monthly = entry
        .frequency()
        .map(|f| monthly_amount(entry.amount, f))
        .unwrap_or(0.0);
    (class, monthly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(name: &str, amount: f64, frequency: &str) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            amount,
            frequency: frequency.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_plain_name_is_income() {
        assert_eq!(classify_name("Salary"), EntryClass::Income);
        assert_eq!(classify_name("Freelance work"), EntryClass::Income);
    }

    #[test]
    fn test_expense_prefix() {
        assert_eq!(classify_name("Expense: Dining"), EntryClass::Expense);
        assert_eq!(classify_name("expense: groceries"), EntryClass::Expense);
        assert_eq!(classify_name("EXPENSE: Fuel"), EntryClass::Expense);
    }

    #[test]
    fn test_expense_prefix_with_investment_keyword_wins() {
        assert_eq!(classify_name("Expense: SIP payment"), EntryClass::Investment);
        assert_eq!(classify_name("Expense: gold purchase"), EntryClass::Investment);
        assert_eq!(classify_name("Expense: Crypto DCA"), EntryClass::Investment);
    }

    #[test]
    fn test_expense_prefix_with_loan_keyword() {
        assert_eq!(classify_name("Expense: Car loan"), EntryClass::LoanPayment);
        assert_eq!(classify_name("Expense: Home EMI"), EntryClass::LoanPayment);
    }

    #[test]
    fn test_investment_keyword_beats_loan_keyword_under_prefix() {
        // Both keyword families present: the investment check runs first.
        assert_eq!(
            classify_name("Expense: stock loan interest"),
            EntryClass::Investment
        );
    }

    #[test]
    fn test_keyword_without_prefix_is_excluded() {
        assert_eq!(classify_name("Mutual fund dividend"), EntryClass::Excluded);
        assert_eq!(classify_name("Loan disbursal"), EntryClass::Excluded);
        assert_eq!(classify_name("FD maturity"), EntryClass::Excluded);
    }

    #[test]
    fn test_monthly_normalization_factors() {
        assert!((monthly_amount(1000.0, Frequency::Weekly) - 4330.0).abs() < 1e-9);
        assert!((monthly_amount(1000.0, Frequency::Biweekly) - 2170.0).abs() < 1e-9);
        assert!((monthly_amount(1000.0, Frequency::Monthly) - 1000.0).abs() < 1e-9);
        assert_eq!(monthly_amount(1000.0, Frequency::OneTime), 0.0);
    }

    #[test]
    fn test_one_time_always_contributes_zero() {
        let (class, monthly) = classify_entry(&entry("Bonus", 50000.0, "one_time"));
        assert_eq!(class, EntryClass::Income);
        assert_eq!(monthly, 0.0);
    }

    #[test]
    fn test_unrecognized_frequency_contributes_zero() {
        let (class, monthly) = classify_entry(&entry("Salary", 60000.0, "fortnightly"));
        assert_eq!(class, EntryClass::Income);
        assert_eq!(monthly, 0.0);
    }

    #[test]
    fn test_weekly_dining_expense() {
        let (class, monthly) = classify_entry(&entry("Expense: Dining", 1000.0, "weekly"));
        assert_eq!(class, EntryClass::Expense);
        assert!((monthly - 4330.0).abs() < 1e-9);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify_name("Expense: Dining"), EntryClass::Expense);
        }
    }
}
