//! Folds over transaction snapshots

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Category, Transaction, TransactionSummary, TransactionType};

/// Income and expense totals for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// Income and expense recorded in the current month
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub expense: Decimal,
}

/// Sum of signed amounts, starting at zero.
///
/// Decimal addition is exact, so the result does not depend on list order.
/// Totals beyond the representable range clamp instead of overflowing.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.signed_amount()))
}

/// Income, expense, net and count over the whole list
pub fn summarize(transactions: &[Transaction]) -> TransactionSummary {
    let income = total_of(transactions, TransactionType::Income);
    let expense = total_of(transactions, TransactionType::Expense);

    TransactionSummary {
        income,
        expense,
        net: income.saturating_sub(expense),
        count: transactions.len(),
    }
}

/// Expense totals per category name, rounded to cents.
///
/// Categories without any expense are absent, not zero.
pub fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<String, Decimal> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for t in transactions.iter().filter(|t| t.is_expense()) {
        let total = totals.entry(t.category.clone()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(t.amount);
    }

    for value in totals.values_mut() {
        *value = value.round_dp(2);
    }

    totals
}

/// Per-date income and expense totals, ascending by date
pub fn daily_series(transactions: &[Transaction]) -> Vec<DailyTotals> {
    let mut days: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();

    for t in transactions {
        let day = days.entry(t.date).or_insert_with(|| DailyTotals {
            date: t.date,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        });
        match t.transaction_type {
            TransactionType::Income => day.income = day.income.saturating_add(t.amount),
            TransactionType::Expense => day.expense = day.expense.saturating_add(t.amount),
        }
    }

    days.into_values().collect()
}

/// Totals of transactions dated in the same year and month as `today`
pub fn month_totals(transactions: &[Transaction], today: NaiveDate) -> MonthTotals {
    let current: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.date.year() == today.year() && t.date.month() == today.month())
        .cloned()
        .collect();

    MonthTotals {
        income: total_of(&current, TransactionType::Income),
        expense: total_of(&current, TransactionType::Expense),
    }
}

/// Category names used by transactions but missing from `categories`
pub fn unknown_categories(transactions: &[Transaction], categories: &[Category]) -> Vec<String> {
    let known: BTreeSet<&str> = categories.iter().map(|c| c.name.as_str()).collect();

    transactions
        .iter()
        .map(|t| t.category.as_str())
        .filter(|name| !known.contains(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn total_of(transactions: &[Transaction], kind: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.transaction_type == kind)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}
