//! Command output
//!
//! Every listing is built once as a `Table` and printed as aligned text or
//! CSV; JSON output serializes the underlying values instead.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Account, Category, ParseEnumError, Transaction, TransactionSummary};
use crate::report::DailyTotals;
use crate::views::AccountBalance;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ParseEnumError {
                kind: "output format",
                value: other.to_string(),
                expected: "table, json, csv",
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode CSV: {0}")]
    Csv(String),
}

/// Rows of display strings under fixed headers
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Left-aligned columns with a dashed rule under the header
    pub fn to_text(&self) -> String {
        let widths = self.widths();
        let line = |cells: Vec<&str>| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = line(self.headers.clone());
        out.push('\n');
        out.push_str(&"-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }

    pub fn to_csv(&self) -> Result<String, RenderError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.headers)
            .map_err(|e| RenderError::Csv(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| RenderError::Csv(e.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| RenderError::Csv(e.to_string()))
    }
}

/// Render `table` as text or CSV, or `value` as pretty JSON
pub fn render<T: Serialize + ?Sized>(
    format: OutputFormat,
    table: &Table,
    value: &T,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Table => Ok(table.to_text()),
        OutputFormat::Csv => table.to_csv(),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)? + "\n"),
    }
}

/// Two decimal places
pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Amount prefixed with `+` for income and `-` for expense
pub fn signed_money(transaction: &Transaction) -> String {
    format!(
        "{}{}",
        transaction.transaction_type.sign(),
        money(transaction.amount)
    )
}

pub fn accounts_table(accounts: &[Account]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Type"]);
    for account in accounts {
        table.push(vec![
            account.id.to_string(),
            account.name.clone(),
            account.account_type.to_string(),
        ]);
    }
    table
}

pub fn balances_table(balances: &[AccountBalance]) -> Table {
    let mut table = Table::new(&["ID", "Name", "Type", "Balance"]);
    for entry in balances {
        table.push(vec![
            entry.account.id.to_string(),
            entry.account.name.clone(),
            entry.account.account_type.to_string(),
            money(entry.balance),
        ]);
    }
    table
}

pub fn categories_table(categories: &[Category]) -> Table {
    let mut table = Table::new(&["ID", "Name"]);
    for category in categories {
        table.push(vec![category.id.to_string(), category.name.clone()]);
    }
    table
}

pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = Table::new(&["ID", "Date", "Type", "Category", "Amount", "Description"]);
    for t in transactions {
        table.push(vec![
            t.id.to_string(),
            t.date.format("%Y-%m-%d").to_string(),
            t.transaction_type.to_string(),
            t.category.clone(),
            signed_money(t),
            t.description.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub fn summary_table(summary: &TransactionSummary) -> Table {
    let mut table = Table::new(&["Income", "Expense", "Net", "Count"]);
    table.push(vec![
        money(summary.income),
        money(summary.expense),
        money(summary.net),
        summary.count.to_string(),
    ]);
    table
}

pub fn breakdown_table(breakdown: &BTreeMap<String, Decimal>) -> Table {
    let mut table = Table::new(&["Category", "Expense"]);
    for (category, total) in breakdown {
        table.push(vec![category.clone(), money(*total)]);
    }
    table
}

pub fn daily_table(series: &[DailyTotals]) -> Table {
    let mut table = Table::new(&["Date", "Income", "Expense"]);
    for day in series {
        table.push(vec![
            day.date.format("%Y-%m-%d").to_string(),
            money(day.income),
            money(day.expense),
        ]);
    }
    table
}
