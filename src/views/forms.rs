//! Client-side input validation
//!
//! Forms hold raw user input. `validate` turns them into request bodies or
//! rejects them with the message shown to the user; nothing here touches the
//! network.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ViewError;
use crate::model::{AccountType, NewTransaction, Transaction, TransactionType, TransactionUpdate};

/// Category used when a transaction form leaves it blank
pub const DEFAULT_CATEGORY: &str = "General";

/// New account input
#[derive(Debug, Clone, Default)]
pub struct AccountForm {
    pub name: String,
    pub account_type: AccountType,
}

impl AccountForm {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
        }
    }

    pub fn validate(&self) -> Result<(String, AccountType), ViewError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ViewError::Invalid("Please enter an account name".to_string()));
        }
        Ok((name.to_string(), self.account_type))
    }
}

/// New category input
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
}

impl CategoryForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<String, ViewError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ViewError::Invalid("Please enter a category name".to_string()));
        }
        Ok(name.to_string())
    }
}

/// New transaction input
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub transaction_type: TransactionType,
    /// Raw amount text as typed
    pub amount: String,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub description: String,
}

impl TransactionForm {
    /// Blank expense form dated `today`
    pub fn new(today: NaiveDate, category: impl Into<String>) -> Self {
        Self {
            transaction_type: TransactionType::Expense,
            amount: String::new(),
            category: category.into(),
            date: Some(today),
            description: String::new(),
        }
    }

    pub fn validate(&self) -> Result<NewTransaction, ViewError> {
        let amount = parse_amount(&self.amount)?;
        let date = self
            .date
            .ok_or_else(|| ViewError::Invalid("Please select a date".to_string()))?;

        Ok(NewTransaction {
            amount,
            date,
            description: self.description.trim().to_string(),
            transaction_type: self.transaction_type,
            category: category_or_default(&self.category),
        })
    }
}

/// Edit of an existing transaction; the date is not editable
#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub transaction_type: TransactionType,
    pub amount: String,
    pub category: String,
    pub description: String,
}

impl TransactionEdit {
    pub fn validate(&self) -> Result<TransactionUpdate, ViewError> {
        Ok(TransactionUpdate {
            description: self.description.trim().to_string(),
            amount: parse_amount(&self.amount)?,
            transaction_type: self.transaction_type,
            category: category_or_default(&self.category),
        })
    }
}

impl From<&Transaction> for TransactionEdit {
    fn from(t: &Transaction) -> Self {
        Self {
            transaction_type: t.transaction_type,
            amount: t.amount.to_string(),
            category: t.category.clone(),
            description: t.description.clone().unwrap_or_default(),
        }
    }
}

/// Largest amount a single transaction may carry (10^15)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Strictly positive decimal amount, at most `MAX_AMOUNT`
fn parse_amount(raw: &str) -> Result<Decimal, ViewError> {
    let invalid = || ViewError::Invalid("Please enter a valid amount".to_string());

    let amount: Decimal = raw.trim().parse().map_err(|_| invalid())?;
    if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
        return Err(invalid());
    }
    Ok(amount)
}

fn category_or_default(raw: &str) -> String {
    let category = raw.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    }
}
