//! Domain types exchanged with the ledger backend
//!
//! This module defines the wire shapes used throughout the client:
//! - `Account`: A named money container (checking, savings, credit)
//! - `Category`: A user-defined label shared across accounts
//! - `Transaction`: A dated income or expense entry of one account
//! - `User` / `AccessToken`: Registration and login payloads
//!
//! Money is carried as `Decimal` in memory and as a JSON number on the wire.

mod account;
mod category;
mod transaction;
mod user;

pub use account::{Account, AccountId, AccountType};
pub use category::{Category, CategoryId};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionSummary, TransactionType,
    TransactionUpdate,
};
pub use user::{AccessToken, NewUser, User};

/// Error returned when parsing one of the closed domain enums from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}
