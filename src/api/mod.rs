//! Ledger backend API
//!
//! Client side of the backend REST surface (JSON over HTTP, base path `/api`).
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /auth/register` - Create a user
//! - `POST /auth/token` - Exchange credentials for a bearer token (form-encoded)
//!
//! ## Accounts
//! - `GET /accounts` - List the user's accounts
//! - `POST /accounts?name=&account_type=` - Create an account
//! - `DELETE /accounts/{id}` - Delete an account
//!
//! ## Categories
//! - `GET /categories` - List categories
//! - `POST /categories?name=` - Create a category
//! - `DELETE /categories/{id}` - Delete a category
//!
//! ## Transactions
//! - `GET /transactions?account_id=&start_date=&end_date=` - List
//! - `GET /transactions/{id}` - Fetch one
//! - `POST /transactions?account_id=` - Create
//! - `PUT /transactions/{id}` - Update
//! - `DELETE /transactions/{id}` - Delete
//! - `GET /transactions/summary?account_id=&start_date=&end_date=` - Totals
//!
//! Every endpoint except the auth pair requires `Authorization: Bearer <token>`.

mod client;
mod endpoints;
pub mod error;

pub use client::{ApiClient, ClientConfig, REQUEST_ID_HEADER};
pub use error::{ApiError, ApiResult};

use async_trait::async_trait;

use crate::model::{
    Account, AccountId, AccountType, Category, CategoryId, NewTransaction, Transaction,
    TransactionId, TransactionSummary, TransactionUpdate,
};
use crate::report::DateRange;

/// Domain calls used by the views, one method per endpoint
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn list_accounts(&self) -> ApiResult<Vec<Account>>;

    async fn create_account(&self, name: &str, account_type: AccountType) -> ApiResult<Account>;

    async fn delete_account(&self, id: AccountId) -> ApiResult<()>;

    async fn list_categories(&self) -> ApiResult<Vec<Category>>;

    async fn create_category(&self, name: &str) -> ApiResult<Category>;

    async fn delete_category(&self, id: CategoryId) -> ApiResult<()>;

    /// Transactions of one account, optionally bounded by date
    async fn list_transactions(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<Vec<Transaction>>;

    async fn get_transaction(&self, id: TransactionId) -> ApiResult<Transaction>;

    async fn create_transaction(
        &self,
        account_id: AccountId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction>;

    async fn update_transaction(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> ApiResult<Transaction>;

    async fn delete_transaction(&self, id: TransactionId) -> ApiResult<()>;

    /// Server-side income/expense totals for one account
    async fn transaction_summary(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<TransactionSummary>;
}
