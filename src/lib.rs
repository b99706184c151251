//! # Ledger
//!
//! Personal finance tracker client - talks to the ledger REST backend and
//! turns its accounts, categories and transactions into balances, monthly
//! totals and chart series.
//!
//! ## Features
//!
//! - **Session handling**: bearer token persisted between runs, cleared on 401
//! - **Navigation guard**: protected pages redirect to login without a session
//! - **Views**: fetch, validate, mutate, re-fetch; cancelled on teardown
//! - **Reports**: exact decimal balances, category breakdowns, daily series
//!
//! ## Modules
//!
//! - [`session`]: Token storage and authentication state
//! - [`api`]: HTTP client with auth interceptors
//! - [`views`]: Dashboard, accounts, categories, transactions and charts
//! - [`report`]: Pure folds over transaction lists and date filters
//! - [`navigation`]: Routes and the auth guard
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ledger::{App, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::init(Config::load_default(), false)?;
//!     app.client.login("alice", "s3cret").await?;
//!
//!     let mut dashboard = app.dashboard();
//!     dashboard.load().await?;
//!
//!     if let Some(stats) = dashboard.stats() {
//!         println!("Total balance: {}", stats.total_balance);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod navigation;
pub mod render;
pub mod report;
pub mod session;
pub mod views;

pub use api::{ApiClient, ApiError, ApiResult, ClientConfig, LedgerApi};

pub use app::App;

pub use config::{Config, ConfigError, LoggingConfig};

pub use model::{
    Account, AccountId, AccountType, Category, NewTransaction, Transaction, TransactionSummary,
    TransactionType, TransactionUpdate,
};

pub use navigation::{guard, Navigator, Route, Router};

pub use report::{CalendarZone, Clock, DateFilter, DateRange, FixedClock, SystemClock};

pub use session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};

pub use views::{Confirm, ViewError, ViewState};
