//! Domain Views
//!
//! Each view owns one snapshot of server data and follows the same cycle:
//!
//! 1. `load` fetches the whole collection and replaces the snapshot
//! 2. mutations validate locally first; invalid input never reaches the network
//! 3. a successful mutation is followed by a full re-fetch, never a local patch
//! 4. a failed mutation leaves the snapshot as it was and reports a generic alert
//!
//! Every view runs its requests inside a `ViewScope`. Dropping the view
//! cancels the scope, so a response arriving late cannot land in a view that
//! is gone or has moved on.

mod account_detail;
mod accounts;
mod categories;
mod charts;
mod dashboard;
mod forms;
mod scope;
mod transactions;

#[cfg(test)]
pub(crate) mod testing;

pub use account_detail::{AccountDetail, AccountDetailView};
pub use accounts::{AccountsView, DELETE_ACCOUNT_PROMPT};
pub use categories::{CategoriesView, DELETE_CATEGORY_PROMPT};
pub use charts::ChartsView;
pub use dashboard::{AccountBalance, DashboardData, DashboardStats, DashboardView};
pub use forms::{
    AccountForm, CategoryForm, TransactionEdit, TransactionForm, DEFAULT_CATEGORY, MAX_AMOUNT,
};
pub use scope::{ScopeHandle, ViewScope};
pub use transactions::{TransactionsSnapshot, TransactionsView, DELETE_TRANSACTION_PROMPT};

use thiserror::Error;

use crate::api::ApiError;
use crate::model::AccountId;

/// Lifecycle of a view's snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing fetched yet
    Loading,
    /// Last server snapshot
    Ready(T),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<T> ViewState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loading => None,
            ViewState::Ready(data) => Some(data),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

}

/// Asks the user to confirm a destructive action
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Errors surfaced by view operations
#[derive(Error, Debug)]
pub enum ViewError {
    /// Input rejected before any request was made
    #[error("{0}")]
    Invalid(String),

    /// A create/update/delete failed; displays as the generic alert
    #[error("{action}")]
    Failed {
        action: &'static str,
        #[source]
        source: ApiError,
    },

    /// Fetching the view's data failed; the previous snapshot is kept
    #[error("Error fetching {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("No account selected")]
    NoAccountSelected,

    /// The view was torn down while the request was in flight
    #[error("Request cancelled")]
    Cancelled,
}

impl ViewError {
    /// Underlying backend error, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ViewError::Failed { source, .. } | ViewError::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True when the backend rejected the session (already logged out)
    pub fn is_unauthorized(&self) -> bool {
        self.api_error().map(ApiError::is_unauthorized).unwrap_or(false)
    }

    pub(crate) fn failed(action: &'static str, source: ApiError) -> Self {
        tracing::error!(error = %source, "{}", action);
        ViewError::Failed { action, source }
    }

    pub(crate) fn fetch(what: &'static str, source: ApiError) -> Self {
        tracing::error!(error = %source, "Error fetching {}", what);
        ViewError::Fetch { what, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_data() {
        let state: ViewState<Vec<u32>> = ViewState::default();
        assert!(state.is_loading());
        assert_eq!(state.data(), None);

        let state = ViewState::Ready(vec![1]);
        assert!(state.is_ready());
        assert_eq!(state.data(), Some(&vec![1]));
    }

    #[test]
    fn test_closure_confirm() {
        let yes = |_: &str| true;
        let no = |_: &str| false;
        assert!(yes.confirm("sure?"));
        assert!(!no.confirm("sure?"));
    }

    #[test]
    fn test_error_messages() {
        let err = ViewError::Failed {
            action: "Failed to add account",
            source: ApiError::Timeout,
        };
        assert_eq!(err.to_string(), "Failed to add account");
        assert!(!err.is_unauthorized());

        let err = ViewError::Fetch {
            what: "accounts",
            source: ApiError::Unauthorized,
        };
        assert!(err.is_unauthorized());
    }
}
