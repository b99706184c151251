//! Dashboard: all accounts with their balances and this month's totals

use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::{ApiError, LedgerApi};
use crate::model::{Account, AccountId, Transaction};
use crate::report::{self, Clock};

/// Accounts and every account's full transaction list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub accounts: Vec<Account>,
    pub transactions: BTreeMap<AccountId, Vec<Transaction>>,
}

impl DashboardData {
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.transactions.values().flatten().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account: Account,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub month_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub month_expense: Decimal,
}

pub struct DashboardView {
    api: Arc<dyn LedgerApi>,
    clock: Arc<dyn Clock>,
    state: ViewState<DashboardData>,
    scope: ViewScope,
}

impl DashboardView {
    pub fn new(api: Arc<dyn LedgerApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> &ViewState<DashboardData> {
        &self.state
    }

    pub fn data(&self) -> Option<&DashboardData> {
        self.state.data()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    /// Accounts first, then all transaction lists at once.
    ///
    /// One failed list fails the whole load.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let api = &self.api;

        let fetch = async {
            let accounts = api.list_accounts().await?;
            let lists = try_join_all(accounts.iter().map(|a| api.list_transactions(a.id, None))).await?;
            Ok::<_, ApiError>((accounts, lists))
        };

        let (accounts, lists) = self
            .scope
            .run(fetch)
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("dashboard data", e))?;

        let transactions = accounts.iter().map(|a| a.id).zip(lists).collect();
        tracing::debug!(accounts = accounts.len(), "Dashboard loaded");

        self.state = ViewState::Ready(DashboardData {
            accounts,
            transactions,
        });
        Ok(())
    }

    /// True once loaded with no accounts at all
    pub fn is_empty(&self) -> bool {
        self.data().map(|d| d.accounts.is_empty()).unwrap_or(false)
    }

    pub fn account_balances(&self) -> Vec<AccountBalance> {
        let Some(data) = self.data() else {
            return Vec::new();
        };

        data.accounts
            .iter()
            .map(|account| AccountBalance {
                account: account.clone(),
                balance: data
                    .transactions
                    .get(&account.id)
                    .map(Vec::as_slice)
                    .map(report::balance)
                    .unwrap_or(Decimal::ZERO),
            })
            .collect()
    }

    pub fn stats(&self) -> Option<DashboardStats> {
        let data = self.data()?;
        let all = data.all_transactions();
        let month = report::month_totals(&all, self.clock.today());

        Some(DashboardStats {
            total_balance: report::balance(&all),
            month_income: month.income,
            month_expense: month.expense,
        })
    }

    /// Expenses per category across every account
    pub fn category_breakdown(&self) -> BTreeMap<String, Decimal> {
        self.data()
            .map(|d| report::category_breakdown(&d.all_transactions()))
            .unwrap_or_default()
    }
}
