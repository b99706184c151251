//! Chart data for one account over a date filter

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::LedgerApi;
use crate::model::{Account, AccountId, Transaction};
use crate::report::{self, Clock, DailyTotals, DateFilter};

pub struct ChartsView {
    api: Arc<dyn LedgerApi>,
    clock: Arc<dyn Clock>,
    accounts: Vec<Account>,
    account_id: Option<AccountId>,
    filter: DateFilter,
    state: ViewState<Vec<Transaction>>,
    scope: ViewScope,
}

impl ChartsView {
    pub fn new(api: Arc<dyn LedgerApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            accounts: Vec::new(),
            account_id: None,
            filter: DateFilter::ThisMonth,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn filter(&self) -> DateFilter {
        self.filter
    }

    pub fn state(&self) -> &ViewState<Vec<Transaction>> {
        &self.state
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    /// Refresh the account list and the selected account's transactions.
    ///
    /// A selection that vanished falls back to the first account.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let accounts = self
            .scope
            .run(self.api.list_accounts())
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("accounts", e))?;

        let selected = self
            .account_id
            .filter(|id| accounts.iter().any(|a| a.id == *id))
            .or_else(|| accounts.first().map(|a| a.id));
        self.accounts = accounts;
        self.account_id = selected;

        self.load_transactions().await
    }

    pub async fn select_account(&mut self, account_id: AccountId) -> Result<(), ViewError> {
        self.account_id = Some(account_id);
        self.load_transactions().await
    }

    pub async fn set_filter(&mut self, filter: DateFilter) -> Result<(), ViewError> {
        self.filter = filter;
        self.load_transactions().await
    }

    async fn load_transactions(&mut self) -> Result<(), ViewError> {
        let Some(account_id) = self.account_id else {
            self.state = ViewState::Ready(Vec::new());
            return Ok(());
        };
        let range = self.filter.bounds(self.clock.today());

        let transactions = self
            .scope
            .run(self.api.list_transactions(account_id, range))
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("chart data", e))?;

        tracing::debug!(account_id, filter = %self.filter, count = transactions.len(), "Chart data loaded");
        self.state = ViewState::Ready(transactions);
        Ok(())
    }

    fn transactions(&self) -> &[Transaction] {
        self.state.data().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Expenses per category, for the pie chart
    pub fn category_breakdown(&self) -> BTreeMap<String, Decimal> {
        report::category_breakdown(self.transactions())
    }

    /// Income and expense per day, for the bar chart
    pub fn daily_series(&self) -> Vec<DailyTotals> {
        report::daily_series(self.transactions())
    }
}
