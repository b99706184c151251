//! Transactions of one account under a date filter

use std::sync::Arc;

use super::forms::{TransactionEdit, TransactionForm, DEFAULT_CATEGORY};
use super::{Confirm, ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::LedgerApi;
use crate::model::{Account, AccountId, Category, Transaction, TransactionId, TransactionSummary};
use crate::report::{self, Clock, DateFilter, DateRange};

pub const DELETE_TRANSACTION_PROMPT: &str = "Are you sure you want to delete this transaction?";

/// Everything fetched for the selected account and filter
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsSnapshot {
    pub transactions: Vec<Transaction>,
    /// Totals as computed by the backend
    pub summary: TransactionSummary,
    pub categories: Vec<Category>,
}

pub struct TransactionsView {
    api: Arc<dyn LedgerApi>,
    clock: Arc<dyn Clock>,
    account_id: Option<AccountId>,
    filter: DateFilter,
    state: ViewState<TransactionsSnapshot>,
    scope: ViewScope,
}

impl TransactionsView {
    pub fn new(api: Arc<dyn LedgerApi>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            clock,
            account_id: None,
            filter: DateFilter::All,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn with_filter(mut self, filter: DateFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn filter(&self) -> DateFilter {
        self.filter
    }

    pub fn state(&self) -> &ViewState<TransactionsSnapshot> {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&TransactionsSnapshot> {
        self.state.data()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    /// Bounds sent with the list and summary requests
    pub fn range(&self) -> Option<DateRange> {
        self.filter.bounds(self.clock.today())
    }

    /// Pick the first account when nothing is selected yet
    pub fn select_default(&mut self, accounts: &[Account]) -> Option<AccountId> {
        if self.account_id.is_none() {
            self.account_id = accounts.first().map(|a| a.id);
        }
        self.account_id
    }

    pub async fn select_account(&mut self, account_id: AccountId) -> Result<(), ViewError> {
        self.account_id = Some(account_id);
        self.load().await
    }

    pub async fn set_filter(&mut self, filter: DateFilter) -> Result<(), ViewError> {
        self.filter = filter;
        if self.account_id.is_none() {
            return Ok(());
        }
        self.load().await
    }

    /// Fetch transactions, server summary and categories together
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let account_id = self.account_id.ok_or(ViewError::NoAccountSelected)?;
        let range = self.range();
        let api = &self.api;

        let fetch = async {
            tokio::try_join!(
                api.list_transactions(account_id, range),
                api.transaction_summary(account_id, range),
                api.list_categories(),
            )
        };

        let (transactions, summary, categories) = self
            .scope
            .run(fetch)
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("transactions", e))?;

        tracing::debug!(
            account_id,
            filter = %self.filter,
            count = transactions.len(),
            "Transactions loaded"
        );
        self.state = ViewState::Ready(TransactionsSnapshot {
            transactions,
            summary,
            categories,
        });
        Ok(())
    }

    /// Blank form dated today, preset to the first category
    pub fn new_form(&self) -> TransactionForm {
        let category = self
            .snapshot()
            .and_then(|s| s.categories.first())
            .map(|c| c.name.as_str())
            .unwrap_or(DEFAULT_CATEGORY);
        TransactionForm::new(self.clock.today(), category)
    }

    /// Create a transaction on the selected account. A missing date means today.
    pub async fn add(&mut self, form: &TransactionForm) -> Result<Transaction, ViewError> {
        let mut form = form.clone();
        if form.date.is_none() {
            form.date = Some(self.clock.today());
        }
        let body = form.validate()?;
        let account_id = self.account_id.ok_or(ViewError::NoAccountSelected)?;

        let result = self
            .scope
            .run(self.api.create_transaction(account_id, &body))
            .await;

        let created = match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to add transaction", e)),
            Some(Ok(created)) => created,
        };

        self.reload().await;
        Ok(created)
    }

    /// Edit form prefilled from the current snapshot
    pub fn begin_edit(&self, id: TransactionId) -> Option<TransactionEdit> {
        self.snapshot()?
            .transactions
            .iter()
            .find(|t| t.id == id)
            .map(TransactionEdit::from)
    }

    /// Edit form for any transaction of the selected account.
    ///
    /// Falls back to the backend when the current filter hides the record.
    /// `Ok(None)` when it does not exist or belongs to another account.
    pub async fn fetch_edit(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionEdit>, ViewError> {
        if let Some(edit) = self.begin_edit(id) {
            return Ok(Some(edit));
        }
        let account_id = self.account_id.ok_or(ViewError::NoAccountSelected)?;

        match self.scope.run(self.api.get_transaction(id)).await {
            None => Err(ViewError::Cancelled),
            Some(Ok(t)) if t.account_id == account_id => Ok(Some(TransactionEdit::from(&t))),
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) if e.status() == Some(404) => Ok(None),
            Some(Err(e)) => Err(ViewError::fetch("transaction", e)),
        }
    }

    pub async fn update(
        &mut self,
        id: TransactionId,
        edit: &TransactionEdit,
    ) -> Result<Transaction, ViewError> {
        let body = edit.validate()?;

        let result = self.scope.run(self.api.update_transaction(id, &body)).await;

        let updated = match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to update transaction", e)),
            Some(Ok(updated)) => updated,
        };

        self.reload().await;
        Ok(updated)
    }

    pub async fn delete(
        &mut self,
        id: TransactionId,
        confirm: &dyn Confirm,
    ) -> Result<bool, ViewError> {
        if !confirm.confirm(DELETE_TRANSACTION_PROMPT) {
            return Ok(false);
        }

        let result = self.scope.run(self.api.delete_transaction(id)).await;

        match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to delete transaction", e)),
            Some(Ok(())) => {}
        }

        self.reload().await;
        Ok(true)
    }

    /// Backend totals for the current snapshot
    pub fn summary(&self) -> Option<&TransactionSummary> {
        self.snapshot().map(|s| &s.summary)
    }

    /// Same totals folded client-side from the listed transactions
    pub fn local_summary(&self) -> Option<TransactionSummary> {
        self.snapshot().map(|s| report::summarize(&s.transactions))
    }

    async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to refresh transactions");
        }
    }
}
