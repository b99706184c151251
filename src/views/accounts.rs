//! Accounts list

use std::sync::Arc;

use super::forms::AccountForm;
use super::{Confirm, ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::LedgerApi;
use crate::model::{Account, AccountId};

pub const DELETE_ACCOUNT_PROMPT: &str =
    "Are you sure you want to delete this account? All transactions in this account will be lost!";

pub struct AccountsView {
    api: Arc<dyn LedgerApi>,
    state: ViewState<Vec<Account>>,
    scope: ViewScope,
}

impl AccountsView {
    pub fn new(api: Arc<dyn LedgerApi>) -> Self {
        Self {
            api,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<Account>> {
        &self.state
    }

    /// Accounts of the last snapshot; empty while loading
    pub fn accounts(&self) -> &[Account] {
        self.state.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    /// Fetch all accounts and replace the snapshot
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let accounts = self
            .scope
            .run(self.api.list_accounts())
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("accounts", e))?;

        tracing::debug!(count = accounts.len(), "Accounts loaded");
        self.state = ViewState::Ready(accounts);
        Ok(())
    }

    pub async fn create(&mut self, form: &AccountForm) -> Result<Account, ViewError> {
        let (name, account_type) = form.validate()?;

        let result = self
            .scope
            .run(self.api.create_account(&name, account_type))
            .await;

        let account = match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to add account", e)),
            Some(Ok(account)) => account,
        };

        self.reload().await;
        Ok(account)
    }

    /// Delete after confirmation. `Ok(false)` when the user declined.
    pub async fn delete(&mut self, id: AccountId, confirm: &dyn Confirm) -> Result<bool, ViewError> {
        if !confirm.confirm(DELETE_ACCOUNT_PROMPT) {
            tracing::debug!(account_id = id, "Account deletion declined");
            return Ok(false);
        }

        let result = self.scope.run(self.api.delete_account(id)).await;

        match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to delete account", e)),
            Some(Ok(())) => {}
        }

        self.reload().await;
        Ok(true)
    }

    /// Re-fetch after a successful change; the change itself already stuck
    async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to refresh accounts");
        }
    }
}
