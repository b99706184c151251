//! Single account page: balance, history and quick entry

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::forms::{TransactionForm, DEFAULT_CATEGORY};
use super::transactions::DELETE_TRANSACTION_PROMPT;
use super::{Confirm, ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::LedgerApi;
use crate::model::{Account, AccountId, Category, Transaction, TransactionId};
use crate::report;

#[derive(Debug, Clone, PartialEq)]
pub struct AccountDetail {
    pub account: Account,
    /// Most recent first
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
}

impl AccountDetail {
    /// Balance folded from the transaction list
    pub fn balance(&self) -> Decimal {
        report::balance(&self.transactions)
    }

    /// Category preset in the add form
    pub fn default_category(&self) -> &str {
        self.categories
            .first()
            .map(|c| c.name.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Names used by transactions that are not in the category list
    pub fn unknown_categories(&self) -> Vec<String> {
        report::unknown_categories(&self.transactions, &self.categories)
    }
}

pub struct AccountDetailView {
    api: Arc<dyn LedgerApi>,
    account_id: AccountId,
    state: ViewState<AccountDetail>,
    scope: ViewScope,
}

impl AccountDetailView {
    pub fn new(api: Arc<dyn LedgerApi>, account_id: AccountId) -> Self {
        Self {
            api,
            account_id,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn state(&self) -> &ViewState<AccountDetail> {
        &self.state
    }

    pub fn detail(&self) -> Option<&AccountDetail> {
        self.state.data()
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.detail().map(AccountDetail::balance)
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        let account_id = self.account_id;
        let api = &self.api;

        let fetch = async {
            tokio::try_join!(
                api.list_accounts(),
                api.list_transactions(account_id, None),
                api.list_categories(),
            )
        };

        let (accounts, mut transactions, categories) = self
            .scope
            .run(fetch)
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("account details", e))?;

        let account = match accounts.into_iter().find(|a| a.id == account_id) {
            Some(account) => account,
            None => {
                tracing::warn!(account_id, "Account not found");
                return Err(ViewError::AccountNotFound(account_id));
            }
        };

        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        let detail = AccountDetail {
            account,
            transactions,
            categories,
        };

        let unknown = detail.unknown_categories();
        if !unknown.is_empty() {
            tracing::warn!(
                account_id,
                categories = ?unknown,
                "Transactions reference categories that no longer exist"
            );
        }

        self.state = ViewState::Ready(detail);
        Ok(())
    }

    /// Blank form dated `today` with the default category
    pub fn new_form(&self, today: NaiveDate) -> TransactionForm {
        let category = self
            .detail()
            .map(AccountDetail::default_category)
            .unwrap_or(DEFAULT_CATEGORY);
        TransactionForm::new(today, category)
    }

    pub async fn add_transaction(
        &mut self,
        form: &TransactionForm,
    ) -> Result<Transaction, ViewError> {
        let body = form.validate()?;

        let result = self
            .scope
            .run(self.api.create_transaction(self.account_id, &body))
            .await;

        let created = match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to add transaction", e)),
            Some(Ok(created)) => created,
        };

        self.reload().await;
        Ok(created)
    }

    pub async fn delete_transaction(
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

    async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to refresh account");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountType, TransactionType};
    use crate::views::testing::{date, FakeLedger};

    fn setup() -> (Arc<FakeLedger>, Account) {
        let fake = Arc::new(FakeLedger::new());
        let account = fake.seed_account("Checking", AccountType::Checking);
        let other = fake.seed_account("Savings", AccountType::Savings);
        fake.seed_category("Food");
        fake.seed_transaction(account.id, TransactionType::Income, "100", "Salary", date(2024, 3, 1));
        fake.seed_transaction(account.id, TransactionType::Expense, "30", "Food", date(2024, 3, 5));
        fake.seed_transaction(account.id, TransactionType::Expense, "5", "Food", date(2024, 2, 20));
        fake.seed_transaction(other.id, TransactionType::Income, "999", "Gift", date(2024, 3, 2));
        (fake, account)
    }

    #[tokio::test]
    async fn test_balance_from_transactions() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake.clone(), account.id);
        view.load().await.unwrap();

        assert_eq!(view.balance(), Some(Decimal::from(65)));
        assert_eq!(fake.calls("list_accounts"), 1);
        assert_eq!(fake.calls("list_transactions"), 1);
        assert_eq!(fake.calls("list_categories"), 1);
    }

    #[tokio::test]
    async fn test_most_recent_first() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake, account.id);
        view.load().await.unwrap();

        let dates: Vec<NaiveDate> = view.detail().unwrap().transactions.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 5), date(2024, 3, 1), date(2024, 2, 20)]);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let (fake, _) = setup();
        let mut view = AccountDetailView::new(fake, 4242);

        let err = view.load().await.unwrap_err();
        assert!(matches!(err, ViewError::AccountNotFound(4242)));
        assert!(view.state().is_loading());
    }

    #[tokio::test]
    async fn test_default_category_and_unknown_names() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake, account.id);
        assert_eq!(view.new_form(date(2024, 3, 15)).category, DEFAULT_CATEGORY);

        view.load().await.unwrap();
        let detail = view.detail().unwrap();
        assert_eq!(detail.default_category(), "Food");
        assert_eq!(detail.unknown_categories(), vec!["Salary"]);
        assert_eq!(view.new_form(date(2024, 3, 15)).category, "Food");
    }

    #[tokio::test]
    async fn test_add_updates_balance() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake.clone(), account.id);
        view.load().await.unwrap();

        let form = TransactionForm {
            amount: "15".to_string(),
            ..view.new_form(date(2024, 3, 15))
        };
        view.add_transaction(&form).await.unwrap();

        assert_eq!(view.balance(), Some(Decimal::from(50)));
        assert_eq!(view.detail().unwrap().transactions[0].date, date(2024, 3, 15));
    }

    #[tokio::test]
    async fn test_missing_date_rejected_without_request() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake.clone(), account.id);

        let form = TransactionForm {
            amount: "15".to_string(),
            date: None,
            ..TransactionForm::default()
        };
        let err = view.add_transaction(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Please select a date");
        assert_eq!(fake.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_then_refetch() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake.clone(), account.id);
        view.load().await.unwrap();
        let newest = view.detail().unwrap().transactions[0].id;

        assert!(view.delete_transaction(newest, &|_: &str| true).await.unwrap());
        assert_eq!(view.balance(), Some(Decimal::from(95)));
        assert_eq!(fake.calls("list_transactions"), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_state() {
        let (fake, account) = setup();
        let mut view = AccountDetailView::new(fake.clone(), account.id);
        view.load().await.unwrap();

        fake.fail_on("delete_transaction");
        let err = view
            .delete_transaction(1, &|_: &str| true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to delete transaction");
        assert_eq!(view.balance(), Some(Decimal::from(65)));
    }
}
