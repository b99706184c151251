//! In-memory `LedgerApi` for view tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::{ApiError, ApiResult, LedgerApi};
use crate::model::{
    Account, AccountId, AccountType, Category, CategoryId, NewTransaction, Transaction,
    TransactionId, TransactionSummary, TransactionType, TransactionUpdate,
};
use crate::report::{self, DateRange};

#[derive(Default)]
struct Store {
    next_id: i64,
    accounts: Vec<Account>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Backend fake that counts calls and can fail or stall on demand
#[derive(Default)]
pub(crate) struct FakeLedger {
    store: Mutex<Store>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_account(&self, name: &str, account_type: AccountType) -> Account {
        let mut store = self.store.lock().unwrap();
        let account = Account {
            id: store.next_id(),
            name: name.to_string(),
            account_type,
            balance: None,
            user_id: Some(1),
        };
        store.accounts.push(account.clone());
        account
    }

    pub fn seed_category(&self, name: &str) -> Category {
        let mut store = self.store.lock().unwrap();
        let category = Category {
            id: store.next_id(),
            name: name.to_string(),
        };
        store.categories.push(category.clone());
        category
    }

    pub fn seed_transaction(
        &self,
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: &str,
        category: &str,
        date: NaiveDate,
    ) -> Transaction {
        let mut store = self.store.lock().unwrap();
        let transaction = Transaction {
            id: store.next_id(),
            account_id,
            transaction_type,
            amount: amount.parse().unwrap(),
            category: category.to_string(),
            date,
            description: None,
        };
        store.transactions.push(transaction.clone());
        transaction
    }

    /// Make every later call to `method` fail with a 500
    pub fn fail_on(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    /// Stall every call for `delay` before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn transaction_count(&self) -> usize {
        self.store.lock().unwrap().transactions.len()
    }

    async fn enter(&self, method: &'static str) -> ApiResult<()> {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(method) {
            return Err(ApiError::Status {
                status: 500,
                detail: Some(format!("{} failed", method)),
            });
        }
        Ok(())
    }

    fn filtered(&self, account_id: AccountId, range: Option<DateRange>) -> Vec<Transaction> {
        self.store
            .lock()
            .unwrap()
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .filter(|t| range.map(|r| r.contains(t.date)).unwrap_or(true))
            .cloned()
            .collect()
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        detail: Some(format!("{} not found", what)),
    }
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        self.enter("list_accounts").await?;
        Ok(self.store.lock().unwrap().accounts.clone())
    }

    async fn create_account(&self, name: &str, account_type: AccountType) -> ApiResult<Account> {
        self.enter("create_account").await?;
        Ok(self.seed_account(name, account_type))
    }

    async fn delete_account(&self, id: AccountId) -> ApiResult<()> {
        self.enter("delete_account").await?;
        let mut store = self.store.lock().unwrap();
        let before = store.accounts.len();
        store.accounts.retain(|a| a.id != id);
        if store.accounts.len() == before {
            return Err(not_found("Account"));
        }
        store.transactions.retain(|t| t.account_id != id);
        Ok(())
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.enter("list_categories").await?;
        Ok(self.store.lock().unwrap().categories.clone())
    }

    async fn create_category(&self, name: &str) -> ApiResult<Category> {
        self.enter("create_category").await?;
        Ok(self.seed_category(name))
    }

    async fn delete_category(&self, id: CategoryId) -> ApiResult<()> {
        self.enter("delete_category").await?;
        let mut store = self.store.lock().unwrap();
        let before = store.categories.len();
        store.categories.retain(|c| c.id != id);
        if store.categories.len() == before {
            return Err(not_found("Category"));
        }
        Ok(())
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<Vec<Transaction>> {
        self.enter("list_transactions").await?;
        Ok(self.filtered(account_id, range))
    }

    async fn get_transaction(&self, id: TransactionId) -> ApiResult<Transaction> {
        self.enter("get_transaction").await?;
        self.store
            .lock()
            .unwrap()
            .transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Transaction"))
    }

    async fn create_transaction(
        &self,
        account_id: AccountId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        self.enter("create_transaction").await?;
        let mut store = self.store.lock().unwrap();
        if !store.accounts.iter().any(|a| a.id == account_id) {
            return Err(not_found("Account"));
        }
        let created = Transaction {
            id: store.next_id(),
            account_id,
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            category: transaction.category.clone(),
            date: transaction.date,
            description: Some(transaction.description.clone()),
        };
        store.transactions.push(created.clone());
        Ok(created)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> ApiResult<Transaction> {
        self.enter("update_transaction").await?;
        let mut store = self.store.lock().unwrap();
        let existing = store
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Transaction"))?;
        existing.transaction_type = update.transaction_type;
        existing.amount = update.amount;
        existing.category = update.category.clone();
        existing.description = Some(update.description.clone());
        Ok(existing.clone())
    }

    async fn delete_transaction(&self, id: TransactionId) -> ApiResult<()> {
        self.enter("delete_transaction").await?;
        let mut store = self.store.lock().unwrap();
        let before = store.transactions.len();
        store.transactions.retain(|t| t.id != id);
        if store.transactions.len() == before {
            return Err(not_found("Transaction"));
        }
        Ok(())
    }

    async fn transaction_summary(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<TransactionSummary> {
        self.enter("transaction_summary").await?;
        Ok(report::summarize(&self.filtered(account_id, range)))
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Confirmation that always answers `answer` and counts prompts
pub(crate) struct ScriptedConfirm {
    pub answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl super::Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}
