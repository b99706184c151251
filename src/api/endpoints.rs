//! `LedgerApi` over HTTP

use async_trait::async_trait;

use super::client::ApiClient;
use super::error::ApiResult;
use super::LedgerApi;
use crate::model::{
    Account, AccountId, AccountType, Category, CategoryId, NewTransaction, Transaction,
    TransactionId, TransactionSummary, TransactionUpdate,
};
use crate::report::DateRange;

/// `account_id` plus the date bounds, which are only sent together
fn transaction_query(account_id: AccountId, range: Option<DateRange>) -> Vec<(&'static str, String)> {
    let mut query = vec![("account_id", account_id.to_string())];
    if let Some(range) = range {
        query.extend(range.query_pairs());
    }
    query
}

#[async_trait]
impl LedgerApi for ApiClient {
    async fn list_accounts(&self) -> ApiResult<Vec<Account>> {
        self.execute_json(self.get("/accounts")).await
    }

    async fn create_account(&self, name: &str, account_type: AccountType) -> ApiResult<Account> {
        let request = self
            .post("/accounts")
            .query(&[("name", name), ("account_type", account_type.as_str())]);
        let account: Account = self.execute_json(request).await?;
        tracing::info!(account_id = account.id, name = %account.name, "Account created");
        Ok(account)
    }

    async fn delete_account(&self, id: AccountId) -> ApiResult<()> {
        self.execute_empty(self.delete(&format!("/accounts/{}", id)))
            .await?;
        tracing::info!(account_id = id, "Account deleted");
        Ok(())
    }

    async fn list_categories(&self) -> ApiResult<Vec<Category>> {
        self.execute_json(self.get("/categories")).await
    }

    async fn create_category(&self, name: &str) -> ApiResult<Category> {
        let request = self.post("/categories").query(&[("name", name)]);
        let category: Category = self.execute_json(request).await?;
        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> ApiResult<()> {
        self.execute_empty(self.delete(&format!("/categories/{}", id)))
            .await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }

    async fn list_transactions(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<Vec<Transaction>> {
        let request = self
            .get("/transactions")
            .query(&transaction_query(account_id, range));
        self.execute_json(request).await
    }

    async fn get_transaction(&self, id: TransactionId) -> ApiResult<Transaction> {
        self.execute_json(self.get(&format!("/transactions/{}", id)))
            .await
    }

    async fn create_transaction(
        &self,
        account_id: AccountId,
        transaction: &NewTransaction,
    ) -> ApiResult<Transaction> {
        let request = self
            .post("/transactions")
            .query(&[("account_id", account_id)])
            .json(transaction);
        let created: Transaction = self.execute_json(request).await?;
        tracing::info!(
            transaction_id = created.id,
            account_id,
            kind = %created.transaction_type,
            "Transaction created"
        );
        Ok(created)
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        update: &TransactionUpdate,
    ) -> ApiResult<Transaction> {
        let request = self.put(&format!("/transactions/{}", id)).json(update);
        let updated: Transaction = self.execute_json(request).await?;
        tracing::info!(transaction_id = id, "Transaction updated");
        Ok(updated)
    }

    async fn delete_transaction(&self, id: TransactionId) -> ApiResult<()> {
        self.execute_empty(self.delete(&format!("/transactions/{}", id)))
            .await?;
        tracing::info!(transaction_id = id, "Transaction deleted");
        Ok(())
    }

    async fn transaction_summary(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> ApiResult<TransactionSummary> {
        let request = self
            .get("/transactions/summary")
            .query(&transaction_query(account_id, range));
        self.execute_json(request).await
    }
}
