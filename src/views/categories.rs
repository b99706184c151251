//! Categories list

use std::sync::Arc;

use super::forms::CategoryForm;
use super::{Confirm, ScopeHandle, ViewError, ViewScope, ViewState};
use crate::api::LedgerApi;
use crate::model::{Category, CategoryId};

pub const DELETE_CATEGORY_PROMPT: &str = "Are you sure you want to delete this category?";

pub struct CategoriesView {
    api: Arc<dyn LedgerApi>,
    state: ViewState<Vec<Category>>,
    scope: ViewScope,
}

impl CategoriesView {
    pub fn new(api: Arc<dyn LedgerApi>) -> Self {
        Self {
            api,
            state: ViewState::Loading,
            scope: ViewScope::new(),
        }
    }

    pub fn state(&self) -> &ViewState<Vec<Category>> {
        &self.state
    }

    pub fn categories(&self) -> &[Category] {
        self.state.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    pub fn close(&self) {
        self.scope.cancel();
    }

    pub async fn load(&mut self) -> Result<(), ViewError> {
        let categories = self
            .scope
            .run(self.api.list_categories())
            .await
            .ok_or(ViewError::Cancelled)?
            .map_err(|e| ViewError::fetch("categories", e))?;

        tracing::debug!(count = categories.len(), "Categories loaded");
        self.state = ViewState::Ready(categories);
        Ok(())
    }

    pub async fn create(&mut self, form: &CategoryForm) -> Result<Category, ViewError> {
        let name = form.validate()?;

        let result = self.scope.run(self.api.create_category(&name)).await;

        let category = match result {
            None => return Err(ViewError::Cancelled),
            Some(Err(e)) => return Err(ViewError::failed("Failed to add category", e)),
            Some(Ok(category)) => category,
        };

        self.reload().await;
        Ok(category)
    }

    /// Existing transactions keep the category name after deletion
    pub async fn delete(
        &mut self,
        id: CategoryId,
        confirm: &dyn Confirm,
    ) -> Result<bool, ViewError> {
        if !confirm.confirm(DELETE_CATEGORY_PROMPT) {
            return Ok(false);
        }

        let result = self.scope.run(self.api.delete_category(id)).await;

        match result {
            None => Err(ViewError::Cancelled),
            Some(Err(e)) => Err(ViewError::failed("Failed to delete category", e)),
            Some(Ok(())) => {
                self.reload().await;
                Ok(true)
            }
        }
    }

    async fn reload(&mut self) {
        if let Err(e) = self.load().await {
            tracing::warn!(error = %e, "Failed to refresh categories");
        }
    }
}
