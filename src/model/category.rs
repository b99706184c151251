use serde::{Deserialize, Serialize};

/// Server-assigned category identifier
pub type CategoryId = i64;

/// A label for grouping transactions, shared across all accounts.
///
/// Transactions reference categories by name, not by id, so deleting a
/// category leaves existing transactions untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
