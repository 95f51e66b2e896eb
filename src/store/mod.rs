//! Persistence for users, todos and ledger entries
//!
//! Each operation is a single statement; handlers never need a transaction.
//! Every resource query is scoped by owner email.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

pub use memory::MemoryStore;
pub use models::*;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, email: &str) -> Result<Option<User>>;

    /// Fails with `Error::UserAlreadyExists` if the email is taken
    async fn insert_user(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn list_todos(&self, owner: &str) -> Result<Vec<Todo>>;

    async fn create_todo(&self, owner: &str, input: &TodoInput) -> Result<Todo>;

    /// Returns `None` when `id` does not exist for `owner`
    async fn update_todo(&self, owner: &str, id: Uuid, input: &TodoInput) -> Result<Option<Todo>>;

    async fn delete_todo(&self, owner: &str, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Newest first, at most `limit` rows when given
    async fn list_expenses(&self, owner: &str, limit: Option<i64>) -> Result<Vec<Expense>>;

    async fn create_expense(&self, owner: &str, input: &ExpenseInput) -> Result<Expense>;

    async fn delete_expense(&self, owner: &str, id: Uuid) -> Result<bool>;
}

/// Everything the API needs from persistence
pub trait Store: UserStore + TodoStore + ExpenseStore {}

impl<T: UserStore + TodoStore + ExpenseStore> Store for T {}
