//! In-memory store for tests and local runs without a database

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Expense, ExpenseInput, ExpenseStore, Todo, TodoInput, TodoStore, User, UserStore};
use crate::error::{Error, Result};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    todos: Vec<Todo>,
    expenses: Vec<Expense>,
}

/// Keeps everything in process memory. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(email).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.email) {
            return Err(Error::UserAlreadyExists(user.email.clone()));
        }
        tables.users.insert(user.email.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todos(&self, owner: &str) -> Result<Vec<Todo>> {
        let tables = self.tables.read().await;
        let mut todos: Vec<Todo> = tables
            .todos
            .iter()
            .filter(|t| t.user_email == owner)
            .cloned()
            .collect();
        todos.sort_by_key(|t| t.date);
        Ok(todos)
    }

    async fn create_todo(&self, owner: &str, input: &TodoInput) -> Result<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            user_email: owner.to_string(),
            title: input.title.clone(),
            progress: input.progress,
            date: input.date,
        };
        self.tables.write().await.todos.push(todo.clone());
        Ok(todo)
    }

    async fn update_todo(&self, owner: &str, id: Uuid, input: &TodoInput) -> Result<Option<Todo>> {
        let mut tables = self.tables.write().await;
        let Some(todo) = tables
            .todos
            .iter_mut()
            .find(|t| t.id == id && t.user_email == owner)
        else {
            return Ok(None);
        };

        todo.title = input.title.clone();
        todo.progress = input.progress;
        todo.date = input.date;
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, owner: &str, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.todos.len();
        tables
            .todos
            .retain(|t| !(t.id == id && t.user_email == owner));
        Ok(tables.todos.len() < before)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn list_expenses(&self, owner: &str, limit: Option<i64>) -> Result<Vec<Expense>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Expense> = tables
            .expenses
            .iter()
            .filter(|e| e.user_email == owner)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        if let Some(limit) = limit {
            entries.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(entries)
    }

    async fn create_expense(&self, owner: &str, input: &ExpenseInput) -> Result<Expense> {
        let entry = Expense {
            id: Uuid::new_v4(),
            user_email: owner.to_string(),
            title: input.title.clone(),
            amount_cents: input.amount_cents,
            kind: input.kind,
            date: input.date,
        };
        self.tables.write().await.expenses.push(entry.clone());
        Ok(entry)
    }

    async fn delete_expense(&self, owner: &str, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables
            .expenses
            .retain(|e| !(e.id == id && e.user_email == owner));
        Ok(tables.expenses.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntryKind;
    use chrono::NaiveDate;

    fn user(email: &str) -> User {
        User {
            email: email.to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@x.com")).await.unwrap();

        let result = store.insert_user(&user("a@x.com")).await;
        assert!(matches!(result, Err(Error::UserAlreadyExists(_))));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_todos_scoped_to_owner() {
        let store = MemoryStore::new();
        let input = TodoInput {
            title: "Walk dog".to_string(),
            progress: 10,
            date: day(2),
        };
        let todo = store.create_todo("a@x.com", &input).await.unwrap();

        assert_eq!(store.list_todos("a@x.com").await.unwrap().len(), 1);
        assert!(store.list_todos("b@x.com").await.unwrap().is_empty());
        assert!(store.update_todo("b@x.com", todo.id, &input).await.unwrap().is_none());
        assert!(!store.delete_todo("b@x.com", todo.id).await.unwrap());
        assert!(store.delete_todo("a@x.com", todo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_todo() {
        let store = MemoryStore::new();
        let mut input = TodoInput {
            title: "Walk dog".to_string(),
            progress: 10,
            date: day(2),
        };
        let todo = store.create_todo("a@x.com", &input).await.unwrap();

        input.progress = 100;
        let updated = store
            .update_todo("a@x.com", todo.id, &input)
            .await
            .unwrap()
            .expect("todo should exist");
        assert_eq!(updated.progress, 100);
        assert_eq!(updated.id, todo.id);
    }

    #[tokio::test]
    async fn test_expenses_newest_first_with_limit() {
        let store = MemoryStore::new();
        for d in [3, 1, 2] {
            let input = ExpenseInput {
                title: format!("day {}", d),
                amount_cents: 100,
                kind: EntryKind::Expense,
                date: day(d),
            };
            store.create_expense("a@x.com", &input).await.unwrap();
        }

        let all = store.list_expenses("a@x.com", None).await.unwrap();
        let dates: Vec<_> = all.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(3), day(2), day(1)]);

        let limited = store.list_expenses("a@x.com", Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].date, day(3));
    }
}
