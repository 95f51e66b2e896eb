//! PostgreSQL-backed store
//!
//! Expected tables:
//!
//! ```sql
//! CREATE TABLE users (
//!     email VARCHAR(255) PRIMARY KEY,
//!     first_name VARCHAR(255) NOT NULL,
//!     last_name VARCHAR(255) NOT NULL,
//!     hashed_password VARCHAR(255) NOT NULL
//! );
//! CREATE TABLE todos (
//!     id UUID PRIMARY KEY,
//!     user_email VARCHAR(255) NOT NULL REFERENCES users(email),
//!     title VARCHAR(255) NOT NULL,
//!     progress INT NOT NULL,
//!     date DATE NOT NULL
//! );
//! CREATE TABLE expenses (
//!     id UUID PRIMARY KEY,
//!     user_email VARCHAR(255) NOT NULL REFERENCES users(email),
//!     title VARCHAR(255) NOT NULL,
//!     amount_cents BIGINT NOT NULL,
//!     kind VARCHAR(16) NOT NULL,
//!     date DATE NOT NULL
//! );
//! ```

use async_trait::async_trait;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

use super::{
    EntryKind, Expense, ExpenseInput, ExpenseStore, Todo, TodoInput, TodoStore, User, UserStore,
};
use crate::error::{Error, Result};

pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect and spawn the connection driver
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(Self { client })
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("hashed_password"),
    }
}

fn todo_from_row(row: &Row) -> Todo {
    Todo {
        id: row.get("id"),
        user_email: row.get("user_email"),
        title: row.get("title"),
        progress: row.get("progress"),
        date: row.get("date"),
    }
}

fn expense_from_row(row: &Row) -> Result<Expense> {
    let kind: String = row.get("kind");
    Ok(Expense {
        id: row.get("id"),
        user_email: row.get("user_email"),
        title: row.get("title"),
        amount_cents: row.get("amount_cents"),
        kind: kind.parse::<EntryKind>().map_err(Error::Other)?,
        date: row.get("date"),
    })
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .client
            .query_opt(
                "SELECT email, first_name, last_name, hashed_password FROM users WHERE email = $1",
                &[&email],
            )
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let result = self
            .client
            .execute(
                "INSERT INTO users (email, first_name, last_name, hashed_password) VALUES ($1, $2, $3, $4)",
                &[&user.email, &user.first_name, &user.last_name, &user.password_hash],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
                Err(Error::UserAlreadyExists(user.email.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_todos(&self, owner: &str) -> Result<Vec<Todo>> {
        let rows = self
            .client
            .query(
                "SELECT id, user_email, title, progress, date FROM todos WHERE user_email = $1 ORDER BY date",
                &[&owner],
            )
            .await?;

        Ok(rows.iter().map(todo_from_row).collect())
    }

    async fn create_todo(&self, owner: &str, input: &TodoInput) -> Result<Todo> {
        let row = self
            .client
            .query_one(
                "INSERT INTO todos (id, user_email, title, progress, date) VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, user_email, title, progress, date",
                &[&Uuid::new_v4(), &owner, &input.title, &input.progress, &input.date],
            )
            .await?;

        Ok(todo_from_row(&row))
    }

    async fn update_todo(&self, owner: &str, id: Uuid, input: &TodoInput) -> Result<Option<Todo>> {
        let row = self
            .client
            .query_opt(
                "UPDATE todos SET title = $1, progress = $2, date = $3 WHERE id = $4 AND user_email = $5 \
                 RETURNING id, user_email, title, progress, date",
                &[&input.title, &input.progress, &input.date, &id, &owner],
            )
            .await?;

        Ok(row.as_ref().map(todo_from_row))
    }

    async fn delete_todo(&self, owner: &str, id: Uuid) -> Result<bool> {
        let deleted = self
            .client
            .execute(
                "DELETE FROM todos WHERE id = $1 AND user_email = $2",
                &[&id, &owner],
            )
            .await?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl ExpenseStore for PgStore {
    async fn list_expenses(&self, owner: &str, limit: Option<i64>) -> Result<Vec<Expense>> {
        // LIMIT NULL means no limit
        let rows = self
            .client
            .query(
                "SELECT id, user_email, title, amount_cents, kind, date FROM expenses \
                 WHERE user_email = $1 ORDER BY date DESC LIMIT $2",
                &[&owner, &limit],
            )
            .await?;

        rows.iter().map(expense_from_row).collect()
    }

    async fn create_expense(&self, owner: &str, input: &ExpenseInput) -> Result<Expense> {
        let row = self
            .client
            .query_one(
                "INSERT INTO expenses (id, user_email, title, amount_cents, kind, date) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING id, user_email, title, amount_cents, kind, date",
                &[
                    &Uuid::new_v4(),
                    &owner,
                    &input.title,
                    &input.amount_cents,
                    &input.kind.as_str(),
                    &input.date,
                ],
            )
            .await?;

        expense_from_row(&row)
    }

    async fn delete_expense(&self, owner: &str, id: Uuid) -> Result<bool> {
        let deleted = self
            .client
            .execute(
                "DELETE FROM expenses WHERE id = $1 AND user_email = $2",
                &[&id, &owner],
            )
            .await?;

        Ok(deleted > 0)
    }
}
