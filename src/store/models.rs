//! Records kept by the store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A registered account. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub email: String,
    pub first_name: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            first_name: user.first_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: Uuid,
    pub user_email: String,
    pub title: String,
    /// Percent complete, 0 to 100
    pub progress: i32,
    pub date: NaiveDate,
}

/// Client-supplied todo fields
#[derive(Debug, Clone, Deserialize)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub progress: i32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(format!("Unknown entry kind: {}", other)),
        }
    }
}

/// A line in the income/expense ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub user_email: String,
    pub title: String,
    /// Always positive; `kind` carries the direction
    pub amount_cents: i64,
    pub kind: EntryKind,
    pub date: NaiveDate,
}

/// Client-supplied ledger fields
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseInput {
    pub title: String,
    pub amount_cents: i64,
    pub kind: EntryKind,
    pub date: NaiveDate,
}
