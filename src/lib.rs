//! Tallyboard - todo and expense tracking API
//!
//! This is the library interface for Tallyboard: the HTTP API, the
//! token/password auth layer it is built on, and the stores behind it.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use config::Config;
pub use error::Error;
