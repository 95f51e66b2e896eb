//! HTTP API server

pub mod accounts;
pub mod error;
pub mod expenses;
pub mod server;
pub mod todos;

pub use error::{ApiError, ApiResult, ErrorBody};
pub use server::*;
