//! Authentication and request authorization

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{Claims, TokenService};
pub use middleware::{authenticate, authorize, extract_token, require_owner};
pub use models::{
    normalize_email, AuthError, AuthUser, LoginRequest, SessionResponse, SignupRequest,
};
pub use password::{hash_password, verify_password};
