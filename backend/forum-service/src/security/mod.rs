/// Credential handling: password hashing and session tokens
pub mod password;
pub mod session_token;

pub use password::{hash_password, verify_dummy_password, verify_password};
pub use session_token::{generate_token, hash_token};
