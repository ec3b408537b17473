//! Credential store: every path that writes a user password goes through
//! here, so the `users.password` column only ever holds bcrypt hashes.

pub mod error;
pub mod hasher;
pub mod store;

pub use error::AuthError;
pub use hasher::{CheckPassword, DEFAULT_COST, PasswordHasher, verify_password};
pub use store::{RehashPolicy, UserStore};
