//! Credential store error types.

/// Errors raised while hashing, verifying or persisting credentials.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("bcrypt cost {0} is outside the supported range 4..=31")]
    InvalidCost(u32),

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("password is {0} bytes, bcrypt accepts at most 72")]
    PasswordTooLong(usize),

    #[error("password hashing failed: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    #[error("stored password is not a valid bcrypt hash")]
    MalformedHash,

    #[error("password does not match")]
    PasswordMismatch,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("no user with id {0}")]
    UserNotFound(i64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
