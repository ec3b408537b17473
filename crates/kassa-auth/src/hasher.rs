use kassa_types::User;

use crate::error::AuthError;

/// Work factor used unless configured otherwise. Roughly a second per hash
/// on current hardware.
pub const DEFAULT_COST: u32 = 14;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing at a fixed cost.
///
/// Hashes use the `$2b$` modular-crypt encoding, which carries the cost
/// and salt alongside the digest. Verification also accepts `$2a$`, `$2x$`
/// and `$2y$` hashes written by other implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `plaintext` with a fresh random salt. Input longer than bcrypt
    /// can read is refused instead of silently truncated.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        if plaintext.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(AuthError::PasswordTooLong(plaintext.len()));
        }
        bcrypt::hash(plaintext, self.cost).map_err(AuthError::Hash)
    }

    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<(), AuthError> {
        verify_password(plaintext, stored_hash)
    }
}

/// Check `plaintext` against a stored bcrypt hash. The cost is read from the
/// hash itself, so this works regardless of the configured hasher.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<(), AuthError> {
    // nothing this long was ever hashed by us; bcrypt would truncate it
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::PasswordMismatch);
    }
    match bcrypt::verify(plaintext, stored_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::PasswordMismatch),
        Err(_) => Err(AuthError::MalformedHash),
    }
}

/// Password comparison on a loaded user record.
pub trait CheckPassword {
    fn check_password(&self, plaintext: &str) -> Result<(), AuthError>;
}

impl CheckPassword for User {
    fn check_password(&self, plaintext: &str) -> Result<(), AuthError> {
        verify_password(plaintext, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::new(MIN_COST).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = fast();
        let hash = hasher.hash("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$2b$04$"));
        hasher.verify("correct horse battery staple", &hash).unwrap();
    }

    #[test]
    fn wrong_password_is_mismatch() {
        let hasher = fast();
        let hash = hasher.hash("kassa-open").unwrap();
        let err = hasher.verify("kassa-closed", &hash).unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));
    }

    #[test]
    fn same_plaintext_gets_distinct_salts() {
        let hasher = fast();
        let a = hasher.hash("till-drawer").unwrap();
        let b = hasher.hash("till-drawer").unwrap();
        assert_ne!(a, b);
        hasher.verify("till-drawer", &a).unwrap();
        hasher.verify("till-drawer", &b).unwrap();
    }

    #[test]
    fn default_cost_is_fourteen() {
        assert_eq!(PasswordHasher::default().cost(), 14);
    }

    #[test]
    fn cost_bounds() {
        assert!(matches!(PasswordHasher::new(3), Err(AuthError::InvalidCost(3))));
        assert!(matches!(PasswordHasher::new(32), Err(AuthError::InvalidCost(32))));
        assert_eq!(PasswordHasher::new(31).unwrap().cost(), 31);
    }

    #[test]
    fn rejects_empty_and_oversized_input() {
        let hasher = fast();
        assert!(matches!(hasher.hash(""), Err(AuthError::EmptyPassword)));

        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hasher.hash(&long), Err(AuthError::PasswordTooLong(73))));
        hasher.hash(&"x".repeat(MAX_PASSWORD_BYTES)).unwrap();
    }

    #[test]
    fn oversized_candidate_never_matches() {
        let hasher = fast();
        let exact = "y".repeat(MAX_PASSWORD_BYTES);
        let hash = hasher.hash(&exact).unwrap();

        let longer = format!("{}z", exact);
        assert!(matches!(
            verify_password(&longer, &hash),
            Err(AuthError::PasswordMismatch)
        ));
    }

    #[test]
    fn hash_error_keeps_source() {
        use std::error::Error;
        let err = AuthError::Hash(bcrypt::BcryptError::CostNotAllowed(3));
        assert!(err.source().is_some());
    }

    #[test]
    fn garbage_hash_is_malformed() {
        let err = verify_password("anything", "plaintext-by-mistake").unwrap_err();
        assert!(matches!(err, AuthError::MalformedHash));
    }

    #[test]
    fn verifies_2a_hashes_from_other_implementations() {
        // crypt_blowfish reference vector
        let hash = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
        verify_password("U*U", hash).unwrap();
        assert!(verify_password("U*V", hash).is_err());
    }
}
