use std::fmt;
use std::str::FromStr;

use kassa_db::Database;
use kassa_db::queries::is_constraint_violation;
use kassa_types::{NewUser, ProfileUpdate, User};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::hasher::{PasswordHasher, verify_password};

/// What a profile update does to the stored password.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RehashPolicy {
    /// Only [`UserStore::set_password`] writes the password column.
    #[default]
    ExplicitOnly,
    /// Every profile update rehashes whatever the password column holds,
    /// which is already a hash. The stored value churns on every write and
    /// the user's old password stops verifying. Kept for parity with
    /// deployments that relied on that behaviour.
    Always,
}

impl FromStr for RehashPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" | "explicit-only" => Ok(Self::ExplicitOnly),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown rehash policy: {other}")),
        }
    }
}

impl fmt::Display for RehashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitOnly => f.write_str("explicit"),
            Self::Always => f.write_str("always"),
        }
    }
}

/// User repository. Creating a user and setting a password hash the
/// plaintext before anything reaches the database.
pub struct UserStore<'a> {
    db: &'a Database,
    hasher: PasswordHasher,
    policy: RehashPolicy,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a Database, hasher: PasswordHasher) -> Self {
        Self {
            db,
            hasher,
            policy: RehashPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RehashPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn create_user(&self, new_user: &NewUser) -> Result<User, AuthError> {
        let password_hash = self.hasher.hash(&new_user.password)?;

        let id = self
            .db
            .insert_user(&new_user.username, &password_hash)
            .map_err(|e| taken_or_storage(e, &new_user.username))?;

        info!(user_id = id, username = %new_user.username, "Created user");
        self.load(id)
    }

    /// Apply non-credential changes. Under [`RehashPolicy::Always`] the
    /// password column is rehashed as well, even for an empty update. The
    /// rename and the rehash land together or not at all.
    pub fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<User, AuthError> {
        let current = self.load(id)?;
        if update.is_empty() && self.policy == RehashPolicy::ExplicitOnly {
            return Ok(current);
        }

        let rename = update
            .username
            .as_deref()
            .filter(|name| *name != current.username);
        let rehashed = match self.policy {
            RehashPolicy::Always => Some(self.hasher.hash(&current.password)?),
            RehashPolicy::ExplicitOnly => None,
        };

        if rename.is_none() && rehashed.is_none() {
            return Ok(current);
        }

        let updated = self
            .db
            .update_user(id, rename, rehashed.as_deref())
            .map_err(|e| taken_or_storage(e, rename.unwrap_or(&current.username)))?;
        if !updated {
            return Err(AuthError::UserNotFound(id));
        }

        if let Some(username) = rename {
            debug!(user_id = id, username, "Renamed user");
        }
        if rehashed.is_some() {
            warn!(user_id = id, "Rehashed stored password on profile update");
        }

        self.load(id)
    }

    /// Replace the password with a hash of `plaintext`.
    pub fn set_password(&self, id: i64, plaintext: &str) -> Result<(), AuthError> {
        let password_hash = self.hasher.hash(plaintext)?;
        if !self.db.update_user_password(id, &password_hash)? {
            return Err(AuthError::UserNotFound(id));
        }
        info!(user_id = id, "Password changed");
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        Ok(self.db.get_user_by_id(id)?.map(User::from))
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.db.get_user_by_username(username)?.map(User::from))
    }

    /// Look up `username` and check `plaintext`. Unknown users and wrong
    /// passwords both come back as [`AuthError::InvalidCredentials`].
    pub fn authenticate(&self, username: &str, plaintext: &str) -> Result<User, AuthError> {
        let user = self
            .find_by_username(username)?
            .ok_or(AuthError::InvalidCredentials)?;

        match verify_password(plaintext, &user.password) {
            Ok(()) => Ok(user),
            Err(AuthError::PasswordMismatch) => {
                debug!(user_id = user.id, "Password mismatch");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    fn load(&self, id: i64) -> Result<User, AuthError> {
        self.find_by_id(id)?.ok_or(AuthError::UserNotFound(id))
    }
}

fn taken_or_storage(err: anyhow::Error, username: &str) -> AuthError {
    if is_constraint_violation(&err) {
        AuthError::UsernameTaken(username.to_string())
    } else {
        AuthError::Storage(err)
    }
}
