use std::fmt;

use serde::Deserialize;

// -- Users --

/// Registration input. `password` is plaintext and only lives until the
/// credential store hashes it.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Changes to a user that never involve the credential.
/// Passwords are changed through the dedicated set-password operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub username: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
    }
}

// -- Products --

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_debug_hides_password() {
        let user = NewUser::new("cashier", "hunter22");
        let printed = format!("{:?}", user);
        assert!(printed.contains("cashier"));
        assert!(!printed.contains("hunter22"));
    }

    #[test]
    fn profile_update_rejects_password_field() {
        let res: Result<ProfileUpdate, _> =
            serde_json::from_str(r#"{"username":"a","password":"b"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn empty_profile_update() {
        assert!(ProfileUpdate::default().is_empty());
        let update: ProfileUpdate = serde_json::from_str(r#"{"username":"bar"}"#).unwrap();
        assert!(!update.is_empty());
    }
}
