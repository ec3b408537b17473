use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use kassa_auth::{DEFAULT_COST, RehashPolicy};
use kassa_db::DEFAULT_DB_PATH;
use kassa_types::NewUser;

/// Startup settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bcrypt_cost: u32,
    pub rehash_policy: RehashPolicy,
    /// Drop the products table before migrating.
    pub purge: bool,
    /// Append the starter catalog after migrating.
    pub seed: bool,
    pub admin: Option<AdminAccount>,
}

/// Account created on startup when it does not exist yet.
#[derive(Clone)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

impl AdminAccount {
    pub fn to_new_user(&self) -> NewUser {
        NewUser::new(self.username.clone(), self.password.clone())
    }
}

impl std::fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("KASSA_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();

        let bcrypt_cost = match lookup("KASSA_BCRYPT_COST") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("KASSA_BCRYPT_COST is not a number: {v:?}"))?,
            None => DEFAULT_COST,
        };

        let rehash_policy = match lookup("KASSA_REHASH_POLICY") {
            Some(v) => v.parse().map_err(anyhow::Error::msg)?,
            None => RehashPolicy::default(),
        };

        let purge = parse_flag("KASSA_PURGE", lookup("KASSA_PURGE"))?;
        let seed = parse_flag("KASSA_SEED", lookup("KASSA_SEED"))?;

        let admin = match (lookup("KASSA_ADMIN_USERNAME"), lookup("KASSA_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminAccount { username, password }),
            (None, None) => None,
            _ => bail!("KASSA_ADMIN_USERNAME and KASSA_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            db_path,
            bcrypt_cost,
            rehash_policy,
            purge,
            seed,
            admin,
        })
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{key} must be a boolean, got {other:?}"),
    }
}
