mod config;

use anyhow::Context;
use tracing::info;

use kassa_auth::{AuthError, PasswordHasher, UserStore};
use kassa_db::Database;

use crate::config::Config;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kassa=info,kassa_db=info,kassa_auth=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        db_path = %cfg.db_path.display(),
        bcrypt_cost = cfg.bcrypt_cost,
        rehash_policy = %cfg.rehash_policy,
        purge = cfg.purge,
        seed = cfg.seed,
        "Starting kassa bootstrap"
    );

    // Any failure below is a broken startup precondition; `?` ends the process.
    let db = Database::connect(&cfg.db_path)?;

    if cfg.purge {
        db.purge().context("purge failed")?;
    }
    db.migrate().context("migration failed")?;
    if cfg.seed {
        db.seed().context("seeding failed")?;
    }

    let hasher = PasswordHasher::new(cfg.bcrypt_cost)?;
    let users = UserStore::new(&db, hasher).with_policy(cfg.rehash_policy);

    if let Some(admin) = &cfg.admin {
        match users.create_user(&admin.to_new_user()) {
            Ok(user) => info!(user_id = user.id, "Admin account created"),
            Err(AuthError::UsernameTaken(_)) => info!("Admin account already present"),
            Err(e) => return Err(e).context("failed to create admin account"),
        }
    }

    info!(products = db.count_products()?, "Database ready");
    Ok(())
}
