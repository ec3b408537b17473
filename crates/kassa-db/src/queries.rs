use crate::Database;
use crate::models::{PRODUCT_COLUMNS, ProductRow, USER_COLUMNS, UserRow};
use anyhow::{Result, bail};
use kassa_types::NewProduct;
use rusqlite::Connection;

impl Database {
    // -- Products --

    pub fn list_products(&self) -> Result<Vec<ProductRow>> {
        self.with_conn(query_products)
    }

    pub fn get_product(&self, id: i64) -> Result<Option<ProductRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                [id],
                ProductRow::from_row,
            )
            .optional()
        })
    }

    /// Insert one product and return its id.
    pub fn insert_product(&self, product: &NewProduct) -> Result<i64> {
        if product.price < 0 {
            bail!("price must not be negative (got {})", product.price);
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO products (name, price) VALUES (?1, ?2)",
                (&product.name, product.price),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn count_products(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?)
        })
    }

    // -- Users --
    //
    // These take an already-hashed password. Callers outside kassa-auth
    // should go through its user store instead.

    pub fn insert_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                [username],
                UserRow::from_row,
            )
            .optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                UserRow::from_row,
            )
            .optional()
        })
    }

    /// Apply a rename and/or a new password hash in one transaction, so a
    /// failure leaves the row untouched. Returns false when no user has
    /// this id.
    pub fn update_user(
        &self,
        id: i64,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }
            if let Some(username) = username {
                tx.execute(
                    "UPDATE users SET username = ?1, updated_at = datetime('now') WHERE id = ?2",
                    (username, id),
                )?;
            }
            if let Some(password_hash) = password_hash {
                tx.execute(
                    "UPDATE users SET password = ?1, updated_at = datetime('now') WHERE id = ?2",
                    (password_hash, id),
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
    }

    /// Returns false when no user has this id.
    pub fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1, updated_at = datetime('now') WHERE id = ?2",
                (password_hash, id),
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_products(conn: &Connection) -> Result<Vec<ProductRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products ORDER BY id",
        PRODUCT_COLUMNS
    ))?;

    let rows = stmt
        .query_map([], ProductRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// True when `err` came from SQLite rejecting a UNIQUE or CHECK constraint.
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
