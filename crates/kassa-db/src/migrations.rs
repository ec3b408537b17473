use anyhow::{Result, bail};
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{debug, info};

/// A column as it appears in `CREATE TABLE`, plus the declaration used when
/// it has to be bolted onto an older table. SQLite's `ADD COLUMN` refuses
/// primary keys, unique constraints and non-constant defaults, so those
/// columns have no `add` form.
struct Column {
    name: &'static str,
    create: &'static str,
    add: Option<&'static str>,
}

struct Table {
    name: &'static str,
    columns: &'static [Column],
}

const CREATED_AT: Column = Column {
    name: "created_at",
    create: "TEXT NOT NULL DEFAULT (datetime('now'))",
    add: Some("TEXT NOT NULL DEFAULT '1970-01-01 00:00:00'"),
};

const UPDATED_AT: Column = Column {
    name: "updated_at",
    create: "TEXT NOT NULL DEFAULT (datetime('now'))",
    add: Some("TEXT NOT NULL DEFAULT '1970-01-01 00:00:00'"),
};

const DELETED_AT: Column = Column {
    name: "deleted_at",
    create: "TEXT",
    add: Some("TEXT"),
};

const USERS: Table = Table {
    name: "users",
    columns: &[
        Column {
            name: "id",
            create: "INTEGER PRIMARY KEY",
            add: None,
        },
        Column {
            name: "username",
            create: "TEXT NOT NULL UNIQUE",
            add: None,
        },
        Column {
            name: "password",
            create: "TEXT NOT NULL",
            add: None,
        },
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

const PRODUCTS: Table = Table {
    name: "products",
    columns: &[
        Column {
            name: "id",
            create: "INTEGER PRIMARY KEY",
            add: None,
        },
        Column {
            name: "name",
            create: "TEXT NOT NULL",
            add: Some("TEXT NOT NULL DEFAULT ''"),
        },
        Column {
            name: "price",
            create: "INTEGER NOT NULL CHECK (price >= 0)",
            add: Some("INTEGER NOT NULL DEFAULT 0"),
        },
        CREATED_AT,
        UPDATED_AT,
        DELETED_AT,
    ],
};

/// Bring every table up to its declared shape. Additive only.
pub fn run(conn: &Connection) -> Result<()> {
    for table in [&USERS, &PRODUCTS] {
        ensure_table(conn, table)?;
    }

    info!("Database migrations complete");
    Ok(())
}

pub fn drop_products(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", PRODUCTS.name))?;
    info!("Dropped table {}", PRODUCTS.name);
    Ok(())
}

fn ensure_table(conn: &Connection, table: &Table) -> Result<()> {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.create))
        .collect();
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table.name,
        columns.join(", ")
    ))?;

    let existing = existing_columns(conn, table.name)?;
    for column in table.columns.iter().filter(|c| !existing.contains(c.name)) {
        let Some(decl) = column.add else {
            bail!(
                "table {} is missing column {} which cannot be added in place",
                table.name,
                column.name
            );
        };
        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table.name, column.name, decl
        ))?;
        debug!(table = table.name, column = column.name, "added missing column");
    }

    Ok(())
}

fn existing_columns(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(names)
}
