use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// The starter catalog: ticket tiers, shirts by cut and size, and a mug.
/// Order matters; ids are assigned in this order on an empty table.
pub const CATALOG: [(&str, i64); 12] = [
    ("🎟️ Regular", 40),
    ("🎟️ Reduced", 20),
    ("🎟️ Free", 0),
    ("👕 T-Shirt Male S", 20),
    ("👕 T-Shirt Male M", 20),
    ("👕 T-Shirt Male L", 20),
    ("👕 T-Shirt Male XL", 20),
    ("👕 T-Shirt Female S", 20),
    ("👕 T-Shirt Female M", 20),
    ("👕 T-Shirt Female L", 20),
    ("👕 T-Shirt Female XL", 20),
    ("☕ Coffee Mug", 1),
];

/// Insert [`CATALOG`] in a single transaction. Nothing dedupes by name, so
/// calling this again appends another twelve rows.
pub fn insert_catalog(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare("INSERT INTO products (name, price) VALUES (?1, ?2)")?;
        for (name, price) in CATALOG {
            stmt.execute((name, price))?;
        }
    }
    tx.commit()?;

    info!(count = CATALOG.len(), "Seeded product catalog");
    Ok(CATALOG.len())
}
