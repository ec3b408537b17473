//! Full bootstrap lifecycle against an on-disk database file.

use kassa_db::Database;
use kassa_db::seed::CATALOG;
use kassa_types::Product;

fn fresh_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::connect(&dir.path().join("data").join("kassa.db")).expect("connect");
    (dir, db)
}

#[test]
fn connect_migrate_seed_list() {
    let (_dir, db) = fresh_db();
    db.migrate().unwrap();
    assert_eq!(db.seed().unwrap(), 12);

    let products: Vec<Product> = db
        .list_products()
        .unwrap()
        .into_iter()
        .map(Product::from)
        .collect();
    assert_eq!(products.len(), 12);

    let first = products.first().unwrap();
    assert_eq!(first.name, "🎟️ Regular");
    assert_eq!(first.price, 40);

    let last = products.last().unwrap();
    assert_eq!(last.name, "☕ Coffee Mug");
    assert_eq!(last.price, 1);

    let seeded: Vec<(&str, i64)> = products.iter().map(|p| (p.name.as_str(), p.price)).collect();
    assert_eq!(seeded, CATALOG.to_vec());
}

#[test]
fn seed_twice_appends_duplicates() {
    let (_dir, db) = fresh_db();
    db.migrate().unwrap();
    db.seed().unwrap();
    db.seed().unwrap();

    let products = db.list_products().unwrap();
    assert_eq!(products.len(), 24);
    assert_eq!(products[0].name, products[12].name);
}

#[test]
fn purge_then_migrate_recreates_empty_table() {
    let (_dir, db) = fresh_db();
    db.migrate().unwrap();
    db.seed().unwrap();

    db.purge().unwrap();
    let err = db.list_products().unwrap_err();
    assert!(err.to_string().contains("no such table"), "unexpected error: {err}");

    db.migrate().unwrap();
    assert!(db.list_products().unwrap().is_empty());
    assert_eq!(db.count_products().unwrap(), 0);
}

#[test]
fn purge_keeps_users() {
    let (_dir, db) = fresh_db();
    db.migrate().unwrap();
    db.insert_user("cashier", "$2b$04$not-a-real-hash").unwrap();

    db.purge().unwrap();
    assert!(db.get_user_by_username("cashier").unwrap().is_some());
}

#[test]
fn shared_handle_across_threads() {
    let (_dir, db) = fresh_db();
    db.migrate().unwrap();
    let db = std::sync::Arc::new(db);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = db.clone();
            std::thread::spawn(move || db.seed().unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.count_products().unwrap(), 48);
}
