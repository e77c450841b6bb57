//! SQLite-backed record store.
//!
//! Operates on the `Database` wrapper using raw SQL. Order items are held
//! as a JSON column on the order row; inventory and udhar entries map to
//! plain columns. `place_order` runs inside one transaction.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use munim_core::error::{MunimError, Result};
use munim_core::types::{InventoryItem, Order, OrderStatus, UdharEntry, UdharEntryType};

use crate::db::Database;
use crate::{fold_outstanding, PartyBalance, RecordStore};

/// Record store persisted to SQLite.
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            db: Arc::new(Database::new(path)?),
        })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            db: Arc::new(Database::in_memory()?),
        })
    }

    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Completed => "completed",
        OrderStatus::Pending => "pending",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(s: &str) -> OrderStatus {
    match s {
        "pending" => OrderStatus::Pending,
        "cancelled" => OrderStatus::Cancelled,
        _ => OrderStatus::Completed,
    }
}

fn entry_type_to_str(t: UdharEntryType) -> &'static str {
    match t {
        UdharEntryType::Credit => "credit",
        UdharEntryType::Payment => "payment",
    }
}

fn entry_type_from_str(s: &str) -> UdharEntryType {
    match s {
        "payment" => UdharEntryType::Payment,
        _ => UdharEntryType::Credit,
    }
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

fn parse_uuid(s: &str) -> std::result::Result<Uuid, MunimError> {
    Uuid::parse_str(s).map_err(|e| MunimError::Store(format!("Corrupt id column: {}", e)))
}

fn row_to_item(row: &Row<'_>) -> rusqlite::Result<(String, InventoryItem)> {
    let id: String = row.get(0)?;
    let item = InventoryItem {
        id: Uuid::nil(), // replaced by the caller after id parsing
        product_name: row.get(1)?,
        category: row.get(2)?,
        quantity: row.get(3)?,
        unit: row.get(4)?,
        buy_price: row.get(5)?,
        sell_price: row.get(6)?,
        reorder_point: row.get(7)?,
        last_updated: timestamp_to_datetime(row.get(8)?),
    };
    Ok((id, item))
}

fn finish_item(raw: (String, InventoryItem)) -> Result<InventoryItem> {
    let (id, mut item) = raw;
    item.id = parse_uuid(&id)?;
    Ok(item)
}

const ITEM_COLUMNS: &str = "id, product_name, category, quantity, unit, buy_price, sell_price, reorder_point, last_updated";
const ORDER_COLUMNS: &str = "id, order_number, customer_name, items, subtotal, total, profit, payment_method, status, created_at";

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<(String, String, Order)> {
    let id: String = row.get(0)?;
    let items_json: String = row.get(3)?;
    let status: String = row.get(8)?;
    let order = Order {
        id: Uuid::nil(),
        order_number: row.get(1)?,
        customer_name: row.get(2)?,
        items: Vec::new(),
        subtotal: row.get(4)?,
        total: row.get(5)?,
        profit: row.get(6)?,
        payment_method: row.get(7)?,
        status: status_from_str(&status),
        created_at: timestamp_to_datetime(row.get(9)?),
    };
    Ok((id, items_json, order))
}

fn finish_order(raw: (String, String, Order)) -> Result<Order> {
    let (id, items_json, mut order) = raw;
    order.id = parse_uuid(&id)?;
    order.items = serde_json::from_str(&items_json)?;
    Ok(order)
}

fn row_to_udhar(row: &Row<'_>) -> rusqlite::Result<(String, UdharEntry)> {
    let id: String = row.get(0)?;
    let entry_type: String = row.get(3)?;
    let is_settled: i64 = row.get(6)?;
    let entry = UdharEntry {
        id: Uuid::nil(),
        party_name: row.get(1)?,
        amount: row.get(2)?,
        entry_type: entry_type_from_str(&entry_type),
        description: row.get(4)?,
        created_at: timestamp_to_datetime(row.get(5)?),
        is_settled: is_settled != 0,
    };
    Ok((id, entry))
}

fn finish_udhar(raw: (String, UdharEntry)) -> Result<UdharEntry> {
    let (id, mut entry) = raw;
    entry.id = parse_uuid(&id)?;
    Ok(entry)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn inventory(&self) -> Result<Vec<InventoryItem>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM inventory ORDER BY product_name",
                    ITEM_COLUMNS
                ))
                .map_err(|e| MunimError::Store(e.to_string()))?;
            let rows = stmt
                .query_map([], row_to_item)
                .map_err(|e| MunimError::Store(e.to_string()))?;

            let mut items = Vec::new();
            for row in rows {
                let raw = row.map_err(|e| MunimError::Store(e.to_string()))?;
                items.push(finish_item(raw)?);
            }
            Ok(items)
        })
    }

    async fn find_product(&self, query: &str) -> Result<Option<InventoryItem>> {
        self.db.with_conn(|conn| {
            let pattern = format!("%{}%", query.to_lowercase());
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM inventory WHERE LOWER(product_name) LIKE ?1 LIMIT 1",
                        ITEM_COLUMNS
                    ),
                    rusqlite::params![pattern],
                    row_to_item,
                )
                .optional()
                .map_err(|e| MunimError::Store(e.to_string()))?;
            raw.map(finish_item).transpose()
        })
    }

    async fn insert_item(&self, item: InventoryItem) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO inventory (id, product_name, category, quantity, unit, buy_price, sell_price, reorder_point, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    item.id.to_string(),
                    item.product_name,
                    item.category,
                    item.quantity,
                    item.unit,
                    item.buy_price,
                    item.sell_price,
                    item.reorder_point,
                    item.last_updated.timestamp(),
                ],
            )
            .map_err(|e| MunimError::Store(format!("Failed to insert item: {}", e)))?;
            Ok(())
        })
    }

    async fn update_quantity(&self, id: Uuid, quantity: f64) -> Result<()> {
        self.db.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE inventory SET quantity = ?1, last_updated = ?2 WHERE id = ?3",
                    rusqlite::params![quantity, Utc::now().timestamp(), id.to_string()],
                )
                .map_err(|e| MunimError::Store(format!("Failed to update quantity: {}", e)))?;
            if changed == 0 {
                return Err(MunimError::Store(format!("No inventory item with id {}", id)));
            }
            Ok(())
        })
    }

    async fn recent_orders(&self, days: u32) -> Result<Vec<Order>> {
        let cutoff = (Utc::now() - Duration::days(days as i64)).timestamp();
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM orders WHERE created_at > ?1 ORDER BY created_at DESC",
                    ORDER_COLUMNS
                ))
                .map_err(|e| MunimError::Store(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params![cutoff], row_to_order)
                .map_err(|e| MunimError::Store(e.to_string()))?;

            let mut orders = Vec::new();
            for row in rows {
                let raw = row.map_err(|e| MunimError::Store(e.to_string()))?;
                orders.push(finish_order(raw)?);
            }
            Ok(orders)
        })
    }

    async fn place_order(&self, order: Order) -> Result<Uuid> {
        let items_json = serde_json::to_string(&order.items)?;
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| MunimError::Store(format!("Failed to begin transaction: {}", e)))?;

            // Validate every line against current stock inside the transaction.
            for line in &order.items {
                let stock: Option<f64> = tx
                    .query_row(
                        "SELECT quantity FROM inventory WHERE id = ?1",
                        rusqlite::params![line.product_id.to_string()],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(|e| MunimError::Store(e.to_string()))?;
                if stock.unwrap_or(0.0) < line.quantity {
                    return Err(MunimError::Store(format!(
                        "Insufficient stock for {}",
                        line.product_name
                    )));
                }
            }

            tx.execute(
                "INSERT INTO orders (id, order_number, customer_name, items, subtotal, total, profit, payment_method, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    order.id.to_string(),
                    order.order_number,
                    order.customer_name,
                    items_json,
                    order.subtotal,
                    order.total,
                    order.profit,
                    order.payment_method,
                    status_to_str(order.status),
                    order.created_at.timestamp(),
                ],
            )
            .map_err(|e| MunimError::Store(format!("Failed to insert order: {}", e)))?;

            let now = Utc::now().timestamp();
            for line in &order.items {
                tx.execute(
                    "UPDATE inventory SET quantity = quantity - ?1, last_updated = ?2 WHERE id = ?3",
                    rusqlite::params![line.quantity, now, line.product_id.to_string()],
                )
                .map_err(|e| MunimError::Store(format!("Failed to decrement stock: {}", e)))?;
            }

            tx.commit()
                .map_err(|e| MunimError::Store(format!("Failed to commit order: {}", e)))?;
            tracing::info!(order_id = %order.id, "Order placed");
            Ok(order.id)
        })
    }

    async fn udhar_entries(&self, party: Option<&str>) -> Result<Vec<UdharEntry>> {
        self.db.with_conn(|conn| {
            let (sql, params): (String, Vec<String>) = match party {
                Some(p) => (
                    "SELECT id, party_name, amount, entry_type, description, created_at, is_settled
                     FROM udhar_khata WHERE party_name = ?1 ORDER BY created_at"
                        .to_string(),
                    vec![p.to_string()],
                ),
                None => (
                    "SELECT id, party_name, amount, entry_type, description, created_at, is_settled
                     FROM udhar_khata ORDER BY created_at"
                        .to_string(),
                    vec![],
                ),
            };
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| MunimError::Store(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params.iter()), row_to_udhar)
                .map_err(|e| MunimError::Store(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                let raw = row.map_err(|e| MunimError::Store(e.to_string()))?;
                entries.push(finish_udhar(raw)?);
            }
            Ok(entries)
        })
    }

    async fn add_udhar_entry(&self, entry: UdharEntry) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO udhar_khata (id, party_name, amount, entry_type, description, created_at, is_settled)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.party_name,
                    entry.amount,
                    entry_type_to_str(entry.entry_type),
                    entry.description,
                    entry.created_at.timestamp(),
                    entry.is_settled as i32,
                ],
            )
            .map_err(|e| MunimError::Store(format!("Failed to insert udhar entry: {}", e)))?;
            Ok(())
        })
    }

    async fn outstanding_udhar(&self) -> Result<Vec<PartyBalance>> {
        let entries = self.udhar_entries(None).await?;
        Ok(fold_outstanding(&entries))
    }

    async fn clear_all(&self) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute_batch("DELETE FROM inventory; DELETE FROM orders; DELETE FROM udhar_khata;")
                .map_err(|e| MunimError::Store(format!("Failed to clear data: {}", e)))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munim_core::types::OrderItem;

    fn item(name: &str, qty: f64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            product_name: name.to_string(),
            category: "Groceries".to_string(),
            quantity: qty,
            unit: "kg".to_string(),
            buy_price: 30.0,
            sell_price: 40.0,
            reorder_point: Some(10.0),
            last_updated: Utc::now(),
        }
    }

    fn order_for(product: &InventoryItem, qty: f64) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-1693".to_string(),
            customer_name: "Walk-in".to_string(),
            items: vec![OrderItem {
                product_id: product.id,
                product_name: product.product_name.clone(),
                quantity: qty,
                unit_price: product.sell_price,
            }],
            subtotal: qty * product.sell_price,
            total: qty * product.sell_price,
            profit: qty * 10.0,
            payment_method: "upi".to_string(),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_product() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_item(item("Basmati Rice", 5.0)).await.unwrap();

        let found = store.find_product("basmati").await.unwrap().unwrap();
        assert_eq!(found.product_name, "Basmati Rice");
        assert_eq!(found.quantity, 5.0);
        assert_eq!(found.reorder_point, Some(10.0));
        assert!(store.find_product("chai").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let store = SqliteStore::in_memory().unwrap();
        let atta = item("Atta", 40.0);
        store.insert_item(atta.clone()).await.unwrap();

        store.update_quantity(atta.id, 35.0).await.unwrap();
        let found = store.find_product("atta").await.unwrap().unwrap();
        assert_eq!(found.quantity, 35.0);

        let missing = store.update_quantity(Uuid::new_v4(), 1.0).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_place_order_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let atta = item("Atta", 40.0);
        store.insert_item(atta.clone()).await.unwrap();

        let order = order_for(&atta, 10.0);
        let id = store.place_order(order.clone()).await.unwrap();
        assert_eq!(id, order.id);

        let left = store.find_product("atta").await.unwrap().unwrap();
        assert_eq!(left.quantity, 30.0);

        let orders = store.recent_orders(7).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
        assert_eq!(orders[0].items[0].product_name, "Atta");
        assert_eq!(orders[0].status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_place_order_atomicity_on_insufficient_stock() {
        let store = SqliteStore::in_memory().unwrap();
        let atta = item("Atta", 40.0);
        let rice = item("Rice", 2.0);
        store.insert_item(atta.clone()).await.unwrap();
        store.insert_item(rice.clone()).await.unwrap();

        let mut order = order_for(&atta, 10.0);
        order.items.push(OrderItem {
            product_id: rice.id,
            product_name: rice.product_name.clone(),
            quantity: 5.0,
            unit_price: rice.sell_price,
        });

        let result = store.place_order(order).await;
        assert!(matches!(result, Err(MunimError::Store(_))));

        // No order row, no quantity change.
        assert!(store.recent_orders(7).await.unwrap().is_empty());
        assert_eq!(store.find_product("atta").await.unwrap().unwrap().quantity, 40.0);
        assert_eq!(store.find_product("rice").await.unwrap().unwrap().quantity, 2.0);
    }

    #[tokio::test]
    async fn test_udhar_roundtrip_and_outstanding() {
        let store = SqliteStore::in_memory().unwrap();
        let mk = |party: &str, amount: f64, entry_type| UdharEntry {
            id: Uuid::new_v4(),
            party_name: party.to_string(),
            amount,
            entry_type,
            description: Some("kirana".to_string()),
            created_at: Utc::now(),
            is_settled: false,
        };
        store
            .add_udhar_entry(mk("Sharma", 500.0, UdharEntryType::Credit))
            .await
            .unwrap();
        store
            .add_udhar_entry(mk("Sharma", 150.0, UdharEntryType::Payment))
            .await
            .unwrap();

        let entries = store.udhar_entries(Some("Sharma")).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description.as_deref(), Some("kirana"));

        let outstanding = store.outstanding_udhar().await.unwrap();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].amount, 350.0);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_item(item("Atta", 40.0)).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.inventory().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("munim.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_item(item("Atta", 40.0)).await.unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.inventory().await.unwrap().len(), 1);
    }
}
