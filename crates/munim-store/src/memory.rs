//! In-memory record store.
//!
//! Backs tests and the offline fallback path. A single mutex over all
//! three record collections keeps `place_order` trivially atomic.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use munim_core::error::{MunimError, Result};
use munim_core::types::{InventoryItem, Order, UdharEntry};

use crate::{fold_outstanding, PartyBalance, RecordStore};

#[derive(Default)]
struct State {
    items: Vec<InventoryItem>,
    orders: Vec<Order>,
    udhar: Vec<UdharEntry>,
}

/// Record store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| MunimError::Store(format!("Store lock poisoned: {}", e)))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn inventory(&self) -> Result<Vec<InventoryItem>> {
        Ok(self.lock()?.items.clone())
    }

    async fn find_product(&self, query: &str) -> Result<Option<InventoryItem>> {
        let needle = query.to_lowercase();
        Ok(self
            .lock()?
            .items
            .iter()
            .find(|i| i.product_name.to_lowercase().contains(&needle))
            .cloned())
    }

    async fn insert_item(&self, item: InventoryItem) -> Result<()> {
        self.lock()?.items.push(item);
        Ok(())
    }

    async fn update_quantity(&self, id: Uuid, quantity: f64) -> Result<()> {
        let mut state = self.lock()?;
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| MunimError::Store(format!("No inventory item with id {}", id)))?;
        item.quantity = quantity;
        item.last_updated = Utc::now();
        Ok(())
    }

    async fn recent_orders(&self, days: u32) -> Result<Vec<Order>> {
        let cutoff = Utc::now() - Duration::days(days as i64);
        let mut orders: Vec<Order> = self
            .lock()?
            .orders
            .iter()
            .filter(|o| o.created_at > cutoff)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn place_order(&self, order: Order) -> Result<Uuid> {
        let mut state = self.lock()?;

        // Validate every line before touching anything.
        for line in &order.items {
            let stock = state
                .items
                .iter()
                .find(|i| i.id == line.product_id)
                .map(|i| i.quantity)
                .unwrap_or(0.0);
            if stock < line.quantity {
                return Err(MunimError::Store(format!(
                    "Insufficient stock for {}",
                    line.product_name
                )));
            }
        }

        for line in &order.items {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == line.product_id) {
                item.quantity -= line.quantity;
                item.last_updated = Utc::now();
            }
        }

        let id = order.id;
        state.orders.push(order);
        tracing::info!(order_id = %id, "Order placed");
        Ok(id)
    }

    async fn udhar_entries(&self, party: Option<&str>) -> Result<Vec<UdharEntry>> {
        let state = self.lock()?;
        Ok(state
            .udhar
            .iter()
            .filter(|e| party.map_or(true, |p| e.party_name == p))
            .cloned()
            .collect())
    }

    async fn add_udhar_entry(&self, entry: UdharEntry) -> Result<()> {
        self.lock()?.udhar.push(entry);
        Ok(())
    }

    async fn outstanding_udhar(&self) -> Result<Vec<PartyBalance>> {
        Ok(fold_outstanding(&self.lock()?.udhar))
    }

    async fn clear_all(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.items.clear();
        state.orders.clear();
        state.udhar.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munim_core::types::{OrderItem, OrderStatus, UdharEntryType};

    fn item(name: &str, qty: f64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            product_name: name.to_string(),
            category: "Groceries".to_string(),
            quantity: qty,
            unit: "kg".to_string(),
            buy_price: 30.0,
            sell_price: 40.0,
            reorder_point: None,
            last_updated: Utc::now(),
        }
    }

    fn order_for(product: &InventoryItem, qty: f64) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-1".to_string(),
            customer_name: "Walk-in".to_string(),
            items: vec![OrderItem {
                product_id: product.id,
                product_name: product.product_name.clone(),
                quantity: qty,
                unit_price: product.sell_price,
            }],
            subtotal: qty * product.sell_price,
            total: qty * product.sell_price,
            profit: qty * (product.sell_price - product.buy_price),
            payment_method: "cash".to_string(),
            status: OrderStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_product_case_insensitive_substring() {
        let store = MemoryStore::new();
        store.insert_item(item("Wheat Flour", 40.0)).await.unwrap();

        let found = store.find_product("wheat").await.unwrap();
        assert_eq!(found.unwrap().product_name, "Wheat Flour");
        assert!(store.find_product("chai").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_place_order_decrements_stock() {
        let store = MemoryStore::new();
        let atta = item("Atta", 40.0);
        store.insert_item(atta.clone()).await.unwrap();

        store.place_order(order_for(&atta, 10.0)).await.unwrap();

        let left = store.find_product("atta").await.unwrap().unwrap();
        assert_eq!(left.quantity, 30.0);
        assert_eq!(store.recent_orders(7).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_place_order_insufficient_stock_changes_nothing() {
        let store = MemoryStore::new();
        let atta = item("Atta", 40.0);
        let rice = item("Rice", 2.0);
        store.insert_item(atta.clone()).await.unwrap();
        store.insert_item(rice.clone()).await.unwrap();

        // Second line exceeds stock; first line must not be applied either.
        let mut order = order_for(&atta, 10.0);
        order.items.push(OrderItem {
            product_id: rice.id,
            product_name: rice.product_name.clone(),
            quantity: 5.0,
            unit_price: rice.sell_price,
        });

        let result = store.place_order(order).await;
        assert!(matches!(result, Err(MunimError::Store(_))));

        assert_eq!(store.find_product("atta").await.unwrap().unwrap().quantity, 40.0);
        assert_eq!(store.find_product("rice").await.unwrap().unwrap().quantity, 2.0);
        assert!(store.recent_orders(7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_unknown_product_rejected() {
        let store = MemoryStore::new();
        let ghost = item("Ghost", 100.0);
        // Not inserted into the store.
        let result = store.place_order(order_for(&ghost, 1.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_udhar_entries_filter_by_party() {
        let store = MemoryStore::new();
        for (party, amount) in [("Sharma", 500.0), ("Verma", 200.0)] {
            store
                .add_udhar_entry(UdharEntry {
                    id: Uuid::new_v4(),
                    party_name: party.to_string(),
                    amount,
                    entry_type: UdharEntryType::Credit,
                    description: None,
                    created_at: Utc::now(),
                    is_settled: false,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.udhar_entries(None).await.unwrap().len(), 2);
        let sharma = store.udhar_entries(Some("Sharma")).await.unwrap();
        assert_eq!(sharma.len(), 1);
        assert_eq!(sharma[0].amount, 500.0);

        let outstanding = store.outstanding_udhar().await.unwrap();
        assert_eq!(outstanding.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = MemoryStore::new();
        store.insert_item(item("Atta", 40.0)).await.unwrap();
        store.clear_all().await.unwrap();
        assert!(store.inventory().await.unwrap().is_empty());
    }
}
