//! Record store for inventory, orders, and the udhar khata.
//!
//! One contract, two implementations: `MemoryStore` for tests and offline
//! use, `SqliteStore` for persistence. All order placement goes through
//! `place_order`, which is atomic: stock validation, the order insert, and
//! the inventory decrements either all happen or none do.

pub mod analysis;
pub mod db;
pub mod memory;
pub mod seed;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use munim_core::error::Result;
use munim_core::types::{InventoryItem, Order, UdharEntry};

pub use analysis::{inventory_stats, profit_analysis, DailyProfit, InventoryStats, ProfitReport};
pub use db::Database;
pub use memory::MemoryStore;
pub use seed::seed_demo_data;
pub use sqlite::SqliteStore;

/// Net unsettled balance for one party. Positive means the party owes the shop.
#[derive(Clone, Debug, PartialEq)]
pub struct PartyBalance {
    pub party_name: String,
    pub amount: f64,
}

/// Persistence contract for the shop's records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All inventory rows.
    async fn inventory(&self) -> Result<Vec<InventoryItem>>;

    /// First item whose name contains `query`, case-insensitive.
    async fn find_product(&self, query: &str) -> Result<Option<InventoryItem>>;

    /// Insert a new inventory row.
    async fn insert_item(&self, item: InventoryItem) -> Result<()>;

    /// Set the stock level of an item and touch its `last_updated`.
    async fn update_quantity(&self, id: Uuid, quantity: f64) -> Result<()>;

    /// Orders created within the last `days` days, newest first.
    async fn recent_orders(&self, days: u32) -> Result<Vec<Order>>;

    /// Atomically place an order.
    ///
    /// Validates that every line's requested quantity is covered by stock,
    /// then inserts the order and decrements the affected inventory rows.
    /// On any failure no partial state is observable.
    async fn place_order(&self, order: Order) -> Result<Uuid>;

    /// Udhar entries, optionally filtered to one party (exact name match).
    async fn udhar_entries(&self, party: Option<&str>) -> Result<Vec<UdharEntry>>;

    /// Append one udhar entry.
    async fn add_udhar_entry(&self, entry: UdharEntry) -> Result<()>;

    /// Per-party net balance over unsettled entries; positive balances only.
    async fn outstanding_udhar(&self) -> Result<Vec<PartyBalance>>;

    /// Remove every record. Used by the data reset command.
    async fn clear_all(&self) -> Result<()>;
}

/// Fold unsettled entries into per-party net balances.
///
/// Credits add, payments subtract; parties that net to zero or less are
/// dropped. Shared by both store implementations.
pub(crate) fn fold_outstanding(entries: &[UdharEntry]) -> Vec<PartyBalance> {
    use munim_core::types::UdharEntryType;

    let mut balances: Vec<PartyBalance> = Vec::new();
    for entry in entries.iter().filter(|e| !e.is_settled) {
        let signed = match entry.entry_type {
            UdharEntryType::Credit => entry.amount,
            UdharEntryType::Payment => -entry.amount,
        };
        match balances.iter_mut().find(|b| b.party_name == entry.party_name) {
            Some(balance) => balance.amount += signed,
            None => balances.push(PartyBalance {
                party_name: entry.party_name.clone(),
                amount: signed,
            }),
        }
    }
    balances.retain(|b| b.amount > 0.0);
    balances
}
