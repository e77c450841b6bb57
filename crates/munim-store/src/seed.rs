//! Demo inventory seed for first launch.

use chrono::Utc;
use uuid::Uuid;

use munim_core::error::Result;
use munim_core::types::InventoryItem;

use crate::RecordStore;

/// Grocery and stationery rows for a typical kirana counter.
///
/// (name, category, quantity, unit, buy price, sell price)
const DEMO_ITEMS: &[(&str, &str, f64, &str, f64, f64)] = &[
    ("Tata Salt", "Groceries", 50.0, "kg", 18.0, 22.0),
    ("Maggi Noodles", "Groceries", 120.0, "pcs", 12.0, 15.0),
    ("Basmati Rice", "Groceries", 5.0, "kg", 80.0, 100.0),
    ("Cooking Oil", "Groceries", 8.0, "ltr", 120.0, 145.0),
    ("Sugar", "Groceries", 25.0, "kg", 38.0, 45.0),
    ("Wheat Flour (Atta)", "Groceries", 40.0, "kg", 32.0, 40.0),
    ("Pulses (Toor Dal)", "Groceries", 15.0, "kg", 95.0, 115.0),
    ("Tea Powder", "Beverages", 12.0, "kg", 280.0, 320.0),
    ("Coffee", "Beverages", 8.0, "kg", 450.0, 520.0),
    ("Milk Powder", "Dairy", 20.0, "kg", 380.0, 425.0),
    ("Blue Pen", "Stationery", 145.0, "pcs", 5.0, 10.0),
    ("Red Pen", "Stationery", 8.0, "pcs", 5.0, 10.0),
    ("Notebook A4", "Stationery", 0.0, "pcs", 30.0, 60.0),
    ("Pencil Box", "Stationery", 25.0, "pcs", 40.0, 80.0),
    ("Eraser", "Stationery", 200.0, "pcs", 2.0, 5.0),
    ("Sharpener", "Stationery", 150.0, "pcs", 3.0, 6.0),
    ("Ruler", "Stationery", 60.0, "pcs", 8.0, 15.0),
    ("Glue Stick", "Stationery", 45.0, "pcs", 15.0, 25.0),
    ("Scissors", "Stationery", 30.0, "pcs", 25.0, 45.0),
    ("Stapler", "Stationery", 18.0, "pcs", 45.0, 75.0),
];

/// Seed demo inventory if the store is empty. Returns the number of rows added.
pub async fn seed_demo_data(store: &dyn RecordStore) -> Result<usize> {
    if !store.inventory().await?.is_empty() {
        return Ok(0);
    }

    for (name, category, quantity, unit, buy, sell) in DEMO_ITEMS {
        store
            .insert_item(InventoryItem {
                id: Uuid::new_v4(),
                product_name: name.to_string(),
                category: category.to_string(),
                quantity: *quantity,
                unit: unit.to_string(),
                buy_price: *buy,
                sell_price: *sell,
                reorder_point: None,
                last_updated: Utc::now(),
            })
            .await?;
    }

    tracing::info!(count = DEMO_ITEMS.len(), "Seeded demo inventory");
    Ok(DEMO_ITEMS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn test_seed_fills_empty_store() {
        let store = MemoryStore::new();
        let added = seed_demo_data(&store).await.unwrap();
        assert_eq!(added, 20);

        // Voice lookups for "atta" must hit the flour row.
        let atta = store.find_product("atta").await.unwrap();
        assert_eq!(atta.unwrap().product_name, "Wheat Flour (Atta)");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        seed_demo_data(&store).await.unwrap();
        let second = seed_demo_data(&store).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.inventory().await.unwrap().len(), 20);
    }
}
