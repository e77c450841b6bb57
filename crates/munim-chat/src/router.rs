//! Intent dispatch over the record store.
//!
//! Each handler produces a speakable Hinglish reply with the intent's UI
//! trigger token appended. Store failures never escape a handler; they
//! become an apologetic reply so the voice loop keeps going.

use std::sync::Arc;

use tracing::{error, info};

use munim_core::config::StoreConfig;
use munim_core::types::{Intent, IntentResult, UiTrigger};
use munim_store::{inventory_stats, profit_analysis, RecordStore};

/// Side effect the shell must perform after speaking the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Open the camera and run the parchi scan pipeline.
    ScanParchi,
}

/// Routed reply for one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub action: Option<PendingAction>,
    /// The router had no handler; the session should ask the model.
    pub deferred: bool,
}

impl Reply {
    fn spoken(text: String) -> Self {
        Self {
            text,
            action: None,
            deferred: false,
        }
    }

    fn with_action(text: String, action: PendingAction) -> Self {
        Self {
            text,
            action: Some(action),
            deferred: false,
        }
    }

    pub fn deferred() -> Self {
        Self {
            text: String::new(),
            action: None,
            deferred: true,
        }
    }
}

/// Fixed courier options for the shipping recommendation.
struct CourierOption {
    name: &'static str,
    price: f64,
    days: u32,
}

const COURIERS: [CourierOption; 3] = [
    CourierOption {
        name: "BlueDart",
        price: 180.0,
        days: 2,
    },
    CourierOption {
        name: "Delhivery",
        price: 128.0,
        days: 3,
    },
    CourierOption {
        name: "DTDC",
        price: 95.0,
        days: 5,
    },
];

/// Weight applied to delivery days when scoring couriers against price.
const DAY_WEIGHT: f64 = 20.0;

pub struct DialogueRouter {
    store: Arc<dyn RecordStore>,
    config: StoreConfig,
}

impl DialogueRouter {
    pub fn new(store: Arc<dyn RecordStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Route one detected intent to its handler.
    ///
    /// Never returns an error; an `Unknown` intent comes back as a
    /// deferred reply for the model path.
    pub async fn handle(&self, result: &IntentResult) -> Reply {
        let reply = match result.intent {
            Intent::InventoryCheck => self.handle_inventory(result).await,
            Intent::PlaceOrder => self.handle_place_order(result),
            Intent::ProfitAnalysis => self.handle_profit().await,
            Intent::UdharKhata => self.handle_udhar().await,
            Intent::ShippingQuery => self.handle_shipping(),
            Intent::LowStockAlert => self.handle_low_stock().await,
            Intent::ParchiScan => Reply::with_action(
                "Theek hai, camera khol raha hoon. Parchi ko saamne rakhiye.".to_string(),
                PendingAction::ScanParchi,
            ),
            Intent::Unknown => return Reply::deferred(),
        };

        self.append_trigger(reply, result.trigger)
    }

    fn append_trigger(&self, mut reply: Reply, trigger: Option<UiTrigger>) -> Reply {
        if let Some(trigger) = trigger {
            reply.text.push(' ');
            reply.text.push_str(trigger.as_token());
        }
        reply
    }

    fn store_apology() -> Reply {
        Reply::spoken(
            "Maaf kijiye, records kholne mein dikkat aa rahi hai. Thodi der baad try kariye."
                .to_string(),
        )
    }

    async fn handle_inventory(&self, result: &IntentResult) -> Reply {
        if let Some(product) = &result.entities.product {
            return match self.store.find_product(product).await {
                Ok(Some(item)) => {
                    let mut text = format!(
                        "{} ka stock {} {} hai.",
                        item.product_name, item.quantity, item.unit
                    );
                    if item.is_low(self.config.reorder_point) {
                        text.push_str(" Stock kam hai, jaldi order kar lijiye.");
                    }
                    Reply::spoken(text)
                }
                Ok(None) => Reply::spoken(format!(
                    "Maaf kijiye, '{}' stock mein nahi mila.",
                    product
                )),
                Err(e) => {
                    error!(error = %e, "Inventory lookup failed");
                    Self::store_apology()
                }
            };
        }

        match self.store.inventory().await {
            Ok(items) => {
                let stats = inventory_stats(&items, self.config.reorder_point);
                let mut text = format!(
                    "Aapke paas {} items hain, kul value ₹{:.0}.",
                    stats.total_items, stats.total_value
                );
                if stats.low_stock_count > 0 {
                    text.push_str(&format!(
                        " {} items ka stock kam hai.",
                        stats.low_stock_count
                    ));
                }
                Reply::spoken(text)
            }
            Err(e) => {
                error!(error = %e, "Inventory load failed");
                Self::store_apology()
            }
        }
    }

    fn handle_place_order(&self, result: &IntentResult) -> Reply {
        let what = match (&result.entities.product, result.entities.quantity) {
            (Some(product), Some(qty)) => format!(
                "{} {} {}",
                qty,
                result.entities.unit.as_deref().unwrap_or(""),
                product
            )
            .trim()
            .replace("  ", " "),
            (Some(product), None) => product.clone(),
            _ => "yeh order".to_string(),
        };
        Reply::spoken(format!(
            "{} ka order ready hai. Payment kaise karenge, cash ya udhar?",
            what
        ))
    }

    async fn handle_profit(&self) -> Reply {
        match self.store.recent_orders(self.config.profit_window_days).await {
            Ok(orders) => {
                if orders.is_empty() {
                    return Reply::spoken(format!(
                        "Pichle {} din mein koi order nahi hua.",
                        self.config.profit_window_days
                    ));
                }
                let report = profit_analysis(&orders);
                Reply::spoken(format!(
                    "Pichle {} din mein ₹{:.0} ki bikri hui, profit ₹{:.0} raha. Margin {:.1} percent hai.",
                    self.config.profit_window_days,
                    report.total_revenue,
                    report.total_profit,
                    report.average_margin
                ))
            }
            Err(e) => {
                error!(error = %e, "Order history load failed");
                Self::store_apology()
            }
        }
    }

    async fn handle_udhar(&self) -> Reply {
        match self.store.outstanding_udhar().await {
            Ok(balances) => {
                if balances.is_empty() {
                    return Reply::spoken("Koi udhar baaki nahi hai. Sab hisab saaf hai.".to_string());
                }
                let total: f64 = balances.iter().map(|b| b.amount).sum();
                Reply::spoken(format!(
                    "Kul ₹{:.0} udhar baaki hai, {} logon pe.",
                    total,
                    balances.len()
                ))
            }
            Err(e) => {
                error!(error = %e, "Udhar khata load failed");
                Self::store_apology()
            }
        }
    }

    fn handle_shipping(&self) -> Reply {
        let best = COURIERS
            .iter()
            .min_by(|a, b| {
                let score_a = a.price + a.days as f64 * DAY_WEIGHT;
                let score_b = b.price + b.days as f64 * DAY_WEIGHT;
                score_a.total_cmp(&score_b)
            })
            .expect("courier table is non-empty");

        info!(courier = best.name, "Shipping recommendation");
        Reply::spoken(format!(
            "{} sabse accha rahega: ₹{:.0} mein {} din mein deliver ho jayega.",
            best.name, best.price, best.days
        ))
    }

    async fn handle_low_stock(&self) -> Reply {
        match self.store.inventory().await {
            Ok(items) => {
                let low: Vec<_> = items
                    .iter()
                    .filter(|i| i.is_low(self.config.reorder_point))
                    .collect();
                if low.is_empty() {
                    return Reply::spoken("Sab items ka stock theek hai.".to_string());
                }
                let names: Vec<&str> = low
                    .iter()
                    .take(3)
                    .map(|i| i.product_name.as_str())
                    .collect();
                Reply::spoken(format!(
                    "{} items ka stock kam hai, jaise {}. Jaldi order kar lijiye.",
                    low.len(),
                    names.join(", ")
                ))
            }
            Err(e) => {
                error!(error = %e, "Inventory load failed");
                Self::store_apology()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use munim_intent::detect_intent;
    use munim_store::{seed_demo_data, MemoryStore};

    async fn router() -> DialogueRouter {
        let store = Arc::new(MemoryStore::new());
        seed_demo_data(store.as_ref()).await.unwrap();
        DialogueRouter::new(store, StoreConfig::default())
    }

    #[tokio::test]
    async fn test_inventory_lookup_by_product() {
        let r = router().await;
        let reply = r.handle(&detect_intent("kitna atta stock mein hai")).await;

        assert!(!reply.deferred);
        assert!(reply.text.contains("Atta"), "got: {}", reply.text);
        assert!(reply.text.contains("[[SHOW_INVENTORY_CARD]]"));
    }

    #[tokio::test]
    async fn test_inventory_low_stock_warning() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_item(munim_core::types::InventoryItem {
                id: uuid::Uuid::new_v4(),
                product_name: "Atta".to_string(),
                category: "Groceries".to_string(),
                quantity: 5.0,
                unit: "kg".to_string(),
                buy_price: 32.0,
                sell_price: 40.0,
                reorder_point: None,
                last_updated: chrono::Utc::now(),
            })
            .await
            .unwrap();
        let r = DialogueRouter::new(store, StoreConfig::default());

        let reply = r.handle(&detect_intent("Stock check karo atta")).await;

        assert!(reply.text.contains("5 kg"), "got: {}", reply.text);
        assert!(reply.text.contains("Stock kam hai"));
    }

    #[tokio::test]
    async fn test_inventory_aggregate_without_product() {
        let r = router().await;
        let reply = r.handle(&detect_intent("poora stock dikhao")).await;

        assert!(reply.text.contains("items hain"));
        assert!(reply.text.contains("[[SHOW_INVENTORY_CARD]]"));
    }

    #[tokio::test]
    async fn test_inventory_unknown_product() {
        let r = router().await;
        let mut result = detect_intent("stock check karo");
        result.entities.product = Some("heera".to_string());
        let reply = r.handle(&result).await;

        assert!(reply.text.contains("nahi mila"));
    }

    #[tokio::test]
    async fn test_place_order_asks_for_payment() {
        let r = router().await;
        let reply = r.handle(&detect_intent("5 kg atta order karo")).await;

        assert!(reply.text.contains("cash ya udhar"));
        assert!(reply.action.is_none());
    }

    #[tokio::test]
    async fn test_profit_with_no_orders() {
        let r = router().await;
        let reply = r.handle(&detect_intent("aaj ka profit batao")).await;

        assert!(reply.text.contains("koi order nahi"));
        assert!(reply.text.contains("[[SHOW_PROFIT_CHART]]"));
    }

    #[tokio::test]
    async fn test_udhar_with_clean_ledger() {
        let r = router().await;
        let reply = r.handle(&detect_intent("udhar khata dikhao")).await;

        assert!(reply.text.contains("Koi udhar baaki nahi"));
        assert!(reply.text.contains("[[SHOW_UDHAR_KHATA]]"));
    }

    #[tokio::test]
    async fn test_shipping_recommends_best_score() {
        let r = router().await;
        let reply = r.handle(&detect_intent("delivery ka kya rate hai")).await;

        // Delhivery: 128 + 3*20 = 188 beats BlueDart 220 and DTDC 195.
        assert!(reply.text.contains("Delhivery"), "got: {}", reply.text);
        assert!(reply.text.contains("[[SHOW_SHIPPING_OPTIONS]]"));
    }

    #[tokio::test]
    async fn test_parchi_scan_returns_action() {
        let r = router().await;
        let reply = r.handle(&detect_intent("parchi scan karo")).await;

        assert_eq!(reply.action, Some(PendingAction::ScanParchi));
        assert!(reply.text.contains("[[SCAN_PARCHI]]"));
    }

    #[tokio::test]
    async fn test_unknown_intent_defers_to_model() {
        let r = router().await;
        let reply = r.handle(&detect_intent("namaste kaise ho")).await;

        assert!(reply.deferred);
        assert!(reply.text.is_empty());
    }

    #[test]
    fn test_apology_reply_is_speakable() {
        let reply = DialogueRouter::store_apology();
        assert!(reply.text.contains("Maaf kijiye"));
        assert!(!reply.deferred);
        assert!(reply.action.is_none());
    }
}
