use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Intents and triggers
// =============================================================================

/// A recognized business intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Stock level lookup for one product or the whole shop.
    InventoryCheck,
    /// Purchase order request.
    PlaceOrder,
    /// Courier comparison / dispatch question.
    ShippingQuery,
    /// Scan a handwritten bill (parchi) image.
    ParchiScan,
    /// Revenue / profit breakdown over recent days.
    ProfitAnalysis,
    /// Credit ledger (udhar khata) lookup.
    UdharKhata,
    /// Items at or below their reorder point.
    LowStockAlert,
    /// No trigger keyword matched; handled by the language model.
    #[default]
    Unknown,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::InventoryCheck => "inventory_check",
            Intent::PlaceOrder => "place_order",
            Intent::ShippingQuery => "shipping_query",
            Intent::ParchiScan => "parchi_scan",
            Intent::ProfitAnalysis => "profit_analysis",
            Intent::UdharKhata => "udhar_khata",
            Intent::LowStockAlert => "low_stock_alert",
            Intent::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "inventory_check" => Ok(Intent::InventoryCheck),
            "place_order" => Ok(Intent::PlaceOrder),
            "shipping_query" => Ok(Intent::ShippingQuery),
            "parchi_scan" => Ok(Intent::ParchiScan),
            "profit_analysis" => Ok(Intent::ProfitAnalysis),
            "udhar_khata" => Ok(Intent::UdharKhata),
            "low_stock_alert" => Ok(Intent::LowStockAlert),
            "unknown" => Ok(Intent::Unknown),
            _ => Err(format!("Unknown intent: {}", s)),
        }
    }
}

/// Opaque UI trigger token carried alongside assistant replies.
///
/// The tokens are forwarded verbatim to the presentation layer and must
/// never be spoken aloud or shown as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiTrigger {
    InventoryCard,
    ProfitChart,
    ShippingOptions,
    OrderSuccess,
    LowStockAlert,
    ScanParchi,
    UdharKhata,
}

impl UiTrigger {
    /// The wire form embedded in reply text, e.g. `[[SHOW_INVENTORY_CARD]]`.
    pub fn as_token(&self) -> &'static str {
        match self {
            UiTrigger::InventoryCard => "[[SHOW_INVENTORY_CARD]]",
            UiTrigger::ProfitChart => "[[SHOW_PROFIT_CHART]]",
            UiTrigger::ShippingOptions => "[[SHOW_SHIPPING_OPTIONS]]",
            UiTrigger::OrderSuccess => "[[SHOW_ORDER_SUCCESS]]",
            UiTrigger::LowStockAlert => "[[SHOW_LOW_STOCK_ALERT]]",
            UiTrigger::ScanParchi => "[[SCAN_PARCHI]]",
            UiTrigger::UdharKhata => "[[SHOW_UDHAR_KHATA]]",
        }
    }
}

/// Entities extracted from an utterance, independent of the intent.
///
/// All fields are optional; an absent quantity is `None`, never zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub product: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub party: Option<String>,
    pub date: Option<String>,
}

/// Result of intent detection over a single utterance.
///
/// Created fresh per input and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub entities: Entities,
    /// Detection confidence in [0.0, 1.0].
    pub confidence: f32,
    pub trigger: Option<UiTrigger>,
}

// =============================================================================
// Conversation
// =============================================================================

/// Role of a conversation message author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire name used by chat-completion endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single message in the append-only conversation history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Interface language for greetings and speech locales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Hindi,
    #[default]
    Hinglish,
    Tamil,
    Telugu,
    Bengali,
    Marathi,
    Gujarati,
}

impl Language {
    /// BCP-47 locale tag used for speech capture and synthesis.
    pub fn locale_code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi | Language::Hinglish => "hi-IN",
            Language::Tamil => "ta-IN",
            Language::Telugu => "te-IN",
            Language::Bengali => "bn-IN",
            Language::Marathi => "mr-IN",
            Language::Gujarati => "gu-IN",
        }
    }

    /// Greeting used to (re)open a conversation in this language.
    pub fn greeting(&self) -> &'static str {
        match self {
            Language::English => {
                "Hello! I'm your business assistant. Ask me about stock, orders, udhar or profit."
            }
            Language::Hindi => {
                "नमस्ते! मैं आपका बिज़नेस असिस्टेंट हूँ। स्टॉक, ऑर्डर, उधार या मुनाफ़े के बारे में पूछिए।"
            }
            Language::Hinglish => {
                "Namaste! Main aapka business assistant hoon. Stock, order, udhar ya profit ke baare mein poochhiye."
            }
            Language::Tamil => "வணக்கம்! நான் உங்கள் வணிக உதவியாளர்.",
            Language::Telugu => "నమస్తే! నేను మీ వ్యాపార సహాయకుడిని.",
            Language::Bengali => "নমস্কার! আমি আপনার ব্যবসার সহকারী।",
            Language::Marathi => "नमस्कार! मी तुमचा व्यवसाय सहाय्यक आहे.",
            Language::Gujarati => "નમસ્તે! હું તમારો બિઝનેસ સહાયક છું.",
        }
    }
}

// =============================================================================
// Parchi (handwritten bill) extraction
// =============================================================================

/// A single line item parsed from a parchi.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParchiItem {
    pub product: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub price: Option<f64>,
}

/// Structured result of a parchi scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParchiData {
    /// Raw extracted text the items were parsed from.
    pub raw_text: String,
    pub items: Vec<ParchiItem>,
    pub total_amount: Option<f64>,
    /// Extraction confidence in [0.0, 1.0].
    pub confidence: f32,
}

// =============================================================================
// Records (shared across store and dialogue)
// =============================================================================

/// One product row in the shop inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_name: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub buy_price: f64,
    pub sell_price: f64,
    /// Quantity at or below which the item counts as low stock.
    pub reorder_point: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// Whether current stock is at or below the reorder point.
    pub fn is_low(&self, default_reorder_point: f64) -> bool {
        self.quantity <= self.reorder_point.unwrap_or(default_reorder_point)
    }
}

/// Current lifecycle state of an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

/// One line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// A completed (or pending) sales order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub total: f64,
    pub profit: f64,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Direction of a credit-ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UdharEntryType {
    /// Goods given on credit; the party owes the shop.
    Credit,
    /// Payment received against earlier credit.
    Payment,
}

/// One entry in the udhar khata (credit ledger).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UdharEntry {
    pub id: Uuid,
    pub party_name: String,
    pub amount: f64,
    pub entry_type: UdharEntryType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_settled: bool,
}
