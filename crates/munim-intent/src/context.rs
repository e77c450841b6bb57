//! Prompt context templates and control-token stripping.

use std::sync::LazyLock;

use regex::Regex;

use munim_core::types::{Intent, IntentResult, UiTrigger};

/// Control-token spans that must never reach speech output or display text.
static CONTROL_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[.*?\]\]|\[SHOW_.*?\]|\[INTENT:.*?\]").expect("Invalid control token regex")
});

/// Build the bracketed context block appended to a language-model prompt.
///
/// Deterministic per intent; `Intent::Unknown` yields an empty string so
/// plain conversation reaches the model unchanged.
pub fn intent_context(result: &IntentResult) -> String {
    let trigger = |fallback: UiTrigger| {
        result
            .trigger
            .map(|t| t.as_token())
            .unwrap_or(fallback.as_token())
    };

    match result.intent {
        Intent::InventoryCheck => format!(
            "\n[CONTEXT: User wants to check stock. Include {} in response if items found.]",
            trigger(UiTrigger::InventoryCard)
        ),
        Intent::PlaceOrder => format!(
            "\n[CONTEXT: User wants to place an order. Confirm details and include {}.]",
            trigger(UiTrigger::OrderSuccess)
        ),
        Intent::ShippingQuery => format!(
            "\n[CONTEXT: User is asking about shipping. Show options using {}.]",
            trigger(UiTrigger::ShippingOptions)
        ),
        Intent::ParchiScan => format!(
            "\n[CONTEXT: User wants to scan a parchi. Inform them that the camera is opening. Trigger: {}]",
            trigger(UiTrigger::ScanParchi)
        ),
        Intent::ProfitAnalysis => format!(
            "\n[CONTEXT: User wants to see profit/sales analysis. Include {}.]",
            trigger(UiTrigger::ProfitChart)
        ),
        Intent::UdharKhata => format!(
            "\n[CONTEXT: User is checking or adding to the credit ledger (Udhar-Khata). Include {}.]",
            trigger(UiTrigger::UdharKhata)
        ),
        Intent::LowStockAlert => format!(
            "\n[CONTEXT: User is worried about low stock. Show alerts via {}.]",
            trigger(UiTrigger::LowStockAlert)
        ),
        Intent::Unknown => String::new(),
    }
}

/// Strip UI trigger and context markers from reply text and trim the result.
///
/// Applied before any text is spoken or displayed.
pub fn strip_control_tokens(text: &str) -> String {
    CONTROL_TOKEN_RE.replace_all(text, "").trim().to_string()
}
