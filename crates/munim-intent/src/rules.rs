//! Ordered keyword rules for intent detection.
//!
//! Rules are checked in declaration order and the first match wins, so the
//! ordering is part of the contract: "stock scan karo" must resolve to a
//! parchi scan, not an inventory check.

use munim_core::types::{Entities, Intent, IntentResult, UiTrigger};

use crate::entities::extract_entities;

/// A single keyword rule mapping trigger substrings to an intent.
struct IntentRule {
    triggers: &'static [&'static str],
    intent: Intent,
    confidence: f32,
    trigger: Option<UiTrigger>,
}

/// All rules, highest priority first.
const RULES: &[IntentRule] = &[
    // Scan outranks everything: "stock scan karo" is a scan request.
    IntentRule {
        triggers: &["scan", "parchi", "photo", "bill"],
        intent: Intent::ParchiScan,
        confidence: 0.95,
        trigger: Some(UiTrigger::ScanParchi),
    },
    IntentRule {
        triggers: &["stock", "maal", "item", "inventory"],
        intent: Intent::InventoryCheck,
        confidence: 0.9,
        trigger: Some(UiTrigger::InventoryCard),
    },
    IntentRule {
        triggers: &["order", "buy", "kharid", "mangao"],
        intent: Intent::PlaceOrder,
        confidence: 0.85,
        trigger: Some(UiTrigger::OrderSuccess),
    },
    IntentRule {
        triggers: &["ship", "delivery", "bhejna", "courier"],
        intent: Intent::ShippingQuery,
        confidence: 0.8,
        trigger: Some(UiTrigger::ShippingOptions),
    },
    IntentRule {
        triggers: &["profit", "faida", "kamayi", "analysis"],
        intent: Intent::ProfitAnalysis,
        confidence: 0.85,
        trigger: Some(UiTrigger::ProfitChart),
    },
    IntentRule {
        triggers: &["udhar", "khata", "hisab"],
        intent: Intent::UdharKhata,
        confidence: 0.9,
        trigger: Some(UiTrigger::UdharKhata),
    },
    IntentRule {
        triggers: &["kam", "low", "khatam"],
        intent: Intent::LowStockAlert,
        confidence: 0.8,
        trigger: Some(UiTrigger::LowStockAlert),
    },
];

/// Detect the intent of an utterance.
///
/// Lowercases the input and scans the rule table in priority order; the
/// first rule with any trigger substring present wins. No match yields
/// `Intent::Unknown` at confidence 0.5 with no UI trigger. Entities are
/// extracted independently of which rule fired.
pub fn detect_intent(text: &str) -> IntentResult {
    let lower = text.to_lowercase();

    for rule in RULES {
        if rule.triggers.iter().any(|t| lower.contains(t)) {
            let result = IntentResult {
                intent: rule.intent,
                entities: extract_entities(text),
                confidence: rule.confidence,
                trigger: rule.trigger,
            };
            tracing::debug!(intent = %result.intent, confidence = result.confidence, "Intent detected");
            return result;
        }
    }

    IntentResult {
        intent: Intent::Unknown,
        entities: Entities::default(),
        confidence: 0.5,
        trigger: None,
    }
}
