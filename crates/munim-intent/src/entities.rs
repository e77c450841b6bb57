//! Entity extraction from utterance text.
//!
//! Extraction is independent of the detected intent: the same quantity,
//! product, and party markers are looked for in every utterance.

use std::sync::LazyLock;

use regex::Regex;

use munim_core::types::Entities;

/// Products recognized by name, in lookup priority order.
///
/// First list entry found in the text wins, so Hindi and English aliases
/// of the same product sit next to each other.
const KNOWN_PRODUCTS: &[&str] = &[
    "atta", "milk", "doodh", "oil", "shakkar", "chini", "sugar", "rice", "chawal",
];

/// Number with an optional measurement unit, e.g. "10 kg" or bare "250".
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(kg|kilo|gram|gm|packet|bori|drum|ltr|liter)?\b")
        .expect("Invalid quantity regex")
});

/// Word following a postposition marker (pe/ka/ki/ko), taken as a party name.
static PARTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:pe|ka|ki|ko)\s+([\p{Latin}\p{Devanagari}]+)").expect("Invalid party regex")
});

/// Extract product, quantity/unit, and party entities from an utterance.
///
/// Absent values stay `None`; a missing quantity is never reported as zero.
pub fn extract_entities(text: &str) -> Entities {
    let lower = text.to_lowercase();
    let mut entities = Entities::default();

    entities.product = KNOWN_PRODUCTS
        .iter()
        .find(|p| lower.contains(*p))
        .map(|p| p.to_string());

    if let Some(caps) = QUANTITY_RE.captures(&lower) {
        entities.quantity = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        entities.unit = caps.get(2).map(|m| m.as_str().to_string());
    }

    if let Some(caps) = PARTY_RE.captures(&lower) {
        entities.party = caps.get(1).map(|m| m.as_str().to_string());
    }

    entities
}
