//! Line parser for OCR-extracted parchi text.
//!
//! Recognizes three line shapes, tried in order per line:
//! a total line ("Total 510" / "कुल ₹510"), the hyphenated item form
//! ("आटा - 10 किलो - ₹450"), and the space-separated item form
//! ("चावल 5 किलो 200"). Unmatched lines are dropped silently; the parser
//! itself never errors.

use std::sync::LazyLock;

use regex::Regex;

use munim_core::types::{ParchiData, ParchiItem};

static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:total|कुल).*?(?:₹|rs\.?|रु\.?)?\s*(\d+\.?\d*)")
        .expect("Invalid total regex")
});

/// Product - Quantity Unit - Price.
static HYPHEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.+?)\s*[-–]\s*(\d+\.?\d*)\s*(kg|kilo|किलो|किग्रा|packet|box|pcs)?\s*[-–]?\s*(?:₹|rs\.?|रु\.?)?\s*(\d+\.?\d*)$",
    )
    .expect("Invalid hyphen-form regex")
});

/// Product Quantity Unit Price, space separated.
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(.+?)\s+(\d+\.?\d*)\s*(kg|kilo|किलो|किग्रा|packet|box|pcs)?\s+(?:₹|rs\.?|रु\.?)?\s*(\d+\.?\d*)$",
    )
    .expect("Invalid space-form regex")
});

/// Parse raw extracted text into structured parchi data.
///
/// Missing total falls back to the sum of item prices. Confidence is the
/// fraction of lines that parsed into items (0 when there are no lines).
pub fn parse_parchi_text(raw_text: &str) -> ParchiData {
    let lines: Vec<&str> = raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut items: Vec<ParchiItem> = Vec::new();
    let mut total_amount: Option<f64> = None;

    for line in &lines {
        if let Some(caps) = TOTAL_RE.captures(line) {
            total_amount = caps.get(1).and_then(|m| m.as_str().parse().ok());
            continue;
        }

        let caps = HYPHEN_RE.captures(line).or_else(|| SPACE_RE.captures(line));
        if let Some(caps) = caps {
            let product = caps.get(1).map(|m| m.as_str().trim().to_string());
            let quantity: Option<f64> = caps.get(2).and_then(|m| m.as_str().parse().ok());
            let unit = caps.get(3).map(|m| m.as_str().to_string());
            let price: Option<f64> = caps.get(4).and_then(|m| m.as_str().parse().ok());

            if let (Some(product), Some(quantity), Some(price)) = (product, quantity, price) {
                if !product.is_empty() {
                    items.push(ParchiItem {
                        product,
                        quantity: Some(quantity),
                        unit,
                        price: Some(price),
                    });
                }
            }
        }
    }

    if total_amount.is_none() && !items.is_empty() {
        total_amount = Some(items.iter().filter_map(|i| i.price).sum());
    }

    let confidence = if lines.is_empty() {
        0.0
    } else {
        (items.len() as f32 / lines.len() as f32).min(1.0)
    };

    ParchiData {
        raw_text: raw_text.to_string(),
        items,
        total_amount,
        confidence,
    }
}
