//! Intent and entity engine.
//!
//! Pure, deterministic keyword matching over mixed Latin/Devanagari text.
//! No network, no model inference: detection must work offline and return
//! the same result for the same input every time.

pub mod context;
pub mod entities;
pub mod rules;

pub use context::{intent_context, strip_control_tokens};
pub use entities::extract_entities;
pub use rules::detect_intent;
