//! Parchi (handwritten bill) extraction pipeline.
//!
//! Two tiers: a vision endpoint that returns structured JSON directly, and
//! a local preprocess-then-OCR fallback. The pipeline fails only when both
//! tiers fail; a scan that recognizes no bill content is still Ok, with an
//! empty item list.

pub mod data_url;
pub mod ocr;
pub mod parser;
pub mod preprocess;
pub mod scanner;
pub mod vision;

pub use ocr::{MockOcrService, OcrConfig, OcrService};
pub use parser::parse_parchi_text;
pub use preprocess::optimize_for_ocr;
pub use scanner::ParchiScanner;
pub use vision::VisionClient;
