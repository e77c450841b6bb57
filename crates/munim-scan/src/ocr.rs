//! OCR engine trait and implementations.
//!
//! A real engine binding (Tesseract with Hindi + English traineddata) is a
//! platform capability that may be absent; callers treat OCR failure as a
//! scan-tier failure. `MockOcrService` returns deterministic text for
//! pipeline tests.

use munim_core::error::MunimError;

/// Characters the OCR engine is allowed to emit.
///
/// Digits, Latin letters, common Devanagari, and the punctuation that
/// appears on parchis.
pub const PARCHI_CHAR_WHITELIST: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyzअआइईउऊएऐओऔकखगघचछजझटठडढणतथदधनपफबभमयरलवशषसह₹./-() ";

/// Configuration for the OCR engine.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Engine language packs, e.g. "hin+eng".
    pub languages: String,
    /// Restrict recognition to these characters.
    pub char_whitelist: String,
    /// Let the engine pick the page segmentation automatically.
    pub auto_page_seg: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: "hin+eng".to_string(),
            char_whitelist: PARCHI_CHAR_WHITELIST.to_string(),
            auto_page_seg: true,
        }
    }
}

/// Service for extracting text from preprocessed parchi images.
pub trait OcrService: Send + Sync {
    /// Extract text from raw image bytes (JPEG or PNG) using the given
    /// engine configuration.
    ///
    /// Returns the extracted text, which may be empty if no text is found.
    fn extract_text(
        &self,
        image_data: &[u8],
        config: &OcrConfig,
    ) -> impl std::future::Future<Output = Result<String, MunimError>> + Send;
}

/// Mock OCR service for testing.
///
/// Returns deterministic text output without performing real OCR.
#[derive(Debug, Clone)]
pub struct MockOcrService {
    response_text: String,
    fail: bool,
}

impl MockOcrService {
    /// Mock that returns generic parchi-like text.
    pub fn new() -> Self {
        Self {
            response_text: "Atta - 10 kg - 450\nTotal 450".to_string(),
            fail: false,
        }
    }

    /// Mock that returns the specified text.
    pub fn with_text(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
            fail: false,
        }
    }

    /// Mock that returns empty text (no text detected).
    pub fn empty() -> Self {
        Self {
            response_text: String::new(),
            fail: false,
        }
    }

    /// Mock that fails every extraction (engine unavailable).
    pub fn failing() -> Self {
        Self {
            response_text: String::new(),
            fail: true,
        }
    }
}

impl Default for MockOcrService {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrService for MockOcrService {
    async fn extract_text(
        &self,
        image_data: &[u8],
        _config: &OcrConfig,
    ) -> Result<String, MunimError> {
        if self.fail {
            return Err(MunimError::Ocr("OCR engine unavailable".to_string()));
        }
        if image_data.is_empty() {
            return Err(MunimError::Ocr("Empty image data".to_string()));
        }
        Ok(self.response_text.clone())
    }
}
