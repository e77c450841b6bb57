//! Two-tier parchi scan pipeline.
//!
//! Tier one sends the image to the cloud vision model. When that tier is
//! unconfigured or fails, tier two preprocesses the image locally and runs
//! it through OCR plus the line parser.

use tracing::{info, warn};

use munim_core::config::ScanConfig;
use munim_core::types::ParchiData;
use munim_core::Result;

use crate::data_url;
use crate::ocr::{OcrConfig, OcrService};
use crate::parser::parse_parchi_text;
use crate::preprocess::optimize_for_ocr;
use crate::vision::VisionClient;

pub struct ParchiScanner<O: OcrService> {
    vision: Option<VisionClient>,
    ocr: O,
    ocr_config: OcrConfig,
    config: ScanConfig,
}

impl<O: OcrService> ParchiScanner<O> {
    pub fn new(vision: Option<VisionClient>, ocr: O, config: ScanConfig) -> Self {
        Self {
            vision,
            ocr,
            ocr_config: OcrConfig::default(),
            config,
        }
    }

    /// Scan a parchi image given as a data URL (or bare base64).
    ///
    /// Returns an error only when both tiers fail.
    pub async fn scan(&self, image_data_url: &str) -> Result<ParchiData> {
        if let Some(vision) = &self.vision {
            match vision.extract(image_data_url).await {
                Ok(data) => {
                    info!(items = data.items.len(), "Vision extraction succeeded");
                    return Ok(data);
                }
                Err(e) => {
                    warn!(error = %e, "Vision tier failed, falling back to local OCR");
                }
            }
        }

        self.scan_local(image_data_url).await
    }

    async fn scan_local(&self, image_data_url: &str) -> Result<ParchiData> {
        let raw_bytes = data_url::decode(image_data_url)?;
        let optimized = optimize_for_ocr(&raw_bytes, &self.config)?;
        let text = self.ocr.extract_text(&optimized, &self.ocr_config).await?;

        // An empty parse is still a successful scan; callers tell "nothing
        // recognized" apart from a failed tier by the Ok with no items.
        let data = parse_parchi_text(&text);
        info!(
            items = data.items.len(),
            confidence = data.confidence,
            "Local OCR extraction succeeded"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::encode;
    use crate::ocr::MockOcrService;
    use image::{ImageBuffer, Luma};

    /// A tiny valid PNG, base64-wrapped as the capture layer would send it.
    fn test_image_data_url() -> String {
        let img = ImageBuffer::from_fn(8, 8, |x, _| Luma([if x % 2 == 0 { 0u8 } else { 255 }]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        encode(&bytes, "image/png")
    }

    #[tokio::test]
    async fn test_local_tier_parses_ocr_text() {
        let ocr = MockOcrService::with_text("Atta - 10 kg - 450\nMilk 2 packet 60");
        let scanner = ParchiScanner::new(None, ocr, ScanConfig::default());

        let data = scanner.scan(&test_image_data_url()).await.unwrap();
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.total_amount, Some(510.0));
    }

    #[tokio::test]
    async fn test_non_bill_text_is_ok_with_no_items() {
        let ocr = MockOcrService::with_text("shukriya aaiye dobara\nshubh deepavali");
        let scanner = ParchiScanner::new(None, ocr, ScanConfig::default());

        let data = scanner.scan(&test_image_data_url()).await.unwrap();
        assert!(data.items.is_empty());
        assert_eq!(data.total_amount, None);
        assert_eq!(data.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_empty_ocr_output_is_ok_and_empty() {
        let scanner = ParchiScanner::new(None, MockOcrService::empty(), ScanConfig::default());

        let data = scanner.scan(&test_image_data_url()).await.unwrap();
        assert!(data.items.is_empty());
        assert_eq!(data.confidence, 0.0);
    }

    #[test]
    fn test_scanner_configures_mixed_script_ocr() {
        let scanner = ParchiScanner::new(None, MockOcrService::new(), ScanConfig::default());
        assert_eq!(scanner.ocr_config.languages, "hin+eng");
        assert!(scanner.ocr_config.auto_page_seg);
    }

    #[tokio::test]
    async fn test_ocr_failure_propagates() {
        let scanner = ParchiScanner::new(None, MockOcrService::failing(), ScanConfig::default());
        assert!(scanner.scan(&test_image_data_url()).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_image_bytes_rejected() {
        let ocr = MockOcrService::with_text("Atta - 10 kg - 450");
        let scanner = ParchiScanner::new(None, ocr, ScanConfig::default());
        let bad = encode(b"not an image", "image/png");
        assert!(scanner.scan(&bad).await.is_err());
    }
}
