use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MunimError, Result};
use crate::types::Language;

/// Top-level configuration for the Munim application.
///
/// Loaded from `~/.munim/config.toml` by default. Each section corresponds
/// to a subsystem or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MunimConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl MunimConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MunimConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MunimError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Interface language for greetings and speech locales.
    pub language: Language,
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: Language::Hinglish,
            data_dir: "~/.munim/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Voice interaction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Silence window after the last final fragment before the transcript commits.
    pub debounce_ms: u64,
    /// Delay before listening resumes after speech output or a capture end.
    pub resume_delay_ms: u64,
    /// Synthesis speaking rate (1.0 = natural).
    pub rate: f32,
    /// Synthesis pitch (1.0 = natural).
    pub pitch: f32,
    /// Keep the capture session open across utterances.
    pub continuous: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            resume_delay_ms: 300,
            rate: 0.9,
            pitch: 1.0,
            continuous: true,
        }
    }
}

/// Parchi scan pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Vision extraction endpoint. Empty disables the vision tier.
    pub vision_endpoint: String,
    /// Request timeout for the vision tier, in seconds.
    pub vision_timeout_secs: u64,
    /// Contrast stretch strength applied before local OCR.
    pub contrast: f32,
    /// JPEG quality (1-100) for the re-encoded OCR input.
    pub jpeg_quality: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            vision_endpoint: String::new(),
            vision_timeout_secs: 12,
            contrast: 1.5,
            jpeg_quality: 95,
        }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completion endpoint (OpenAI-compatible).
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout, in seconds. A timed-out request counts as a failure.
    pub timeout_secs: u64,
    /// Try an on-device model before falling back to the cloud endpoint.
    pub prefer_local: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "meta-llama/llama-3.3-70b-instruct".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_secs: 12,
            prefer_local: true,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Default reorder point for items without an explicit one.
    pub reorder_point: f64,
    /// Window for profit analysis, in days.
    pub profit_window_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reorder_point: 10.0,
            profit_window_days: 7,
        }
    }
}
