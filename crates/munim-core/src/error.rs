use thiserror::Error;

/// Top-level error type for the Munim system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates build
/// their errors through these variants so the `?` operator works seamlessly
/// across crate boundaries. Pure computations (intent detection, the parchi
/// line parser) never produce errors; only I/O-bound paths do.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MunimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Voice error: {0}")]
    Voice(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Vision error: {0}")]
    Vision(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Model error: {0}")]
    Llm(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MunimError {
    fn from(err: toml::de::Error) -> Self {
        MunimError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MunimError {
    fn from(err: toml::ser::Error) -> Self {
        MunimError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MunimError {
    fn from(err: serde_json::Error) -> Self {
        MunimError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Munim operations.
pub type Result<T> = std::result::Result<T, MunimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MunimError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(MunimError, &str)> = vec![
            (
                MunimError::Voice("session closed".to_string()),
                "Voice error: session closed",
            ),
            (
                MunimError::Capture("mic permission denied".to_string()),
                "Capture error: mic permission denied",
            ),
            (
                MunimError::Synthesis("no voices".to_string()),
                "Synthesis error: no voices",
            ),
            (
                MunimError::Ocr("engine unavailable".to_string()),
                "OCR error: engine unavailable",
            ),
            (
                MunimError::Vision("endpoint 502".to_string()),
                "Vision error: endpoint 502",
            ),
            (
                MunimError::Scan("both tiers failed".to_string()),
                "Scan error: both tiers failed",
            ),
            (
                MunimError::Store("insufficient stock".to_string()),
                "Store error: insufficient stock",
            ),
            (
                MunimError::Llm("timeout".to_string()),
                "Model error: timeout",
            ),
            (
                MunimError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let munim_err: MunimError = io_err.into();
        assert!(matches!(munim_err, MunimError::Io(_)));
        assert!(munim_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let err: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(err.is_err());
        let munim_err: MunimError = err.unwrap_err().into();
        assert!(matches!(munim_err, MunimError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(err.is_err());
        let munim_err: MunimError = err.unwrap_err().into();
        assert!(matches!(munim_err, MunimError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
