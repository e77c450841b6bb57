//! On-device model capability.
//!
//! Local inference needs hardware acceleration that most of the target
//! devices lack, so acquisition is a probe that usually fails and the
//! engine falls back to the cloud client. The traits keep the engine
//! testable without real weights.

use async_trait::async_trait;

use munim_core::types::Message;
use munim_core::{MunimError, Result};

/// A loaded on-device model.
#[async_trait]
pub trait LocalModel: Send + Sync {
    async fn complete(&self, history: &[Message]) -> Result<String>;
}

/// Probes for and loads a local model.
pub trait LocalModelLoader: Send + Sync {
    type Model: LocalModel;

    /// Attempt to acquire a model handle. Fails when acceleration or
    /// weights are absent.
    fn acquire(&self) -> Result<Self::Model>;
}

// =============================================================================
// Implementations
// =============================================================================

/// Loader for platforms without on-device inference support.
pub struct UnsupportedLoader;

impl LocalModelLoader for UnsupportedLoader {
    type Model = MockLocalModel;

    fn acquire(&self) -> Result<Self::Model> {
        Err(MunimError::Llm(
            "On-device inference is not supported on this platform".to_string(),
        ))
    }
}

/// Canned local model for engine tests.
#[derive(Clone)]
pub struct MockLocalModel {
    response: String,
    fail: bool,
}

impl MockLocalModel {
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            response: String::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl LocalModel for MockLocalModel {
    async fn complete(&self, _history: &[Message]) -> Result<String> {
        if self.fail {
            return Err(MunimError::Llm("Mock local inference failure".to_string()));
        }
        Ok(self.response.clone())
    }
}

/// Loader that hands out a canned model, or refuses to.
pub struct MockLoader {
    model: Option<MockLocalModel>,
}

impl MockLoader {
    pub fn succeeding(model: MockLocalModel) -> Self {
        Self { model: Some(model) }
    }

    pub fn refusing() -> Self {
        Self { model: None }
    }
}

impl LocalModelLoader for MockLoader {
    type Model = MockLocalModel;

    fn acquire(&self) -> Result<Self::Model> {
        self.model
            .clone()
            .ok_or_else(|| MunimError::Llm("Mock loader refused".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_loader_always_fails() {
        assert!(UnsupportedLoader.acquire().is_err());
    }

    #[tokio::test]
    async fn test_mock_model_completes() {
        let model = MockLocalModel::with_response("Haan ji");
        let reply = model.complete(&[]).await.unwrap();
        assert_eq!(reply, "Haan ji");
    }

    #[tokio::test]
    async fn test_mock_model_failure() {
        assert!(MockLocalModel::failing().complete(&[]).await.is_err());
    }

    #[test]
    fn test_mock_loader_modes() {
        assert!(MockLoader::refusing().acquire().is_err());
        assert!(
            MockLoader::succeeding(MockLocalModel::with_response("ok"))
                .acquire()
                .is_ok()
        );
    }
}
