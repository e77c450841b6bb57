//! Backend selection and completion routing.
//!
//! The local tier is probed exactly once at initialization. If the probe
//! fails the engine uses the cloud client for the rest of the session;
//! there is no per-message fallback. `retry` throws the decision away
//! and probes again.

use tracing::{info, warn};

use munim_core::config::LlmConfig;
use munim_core::types::Message;
use munim_core::Result;

use crate::client::ChatClient;
use crate::local::{LocalModel, LocalModelLoader};

/// Which tier the engine settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Local,
    Cloud,
}

pub struct LlmEngine<L: LocalModelLoader> {
    loader: L,
    config: LlmConfig,
    api_key: Option<String>,
    local: Option<L::Model>,
    client: ChatClient,
}

impl<L: LocalModelLoader> LlmEngine<L> {
    /// Build the engine and settle the backend decision.
    pub fn initialize(loader: L, config: LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = ChatClient::new(config.clone(), api_key.clone())?;

        let local = if config.prefer_local {
            match loader.acquire() {
                Ok(model) => {
                    info!("Local model acquired, using on-device inference");
                    Some(model)
                }
                Err(e) => {
                    warn!(error = %e, "Local model unavailable, using cloud backend");
                    None
                }
            }
        } else {
            info!("Local inference disabled by config, using cloud backend");
            None
        };

        Ok(Self {
            loader,
            config,
            api_key,
            local,
            client,
        })
    }

    pub fn backend(&self) -> Backend {
        if self.local.is_some() {
            Backend::Local
        } else {
            Backend::Cloud
        }
    }

    /// Complete the conversation on whichever backend was settled.
    pub async fn complete(&self, history: &[Message]) -> Result<String> {
        match &self.local {
            Some(model) => model.complete(history).await,
            None => self.client.complete(history).await,
        }
    }

    /// Discard the settled backend and probe again from scratch.
    pub fn retry(&mut self) -> Result<()> {
        self.local = None;
        self.client = ChatClient::new(self.config.clone(), self.api_key.clone())?;
        if self.config.prefer_local {
            match self.loader.acquire() {
                Ok(model) => {
                    info!("Local model acquired on retry");
                    self.local = Some(model);
                }
                Err(e) => {
                    warn!(error = %e, "Local model still unavailable after retry");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{MockLoader, MockLocalModel, UnsupportedLoader};

    fn config() -> LlmConfig {
        LlmConfig::default()
    }

    #[tokio::test]
    async fn test_local_backend_when_loader_succeeds() {
        let loader = MockLoader::succeeding(MockLocalModel::with_response("Haan ji, bataiye"));
        let engine = LlmEngine::initialize(loader, config(), None).unwrap();

        assert_eq!(engine.backend(), Backend::Local);
        let reply = engine.complete(&[]).await.unwrap();
        assert_eq!(reply, "Haan ji, bataiye");
    }

    #[test]
    fn test_cloud_fallback_when_probe_fails() {
        let engine = LlmEngine::initialize(MockLoader::refusing(), config(), None).unwrap();
        assert_eq!(engine.backend(), Backend::Cloud);
    }

    #[test]
    fn test_cloud_when_local_disabled_by_config() {
        let loader = MockLoader::succeeding(MockLocalModel::with_response("unused"));
        let mut cfg = config();
        cfg.prefer_local = false;
        let engine = LlmEngine::initialize(loader, cfg, None).unwrap();
        assert_eq!(engine.backend(), Backend::Cloud);
    }

    #[test]
    fn test_unsupported_platform_settles_on_cloud() {
        let engine = LlmEngine::initialize(UnsupportedLoader, config(), None).unwrap();
        assert_eq!(engine.backend(), Backend::Cloud);
    }

    #[test]
    fn test_retry_reprobes() {
        let loader = MockLoader::succeeding(MockLocalModel::with_response("ok"));
        let mut cfg = config();
        cfg.prefer_local = false;
        let mut engine = LlmEngine::initialize(loader, cfg, None).unwrap();
        assert_eq!(engine.backend(), Backend::Cloud);

        // Flipping the preference and retrying re-runs the probe.
        engine.config.prefer_local = true;
        engine.retry().unwrap();
        assert_eq!(engine.backend(), Backend::Local);
    }

    #[tokio::test]
    async fn test_local_failure_does_not_fall_back_per_message() {
        let loader = MockLoader::succeeding(MockLocalModel::failing());
        let engine = LlmEngine::initialize(loader, config(), None).unwrap();

        assert_eq!(engine.backend(), Backend::Local);
        assert!(engine.complete(&[]).await.is_err());
        assert_eq!(engine.backend(), Backend::Local);
    }
}
