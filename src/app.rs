//! Application wiring: builds the relay client, the code book and the
//! deployment stage that the HTTP handlers share.

use crate::ai::{AnthropicClient, MessagesService};
use crate::analysis::ProfileAnalyzer;
use crate::codes::CodeBook;
use crate::models::{Config, DeploymentStage, ModelSettings};
use crate::store::{KvRestClient, StoreHandle};
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared, cheaply clonable handler state.
#[derive(Clone)]
pub struct App {
    analyzer: Arc<ProfileAnalyzer>,
    codes: Arc<CodeBook>,
    stage: DeploymentStage,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub messages: Arc<dyn MessagesService>,
    pub store: StoreHandle,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(
        services: AppServices,
        models: ModelSettings,
        stage: DeploymentStage,
    ) -> Self {
        Self {
            analyzer: Arc::new(ProfileAnalyzer::new(services.messages, models)),
            codes: Arc::new(CodeBook::new(services.store)),
            stage,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn from_config(config: &Config) -> Result<Self> {
        let messages = AnthropicClient::new(
            config.anthropic_api_key.clone(),
            config.upstream_timeout,
        )?
        .with_base_url(config.anthropic_base_url.clone());
        info!(
            "Model provider: Anthropic (extraction: {}, profile: {})",
            config.models.extraction_model, config.models.profile_model
        );

        let store = match config.kv_credentials() {
            Some((url, token)) => {
                info!("KV store enabled at {}", url);
                StoreHandle::available(KvRestClient::new(url.to_string(), token.to_string()))
            }
            None => {
                warn!("KV store not configured - profile codes won't be retrievable");
                StoreHandle::Unavailable
            }
        };

        info!("Deployment stage: {:?}", config.stage);

        Ok(Self::with_services(
            AppServices {
                messages: Arc::new(messages),
                store,
            },
            config.models.clone(),
            config.stage,
        ))
    }

    pub fn analyzer(&self) -> &ProfileAnalyzer {
        &self.analyzer
    }

    pub fn codes(&self) -> &CodeBook {
        &self.codes
    }

    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    /// Whether a caller's debug flag may select a canned reply.
    pub fn mock_requested(&self, use_mock: bool) -> bool {
        use_mock && self.stage.allows_mock_responses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockMessagesClient;

    fn app(stage: DeploymentStage) -> App {
        App::with_services(
            AppServices {
                messages: Arc::new(MockMessagesClient::new()),
                store: StoreHandle::Unavailable,
            },
            ModelSettings::default(),
            stage,
        )
    }

    #[test]
    fn test_mock_gate_is_closed_in_production() {
        assert!(!app(DeploymentStage::Production).mock_requested(true));
        assert!(!app(DeploymentStage::Production).mock_requested(false));
    }

    #[test]
    fn test_mock_gate_follows_flag_outside_production() {
        assert!(app(DeploymentStage::Preview).mock_requested(true));
        assert!(app(DeploymentStage::Development).mock_requested(true));
        assert!(!app(DeploymentStage::Development).mock_requested(false));
    }

    #[test]
    fn test_from_config_without_kv_degrades() {
        let config = Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            "APP_ENV" => Some("preview".to_string()),
            _ => None,
        })
        .unwrap();

        let app = App::from_config(&config).unwrap();
        assert!(!app.codes().store_available());
        assert_eq!(app.stage(), DeploymentStage::Preview);
    }

    #[test]
    fn test_from_config_with_kv_enables_store() {
        let config = Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            "KV_REST_API_URL" => Some("https://kv.example.com".to_string()),
            "KV_REST_API_TOKEN" => Some("token".to_string()),
            _ => None,
        })
        .unwrap();

        let app = App::from_config(&config).unwrap();
        assert!(app.codes().store_available());
        assert_eq!(app.stage(), DeploymentStage::Production);
    }
}
