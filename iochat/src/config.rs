//! Active AI config resolution and catalog-validated config creation.

use std::sync::Arc;

use ioprovider::{AiConfig, catalog};
use uuid::Uuid;

use crate::{ChatError, ChatStore, NewAiConfig, SessionCache};

#[derive(Clone)]
pub struct ConfigResolver {
    store: Arc<dyn ChatStore>,
    session: Arc<SessionCache>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ChatStore>, session: Arc<SessionCache>) -> Self {
        Self { store, session }
    }

    /// Returns the cached config, or caches the first config the store lists.
    ///
    /// Which config wins on a cold start with several configs depends on the
    /// store's listing order.
    pub async fn active_config(&self) -> Result<AiConfig, ChatError> {
        if let Some(config) = self.session.active_config() {
            return Ok(config);
        }

        let _resolution = self.session.lock_config_resolution().await;
        if let Some(config) = self.session.active_config() {
            return Ok(config);
        }

        let config = self
            .store
            .list_ai_configs()
            .await
            .map_err(|error| error.context("list configs"))?
            .into_iter()
            .next()
            .ok_or_else(ChatError::no_configs_found)?;

        self.session.set_active_config(config.clone());
        tracing::info!(config_id = %config.id, config = %config.name, "loaded active ai config");
        Ok(config)
    }

    /// Loads a config by id and makes it active, replacing any cached one.
    pub async fn set_active_config(&self, id: Uuid) -> Result<AiConfig, ChatError> {
        let _resolution = self.session.lock_config_resolution().await;
        let config = self
            .store
            .get_ai_config(id)
            .await
            .map_err(|error| error.context("get config"))?
            .ok_or_else(|| ChatError::validation_failed(format!("ai config {id} not found")))?;

        self.session.set_active_config(config.clone());
        tracing::info!(
            config_id = %config.id,
            config = %config.name,
            provider = config.provider_name(),
            model = config.model_name(),
            "active ai config changed"
        );
        Ok(config)
    }

    /// Creates a config after checking the pair against the catalog, then the store.
    pub async fn create_ai_config(
        &self,
        provider: &str,
        model: &str,
        name: &str,
        system_prompt: &str,
    ) -> Result<AiConfig, ChatError> {
        catalog::validate_model(provider, model)?;

        let stored_provider = self
            .store
            .get_provider(provider)
            .await
            .map_err(|error| error.context("get provider"))?
            .ok_or_else(|| {
                ChatError::validation_failed(format!("provider {provider} not found in store"))
            })?;
        let stored_model = self
            .store
            .get_model(stored_provider.id, model)
            .await
            .map_err(|error| error.context("get model"))?
            .ok_or_else(|| {
                ChatError::validation_failed(format!("model {model} not found in store"))
            })?;

        let config = self
            .store
            .create_ai_config(NewAiConfig {
                name: name.to_string(),
                model_id: stored_model.id,
                system_prompt: (!system_prompt.is_empty()).then(|| system_prompt.to_string()),
            })
            .await
            .map_err(|error| error.context("create config"))?;

        tracing::info!(config_id = %config.id, config = %config.name, provider, model, "created ai config");
        Ok(config)
    }

    pub async fn list_ai_configs(&self) -> Result<Vec<AiConfig>, ChatError> {
        self.store
            .list_ai_configs()
            .await
            .map_err(|error| error.context("list configs"))
    }
}
