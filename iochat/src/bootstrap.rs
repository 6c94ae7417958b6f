//! Store bootstrap: catalog sync and default config creation.

use ioprovider::catalog;

use crate::{ChatError, ChatStore, ConfigResolver};

/// Ensures every catalog provider and model exists in the store.
///
/// Create-if-missing only; entries no longer in the catalog are left alone.
pub async fn sync_catalog(store: &dyn ChatStore) -> Result<(), ChatError> {
    for entry in catalog::entries() {
        let provider = match store
            .get_provider(entry.provider)
            .await
            .map_err(|error| error.context(&format!("check provider {}", entry.provider)))?
        {
            Some(provider) => provider,
            None => {
                let created = store
                    .create_provider(entry.provider)
                    .await
                    .map_err(|error| error.context(&format!("sync provider {}", entry.provider)))?;
                tracing::info!(provider = entry.provider, "synced catalog provider");
                created
            }
        };

        for &model in entry.models {
            let existing = store
                .get_model(provider.id, model)
                .await
                .map_err(|error| error.context(&format!("check model {model}")))?;
            if existing.is_none() {
                store
                    .create_model(&provider, model)
                    .await
                    .map_err(|error| error.context(&format!("sync model {model}")))?;
                tracing::info!(provider = entry.provider, model, "synced catalog model");
            }
        }
    }

    Ok(())
}

/// Creates and activates the catalog default config when the store has none.
pub async fn create_default_config(
    store: &dyn ChatStore,
    configs: &ConfigResolver,
) -> Result<(), ChatError> {
    let existing = store
        .list_ai_configs()
        .await
        .map_err(|error| error.context("list configs"))?;
    if !existing.is_empty() {
        return Ok(());
    }

    let config = configs
        .create_ai_config(
            catalog::DEFAULT_PROVIDER,
            catalog::DEFAULT_MODEL,
            catalog::DEFAULT_CONFIG_NAME,
            catalog::DEFAULT_SYSTEM_PROMPT,
        )
        .await
        .map_err(|error| error.context("create default ai config"))?;
    configs
        .set_active_config(config.id)
        .await
        .map_err(|error| error.context("set default ai config active"))?;

    tracing::info!(config_id = %config.id, "created default ai config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{InMemoryChatStore, SessionCache};

    #[tokio::test]
    async fn sync_is_idempotent() {
        let store = InMemoryChatStore::new();
        sync_catalog(&store).await.unwrap();
        sync_catalog(&store).await.unwrap();

        for entry in catalog::entries() {
            let provider = store.get_provider(entry.provider).await.unwrap().unwrap();
            for &model in entry.models {
                assert!(store.get_model(provider.id, model).await.unwrap().is_some());
            }
        }
    }

    #[tokio::test]
    async fn default_config_is_created_only_once() {
        let store = Arc::new(InMemoryChatStore::new());
        let session = Arc::new(SessionCache::new());
        let configs = ConfigResolver::new(store.clone(), session.clone());

        sync_catalog(store.as_ref()).await.unwrap();
        create_default_config(store.as_ref(), &configs).await.unwrap();
        create_default_config(store.as_ref(), &configs).await.unwrap();

        let listed = store.list_ai_configs().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, catalog::DEFAULT_CONFIG_NAME);
        assert_eq!(listed[0].model_name(), catalog::DEFAULT_MODEL);
        assert_eq!(session.active_config().map(|c| c.id), Some(listed[0].id));
    }
}
