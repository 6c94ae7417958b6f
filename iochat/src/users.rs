//! Display-name to user identity resolution.

use std::sync::Arc;

use ioprovider::User;

use crate::{ChatError, ChatStore};

/// Case-folds a display name into its stored form.
pub fn normalize_username(username: &str) -> String {
    username.to_lowercase()
}

#[derive(Clone)]
pub struct UserRegistry {
    store: Arc<dyn ChatStore>,
}

impl UserRegistry {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Returns the user for `username`, creating it on first sight.
    ///
    /// The lookup is a fast path; creation relies on the store's idempotent
    /// `create_user`, so racing first messages resolve to one identity.
    pub async fn get_or_create_user(&self, username: &str) -> Result<User, ChatError> {
        let name = normalize_username(username);

        if let Some(user) = self
            .store
            .get_user(&name)
            .await
            .map_err(|error| error.context("get user"))?
        {
            return Ok(user);
        }

        let user = self
            .store
            .create_user(&name)
            .await
            .map_err(|error| error.context("create user"))?;
        tracing::debug!(user_id = %user.id, user = %user.name, "created user");
        Ok(user)
    }
}
