//! Shared, in-memory copy of the site settings.
//!
//! The state is created in `main.rs` after the store opens and injected into
//! the Actix application through `AppState`. Page handlers take a snapshot
//! under a read lock; the admin endpoint persists a new version and swaps it
//! in under a write lock.

use crate::store::{settings, Store, StoreError};
use common::model::settings::SiteSettings;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe, cloneable handle to the current settings.
#[derive(Clone)]
pub struct SettingsState {
    /// Always mirrors row 1 of `site_settings` as of the last load or write.
    pub settings: Arc<RwLock<SiteSettings>>,
}

impl SettingsState {
    /// Reads the canonical row, creating it with the stock copy when absent.
    pub fn load(store: &Store) -> Result<Self, StoreError> {
        let current = store.write(|tx| settings::load_or_create(tx))?;
        Ok(Self {
            settings: Arc::new(RwLock::new(current)),
        })
    }

    pub async fn snapshot(&self) -> SiteSettings {
        self.settings.read().await.clone()
    }

    /// Persists `next` to the canonical row and then makes it current.
    ///
    /// The write lock is held across the database write so two concurrent
    /// updates cannot leave memory and storage disagreeing.
    pub async fn replace(
        &self,
        store: &Store,
        next: SiteSettings,
    ) -> Result<SiteSettings, StoreError> {
        let mut current = self.settings.write().await;
        let saved = store.write(|tx| settings::save(tx, &next))?;
        *current = saved.clone();
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn replace_updates_memory_and_storage() {
        let store = Store::open_in_memory().unwrap();
        let state = SettingsState::load(&store).unwrap();
        assert_eq!(
            state.snapshot().await.business_name,
            "Titan Nexus Industrial Supply"
        );

        let next = SiteSettings {
            tagline: "Machines, sourced.".to_string(),
            ..state.snapshot().await
        };
        state.replace(&store, next).await.unwrap();

        assert_eq!(state.snapshot().await.tagline, "Machines, sourced.");
        let stored = store.read(|conn| settings::get(conn)).unwrap();
        assert_eq!(stored.tagline, "Machines, sourced.");
    }

    #[actix_web::test]
    async fn loading_again_reuses_the_stored_row() {
        let store = Store::open_in_memory().unwrap();
        let first = SettingsState::load(&store).unwrap();
        first
            .replace(
                &store,
                SiteSettings {
                    business_name: "Acme Brokers".to_string(),
                    ..SiteSettings::default()
                },
            )
            .await
            .unwrap();
        let second = SettingsState::load(&store).unwrap();
        assert_eq!(second.snapshot().await.business_name, "Acme Brokers");
    }
}
