pub mod config;
pub mod seed;
pub mod services;
pub mod site_settings;
pub mod store;

use crate::config::Config;
use crate::services::notification::Notifier;
use crate::site_settings::SettingsState;
use crate::store::{Store, StoreError};
use actix_web::web::{self, ServiceConfig};

const JSON_LIMIT: usize = 2 * 1024 * 1024;

/// Everything a handler can reach through `web::Data<AppState>`.
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub settings: SettingsState,
    pub notifier: Notifier,
}

impl AppState {
    /// Loads the site settings row, creating it on first start.
    pub fn new(config: Config, store: Store, notifier: Notifier) -> Result<Self, StoreError> {
        let settings = SettingsState::load(&store)?;
        Ok(Self {
            config,
            store,
            settings,
            notifier,
        })
    }
}

/// Registers the shared state and every route of the site.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let media_root = state.config.media_root.clone();
        cfg.app_data(state)
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .configure(services::admin::configure_routes)
            .configure(services::assets::configure_routes)
            .service(actix_files::Files::new("/media", media_root))
            .configure(services::pages::configure_routes);
    }
}
