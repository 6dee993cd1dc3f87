use std::sync::Arc;

use crate::{config::AppConfig, store::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn SessionStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
