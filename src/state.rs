use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::database::CareStore;
use crate::services::{CareLogService, CareSettingService, ReflectionNoteService};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CareStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub reflection_cache: Arc<TtlCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CareStore>, verifier: Arc<dyn TokenVerifier>, config: AppConfig) -> Self {
        let reflection_cache = Arc::new(TtlCache::new(config.cache.reflection_notes_ttl()));
        Self {
            store,
            verifier,
            reflection_cache,
            config: Arc::new(config),
        }
    }

    pub fn care_settings(&self) -> CareSettingService {
        CareSettingService::new(self.store.clone())
    }

    pub fn care_logs(&self) -> CareLogService {
        CareLogService::new(self.store.clone())
    }

    pub fn reflection_notes(&self) -> ReflectionNoteService {
        ReflectionNoteService::new(self.store.clone(), self.reflection_cache.clone())
    }
}
