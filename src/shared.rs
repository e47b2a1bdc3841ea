use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::member::{PlayerRegistry, RegistryError};
use crate::record::RecordError;
use crate::report::QueryError;
use crate::settings::{Settings, SettingsError};
use crate::source::{MessageSource, ResultTable, SourceError};
use crate::stats::StatsError;

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Shared application state containing all dependencies.
///
/// Settings and the registry are only ever replaced as a whole: readers take
/// an `Arc` snapshot and keep it for the rest of their request.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<RwLock<Arc<Settings>>>,
    registry: Arc<RwLock<Arc<PlayerRegistry>>>,
    pub messages: Arc<dyn MessageSource>,
    pub archive: Arc<dyn ResultTable>,
    clock: Clock,
}

impl AppState {
    pub fn new(
        settings: Settings,
        registry: PlayerRegistry,
        messages: Arc<dyn MessageSource>,
        archive: Arc<dyn ResultTable>,
    ) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Arc::new(settings))),
            registry: Arc::new(RwLock::new(Arc::new(registry))),
            messages,
            archive,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub async fn settings(&self) -> Arc<Settings> {
        self.settings.read().await.clone()
    }

    pub async fn registry(&self) -> Arc<PlayerRegistry> {
        self.registry.read().await.clone()
    }

    pub async fn replace_settings(&self, settings: Settings) {
        *self.settings.write().await = Arc::new(settings);
        info!("Reloaded settings");
    }

    pub async fn replace_registry(&self, registry: PlayerRegistry) {
        let players = registry.len();
        *self.registry.write().await = Arc::new(registry);
        info!(players, "Reloaded player registry");
    }

    /// Applies `change` to a copy of the registry and swaps the copy in only
    /// when it succeeds.
    pub async fn update_registry<T, E>(
        &self,
        change: impl FnOnce(&mut PlayerRegistry) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut current = self.registry.write().await;
        let mut next = PlayerRegistry::clone(&current);
        let outcome = change(&mut next)?;
        *current = Arc::new(next);
        Ok(outcome)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Malformed member list: {0}")]
    Members(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}


#[cfg(test)]
mod tests {
    use super::test_utils::AppStateBuilder;
    use super::*;
    use crate::member::RegistryLimits;

    #[tokio::test]
    async fn failed_update_leaves_registry_untouched() {
        let state = AppStateBuilder::new().build();
        let settings = state.settings().await;
        let limits = RegistryLimits::from_settings(&settings.member);

        let added = state
            .update_registry(|registry| registry.add_player("たろう", &limits))
            .await;
        assert!(added.is_ok());

        let before = state.registry().await;
        let again = state
            .update_registry(|registry| registry.add_player("たろう", &limits))
            .await;
        assert!(matches!(again, Err(RegistryError::AlreadyRegistered(_))));
        assert!(Arc::ptr_eq(&before, &state.registry().await));
    }

    #[tokio::test]
    async fn snapshots_survive_replacement() {
        let state = AppStateBuilder::new().build();
        let snapshot = state.settings().await;

        let mut changed = Settings::default();
        changed.search.keyword = "ロン".into();
        state.replace_settings(changed).await;

        assert_eq!(snapshot.search.keyword, "御無礼");
        assert_eq!(state.settings().await.search.keyword, "ロン");
    }
}
