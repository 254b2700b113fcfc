use std::sync::{Arc, Mutex};

use crate::config::{AppConfig, StoreBackend};
use crate::data::elasticsearch::ElasticsearchStore;
use crate::data::repository::SqliteIndexStore;
use crate::data::IndexStore;
use crate::error::AppError;
use crate::services::pipeline_service::Pipeline;
use crate::services::speech_engine::{HttpSpeechEngine, SpeechEngine};
use crate::services::transcription_service::Transcriber;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexingProgressState {
    pub processed: usize,
    pub total: usize,
    pub status: String,
}

impl IndexingProgressState {
    pub fn idle() -> Self {
        Self {
            processed: 0,
            total: 0,
            status: "done".to_string(),
        }
    }
}

/// Handles shared by every command. Built once at startup and passed in
/// explicitly so tests can swap in fakes.
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn IndexStore>,
    pub pipeline: Pipeline,
    pub indexing_status: Arc<Mutex<IndexingProgressState>>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn IndexStore>,
        engine: Arc<dyn SpeechEngine>,
    ) -> Result<Self, AppError> {
        let transcriber = Transcriber::new(engine, config.generation_config()?);
        let pipeline = Pipeline::new(transcriber, store.clone(), &config.index_name)
            .with_max_results(config.max_results)
            .with_stage_timeout(config.stage_timeout());

        Ok(Self {
            config,
            store,
            pipeline,
            indexing_status: Arc::new(Mutex::new(IndexingProgressState::idle())),
        })
    }

    /// Connects the configured store and speech engine.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn IndexStore> = match config.store {
            StoreBackend::Sqlite => Arc::new(SqliteIndexStore::open(&config.database_path()?)?),
            StoreBackend::Elasticsearch => Arc::new(ElasticsearchStore::new(
                &config.store_url,
                config.request_timeout(),
            )?),
        };
        let engine = Arc::new(HttpSpeechEngine::new(
            &config.engine_url,
            config.request_timeout(),
        )?);
        Self::new(config, store, engine)
    }

    pub fn set_indexing_status(&self, processed: usize, total: usize, status: &str) {
        let mut guard = self
            .indexing_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = IndexingProgressState {
            processed,
            total,
            status: status.to_string(),
        };
    }

    pub fn indexing_status(&self) -> IndexingProgressState {
        self.indexing_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
