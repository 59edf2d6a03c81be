use std::path::PathBuf;
use std::sync::Arc;

use crate::agents::ask::AskPipeline;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db_path: Arc<PathBuf>,
    pub config: Arc<AppConfig>,
    /// Present only when an AI backend is configured. Shared across requests
    /// so the rate limiter spaces calls globally, not per request.
    pub pipeline: Option<Arc<AskPipeline>>,
}

impl AppState {
    pub fn ai_enabled(&self) -> bool {
        self.pipeline.is_some()
    }
}
