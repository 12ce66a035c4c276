use std::sync::Arc;

use urbanroute_core::UrbanModel;

use crate::config::PlanningDefaults;
use crate::error::ApiError;

/// Shared, read-only state of every handler.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<UrbanModel>,
    pub planning: Arc<PlanningDefaults>,
}

impl AppState {
    pub fn new(model: UrbanModel, planning: PlanningDefaults) -> Self {
        Self {
            model: Arc::new(model),
            planning: Arc::new(planning),
        }
    }

    /// Runs CPU-bound work against the model on the blocking pool.
    pub async fn run<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&UrbanModel, &PlanningDefaults) -> Result<T, ApiError> + Send + 'static,
    {
        let model = Arc::clone(&self.model);
        let planning = Arc::clone(&self.planning);
        tokio::task::spawn_blocking(move || work(&model, &planning))
            .await
            .map_err(|e| ApiError::Internal(format!("worker task failed: {e}")))?
    }
}
