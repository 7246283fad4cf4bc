use crate::errors::AppError;
use crate::models::AppData;
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared state of the hydration service.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Applies `change` under the data lock and persists before releasing it.
    pub async fn mutate<T>(&self, change: impl FnOnce(&mut AppData) -> T) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let outcome = change(&mut data);
        persist_data(&self.data_path, &data).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::load_data;

    #[tokio::test]
    async fn mutate_persists_before_returning() {
        let mut path = std::env::temp_dir();
        path.push(format!("hydration_state_{}.json", std::process::id()));
        let state = AppState::new(path.clone(), AppData::default());

        let goal = state
            .mutate(|data| {
                data.goal_ml = 3200;
                data.goal_ml
            })
            .await
            .unwrap();
        let reloaded = load_data(&path).await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(goal, 3200);
        assert_eq!(reloaded.goal_ml, 3200);
    }
}
