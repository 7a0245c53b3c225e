//! Catalog removals

use std::sync::Arc;
use sushi_core::{Result, SushiRepository};
use tracing::info;

pub struct RemovingService {
    repository: Arc<dyn SushiRepository>,
}

impl RemovingService {
    pub fn new(repository: Arc<dyn SushiRepository>) -> Self {
        Self { repository }
    }

    /// Removing an unknown id succeeds
    pub async fn remove_sushi(&self, id: &str) -> Result<()> {
        info!("Removing sushi: {}", id);
        self.repository.delete_sushi(id).await
    }
}
