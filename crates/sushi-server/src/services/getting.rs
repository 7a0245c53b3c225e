//! Catalog lookups

use std::sync::Arc;
use sushi_core::{Result, Sushi, SushiRepository};
use tracing::error;

pub struct GettingService {
    repository: Arc<dyn SushiRepository>,
}

impl GettingService {
    pub fn new(repository: Arc<dyn SushiRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_sushis(&self) -> Result<Vec<Sushi>> {
        self.repository.get_sushis().await.inspect_err(|e| {
            error!("Unexpected error listing sushis: {}", e);
        })
    }

    pub async fn get_sushi_by_id(&self, id: &str) -> Result<Sushi> {
        self.repository.get_sushi_by_id(id).await.inspect_err(|e| {
            if !e.is_not_found() {
                error!("Unexpected error fetching sushi {}: {}", id, e);
            }
        })
    }
}
