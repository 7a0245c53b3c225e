//! Catalog modifications

use std::sync::Arc;
use sushi_core::{Result, Sushi, SushiRepository};
use tracing::info;

pub struct ModifyingService {
    repository: Arc<dyn SushiRepository>,
}

impl ModifyingService {
    pub fn new(repository: Arc<dyn SushiRepository>) -> Self {
        Self { repository }
    }

    /// Replace every field of sushi `id`; fails with `NotFound` if it doesn't exist
    pub async fn modify_sushi(
        &self,
        id: &str,
        image_number: &str,
        name: &str,
        ingredients: Vec<String>,
    ) -> Result<()> {
        info!("Modifying sushi: id={}, name={}", id, name);

        let sushi = Sushi::new(id, image_number, name, ingredients);
        self.repository.update_sushi(id, &sushi).await
    }
}
