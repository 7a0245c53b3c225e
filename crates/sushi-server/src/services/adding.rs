//! Catalog additions

use std::sync::Arc;
use sushi_core::{Result, Sushi, SushiRepository};
use tracing::info;

pub struct AddingService {
    repository: Arc<dyn SushiRepository>,
}

impl AddingService {
    pub fn new(repository: Arc<dyn SushiRepository>) -> Self {
        Self { repository }
    }

    pub async fn add_sushi(
        &self,
        id: &str,
        image_number: &str,
        name: &str,
        ingredients: Vec<String>,
    ) -> Result<()> {
        info!("Adding sushi: id={}, name={}", id, name);

        let sushi = Sushi::new(id, image_number, name, ingredients);
        self.repository.create_sushi(&sushi).await
    }
}
