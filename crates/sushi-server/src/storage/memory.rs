//! In-memory repository, the default backend

use async_trait::async_trait;
use std::collections::HashMap;
use sushi_core::{Result, Sushi, SushiError, SushiRepository};
use tokio::sync::RwLock;
use tracing::debug;

/// Catalog held in a map behind a single lock
///
/// Reads share the lock; every mutation holds it exclusively for its whole
/// duration, so the existence check and the write can't interleave.
pub struct MemoryRepository {
    sushis: RwLock<HashMap<String, Sushi>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::with_sushis(HashMap::new())
    }

    pub fn with_sushis(sushis: HashMap<String, Sushi>) -> Self {
        Self {
            sushis: RwLock::new(sushis),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SushiRepository for MemoryRepository {
    async fn create_sushi(&self, sushi: &Sushi) -> Result<()> {
        let mut sushis = self.sushis.write().await;
        if sushis.contains_key(&sushi.id) {
            return Err(SushiError::AlreadyExists(sushi.id.clone()));
        }

        debug!("Creating sushi {} in memory", sushi.id);
        sushis.insert(sushi.id.clone(), sushi.clone());
        Ok(())
    }

    async fn get_sushis(&self) -> Result<Vec<Sushi>> {
        let sushis = self.sushis.read().await;
        Ok(sushis.values().cloned().collect())
    }

    async fn get_sushi_by_id(&self, id: &str) -> Result<Sushi> {
        let sushis = self.sushis.read().await;
        sushis
            .get(id)
            .cloned()
            .ok_or_else(|| SushiError::NotFound(id.to_string()))
    }

    async fn update_sushi(&self, id: &str, sushi: &Sushi) -> Result<()> {
        let mut sushis = self.sushis.write().await;
        let stored = sushis
            .get_mut(id)
            .ok_or_else(|| SushiError::NotFound(id.to_string()))?;

        *stored = Sushi {
            id: id.to_string(),
            ..sushi.clone()
        };
        Ok(())
    }

    async fn delete_sushi(&self, id: &str) -> Result<()> {
        let mut sushis = self.sushis.write().await;
        if sushis.remove(id).is_none() {
            debug!("Delete of unknown sushi {} ignored", id);
        }
        Ok(())
    }
}
