//! Storage trait for the sushi catalog

use crate::Result;
use async_trait::async_trait;
use sushi_types::Sushi;

/// Sushi store
///
/// Every backend honours the same existence rules:
/// - `create_sushi` fails with `SushiError::AlreadyExists` when the id is taken.
/// - `get_sushi_by_id` and `update_sushi` fail with `SushiError::NotFound`
///   when the id is absent; `update_sushi` never creates a record.
/// - `delete_sushi` of an absent id succeeds.
///
/// `update_sushi` replaces the whole record; the stored `id` is always the
/// `id` argument, whatever the replacement carries.
#[async_trait]
pub trait SushiRepository: Send + Sync {
    async fn create_sushi(&self, sushi: &Sushi) -> Result<()>;
    async fn get_sushis(&self) -> Result<Vec<Sushi>>;
    async fn get_sushi_by_id(&self, id: &str) -> Result<Sushi>;
    async fn update_sushi(&self, id: &str, sushi: &Sushi) -> Result<()>;
    async fn delete_sushi(&self, id: &str) -> Result<()>;
}
