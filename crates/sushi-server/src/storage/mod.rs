//! Storage layer
//!
//! Every backend implements `sushi_core::SushiRepository`; the one in use is
//! picked from configuration at startup and shared behind an `Arc`.

pub mod kv;
pub mod memory;
pub mod sql;

#[cfg(test)]
mod contract;

pub use kv::RedisRepository;
pub use memory::MemoryRepository;
pub use sql::{Dialect, SqlRepository};

use crate::config::{Config, DatabaseEngine};
use anyhow::Result;
use std::sync::Arc;
use sushi_core::SushiRepository;

/// Build the repository selected by `config.database`
pub async fn connect(config: &Config) -> Result<Arc<dyn SushiRepository>> {
    let repo: Arc<dyn SushiRepository> = match config.database {
        DatabaseEngine::Inmem => Arc::new(MemoryRepository::new()),
        DatabaseEngine::Cockroach => Arc::new(
            SqlRepository::connect(
                Dialect::Cockroach,
                &config.cockroach.url,
                &config.sql.table,
                config.sql.max_connections,
            )
            .await?,
        ),
        DatabaseEngine::Mysql => Arc::new(
            SqlRepository::connect(
                Dialect::MySql,
                &config.mysql.url,
                &config.sql.table,
                config.sql.max_connections,
            )
            .await?,
        ),
        DatabaseEngine::Sqlite => Arc::new(
            SqlRepository::connect(
                Dialect::Sqlite,
                &config.sqlite.url,
                &config.sql.table,
                config.sql.max_connections,
            )
            .await?,
        ),
        DatabaseEngine::Redis => Arc::new(
            RedisRepository::connect(&config.redis.url, &config.redis.key_prefix).await?,
        ),
    };

    Ok(repo)
}
