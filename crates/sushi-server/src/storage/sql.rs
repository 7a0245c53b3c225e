//! Relational repository over sqlx's `Any` driver
//!
//! One implementation serves every SQL engine; the `Dialect` decides
//! placeholder style and DDL. Timestamps are stored as epoch milliseconds so
//! a single row type decodes on all of them, with 0 standing for "never".
//! They are never NULL: the `Any` driver can't decode a NULL integer on SQLite.

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use sushi_core::{Result, Sushi, SushiError, SushiRepository};
use tracing::{debug, info};

const COLUMNS: &str = "id, image_number, name, ingredients, created_at, updated_at";

// Rows written before the columns became NOT NULL may still hold NULLs
const SELECT_COLUMNS: &str = "id, image_number, name, ingredients, \
     COALESCE(created_at, 0) AS created_at, COALESCE(updated_at, 0) AS updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// CockroachDB, spoken to over the PostgreSQL wire protocol
    Cockroach,
    MySql,
    Sqlite,
}

impl Dialect {
    fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Cockroach => format!("${}", n),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    fn placeholders(&self, range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|n| self.placeholder(n)).collect()
    }

    // MySQL can't index an unbounded TEXT column
    fn id_column_type(&self) -> &'static str {
        match self {
            Dialect::MySql => "VARCHAR(255)",
            Dialect::Cockroach | Dialect::Sqlite => "TEXT",
        }
    }
}

/// Statements generated once per repository for its dialect and table
#[derive(Debug, Clone)]
struct Statements {
    create_table: String,
    insert: String,
    select_all: String,
    select_one: String,
    update: String,
    delete: String,
}

impl Statements {
    fn new(dialect: Dialect, table: &str) -> Self {
        let p = |n| dialect.placeholder(n);
        let select_all = format!("SELECT {} FROM {}", SELECT_COLUMNS, table);

        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id {} PRIMARY KEY, \
                 image_number TEXT NOT NULL, \
                 name TEXT NOT NULL, \
                 ingredients TEXT NOT NULL, \
                 created_at BIGINT NOT NULL DEFAULT 0, \
                 updated_at BIGINT NOT NULL DEFAULT 0)",
                table,
                dialect.id_column_type()
            ),
            insert: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                COLUMNS,
                dialect.placeholders(1..=6).join(", ")
            ),
            select_one: format!("{} WHERE id = {}", select_all, p(1)),
            select_all,
            update: format!(
                "UPDATE {} SET image_number = {}, name = {}, ingredients = {}, updated_at = {} WHERE id = {}",
                table,
                p(1),
                p(2),
                p(3),
                p(4),
                p(5)
            ),
            delete: format!("DELETE FROM {} WHERE id = {}", table, p(1)),
        }
    }
}

pub struct SqlRepository {
    pool: AnyPool,
    statements: Statements,
}

impl SqlRepository {
    /// Connect, then make sure the table exists.
    pub async fn connect(
        dialect: Dialect,
        url: &str,
        table: &str,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!("Invalid table name: {:?}", table);
        }

        sqlx::any::install_default_drivers();

        info!("Connecting to {:?} database...", dialect);
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .with_context(|| format!("Failed to connect to {:?} database", dialect))?;

        let repo = Self {
            pool,
            statements: Statements::new(dialect, table),
        };
        repo.ensure_table()
            .await
            .with_context(|| format!("Failed to create table {}", table))?;

        info!("{:?} database ready, table={}", dialect, table);
        Ok(repo)
    }

    async fn ensure_table(&self) -> Result<()> {
        sqlx::query(&self.statements.create_table)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

#[async_trait]
impl SushiRepository for SqlRepository {
    async fn create_sushi(&self, sushi: &Sushi) -> Result<()> {
        sqlx::query(&self.statements.insert)
            .bind(&sushi.id)
            .bind(&sushi.image_number)
            .bind(&sushi.name)
            .bind(serde_json::to_string(&sushi.ingredients)?)
            .bind(Utc::now().timestamp_millis())
            .bind(0_i64)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    SushiError::AlreadyExists(sushi.id.clone())
                }
                other => database_error(other),
            })?;

        Ok(())
    }

    async fn get_sushis(&self) -> Result<Vec<Sushi>> {
        let rows: Vec<SushiRow> = sqlx::query_as(&self.statements.select_all)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        // First undecodable row aborts the listing
        rows.into_iter().map(Sushi::try_from).collect()
    }

    async fn get_sushi_by_id(&self, id: &str) -> Result<Sushi> {
        let row: Option<SushiRow> = sqlx::query_as(&self.statements.select_one)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.ok_or_else(|| SushiError::NotFound(id.to_string()))?
            .try_into()
    }

    async fn update_sushi(&self, id: &str, sushi: &Sushi) -> Result<()> {
        let result = sqlx::query(&self.statements.update)
            .bind(&sushi.image_number)
            .bind(&sushi.name)
            .bind(serde_json::to_string(&sushi.ingredients)?)
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(SushiError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete_sushi(&self, id: &str) -> Result<()> {
        let result = sqlx::query(&self.statements.delete)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            debug!("Delete of unknown sushi {} ignored", id);
        }

        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> SushiError {
    SushiError::Database(e.to_string())
}

fn timestamp(millis: i64) -> Option<DateTime<Utc>> {
    if millis == 0 {
        return None;
    }
    DateTime::from_timestamp_millis(millis)
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct SushiRow {
    id: String,
    image_number: String,
    name: String,
    ingredients: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SushiRow> for Sushi {
    type Error = SushiError;

    fn try_from(r: SushiRow) -> Result<Self> {
        let ingredients = serde_json::from_str(&r.ingredients).map_err(|e| {
            SushiError::Serialization(format!("ingredients of sushi {}: {}", r.id, e))
        })?;

        Ok(Sushi {
            id: r.id,
            image_number: r.image_number,
            name: r.name,
            ingredients,
            created_at: timestamp(r.created_at),
            updated_at: timestamp(r.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;

    async fn sqlite_repository() -> SqlRepository {
        // One connection: every in-memory SQLite connection is its own database
        SqlRepository::connect(Dialect::Sqlite, "sqlite::memory:", "sushis", 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_contract_on_sqlite() {
        let repo = sqlite_repository().await;
        contract::run_all(&repo).await;
    }

    #[tokio::test]
    async fn test_ensure_table_is_idempotent() {
        let repo = sqlite_repository().await;
        repo.ensure_table().await.unwrap();
        repo.ensure_table().await.unwrap();
    }

    #[tokio::test]
    async fn test_timestamps_are_tracked() {
        let repo = sqlite_repository().await;
        repo.create_sushi(&Sushi::new("T1", "1", "Tiger Roll", vec![]))
            .await
            .unwrap();

        let created = repo.get_sushi_by_id("T1").await.unwrap();
        let created_at = created.created_at.expect("created_at set on insert");
        assert!(created.updated_at.is_none());

        repo.update_sushi("T1", &Sushi::new("T1", "2", "Crunch Roll", vec![]))
            .await
            .unwrap();

        let updated = repo.get_sushi_by_id("T1").await.unwrap();
        assert_eq!(updated.created_at, Some(created_at));
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.name, "Crunch Roll");
    }

    #[tokio::test]
    async fn test_never_updated_row_reads_back() {
        let repo = sqlite_repository().await;
        let sushi = Sushi::new("A1", "1", "California Roll", vec!["Crab".into()]);
        repo.create_sushi(&sushi).await.unwrap();

        let fetched = repo.get_sushi_by_id("A1").await.unwrap();
        assert!(fetched.same_content(&sushi));
        assert!(fetched.updated_at.is_none());

        let listed = repo.get_sushis().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].same_content(&sushi));
    }

    #[tokio::test]
    async fn test_null_timestamps_in_older_tables_read_as_none() {
        let repo = sqlite_repository().await;
        sqlx::query(
            "CREATE TABLE old_sushis (id TEXT PRIMARY KEY, image_number TEXT NOT NULL, \
             name TEXT NOT NULL, ingredients TEXT NOT NULL, created_at BIGINT, updated_at BIGINT)",
        )
        .execute(&repo.pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO old_sushis VALUES ('OLD1', '2', 'Tiger Roll', '[]', NULL, NULL)",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let old = SqlRepository {
            pool: repo.pool.clone(),
            statements: Statements::new(Dialect::Sqlite, "old_sushis"),
        };
        let sushi = old.get_sushi_by_id("OLD1").await.unwrap();
        assert_eq!(sushi.name, "Tiger Roll");
        assert!(sushi.created_at.is_none());
        assert!(sushi.updated_at.is_none());
        assert_eq!(old.get_sushis().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_listing_aborts_on_corrupt_row() {
        let repo = sqlite_repository().await;
        repo.create_sushi(&Sushi::new("OK1", "1", "California Roll", vec![]))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO sushis (id, image_number, name, ingredients) VALUES ('BAD1', '', '', 'not-json')",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let err = repo.get_sushis().await.unwrap_err();
        assert!(matches!(err, SushiError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_invalid_table_name_is_rejected() {
        let result =
            SqlRepository::connect(Dialect::Sqlite, "sqlite::memory:", "sushis; DROP", 1).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_cockroach_statements_use_numbered_placeholders() {
        let statements = Statements::new(Dialect::Cockroach, "sushis");

        assert_eq!(
            statements.insert,
            "INSERT INTO sushis (id, image_number, name, ingredients, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)"
        );
        assert_eq!(
            statements.update,
            "UPDATE sushis SET image_number = $1, name = $2, ingredients = $3, updated_at = $4 WHERE id = $5"
        );
        assert!(statements.create_table.contains("id TEXT PRIMARY KEY"));
    }

    #[test]
    fn test_mysql_statements_use_question_marks() {
        let statements = Statements::new(Dialect::MySql, "catalog");

        assert_eq!(
            statements.select_one,
            "SELECT id, image_number, name, ingredients, \
             COALESCE(created_at, 0) AS created_at, COALESCE(updated_at, 0) AS updated_at \
             FROM catalog WHERE id = ?"
        );
        assert_eq!(statements.delete, "DELETE FROM catalog WHERE id = ?");
        assert!(statements.create_table.contains("id VARCHAR(255) PRIMARY KEY"));
    }
}
