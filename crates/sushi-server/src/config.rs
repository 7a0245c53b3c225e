//! Configuration loading
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional TOML
//! file, `SUSHIAPI_*` environment variables, then command-line flags.
//! Nested keys use `__` in the environment (`SUSHIAPI_REDIS__URL`).

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::{Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "sushi-api";

#[derive(Parser, Debug, Default)]
#[command(name = "sushi-api")]
#[command(author, version, about = "Sushi catalog HTTP API", long_about = None)]
pub struct Cli {
    /// Define host of the server
    #[arg(long)]
    pub host: Option<String>,

    /// Define port of the server
    #[arg(long)]
    pub port: Option<u16>,

    /// Define server identifier
    #[arg(long = "server-id")]
    pub server_id: Option<String>,

    /// Storage engine backing the catalog
    #[arg(long, value_enum)]
    pub database: Option<DatabaseEngine>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Load the sample catalog into the selected backend at startup
    #[arg(long)]
    pub seed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Inmem,
    Cockroach,
    Mysql,
    Sqlite,
    Redis,
}

impl DatabaseEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseEngine::Inmem => "inmem",
            DatabaseEngine::Cockroach => "cockroach",
            DatabaseEngine::Mysql => "mysql",
            DatabaseEngine::Sqlite => "sqlite",
            DatabaseEngine::Redis => "redis",
        }
    }
}

impl std::fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqlConfig {
    pub table: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrlConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Resolved to `<name>-<hostname>` when not configured
    pub server_id: Option<String>,
    pub name: String,
    pub database: DatabaseEngine,
    pub log_format: LogFormat,
    pub seed: bool,
    pub sql: SqlConfig,
    pub cockroach: UrlConfig,
    pub mysql: UrlConfig,
    pub sqlite: UrlConfig,
    pub redis: RedisConfig,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080_i64)?
            .set_default("name", "sushi-api")?
            .set_default("database", "inmem")?
            .set_default("log_format", "pretty")?
            .set_default("seed", false)?
            .set_default("sql.table", "sushis")?
            .set_default("sql.max_connections", 5_i64)?
            .set_default(
                "cockroach.url",
                "postgresql://root@localhost:26257/sushis?sslmode=disable",
            )?
            .set_default("mysql.url", "mysql://root@localhost:3306/sushis")?
            .set_default("sqlite.url", "sqlite://sushis.db?mode=rwc")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.key_prefix", "sushi:")?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(path.as_path())),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder
            .add_source(
                Environment::with_prefix("SUSHIAPI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server_host", cli.host.clone())?
            .set_override_option("server_port", cli.port.map(i64::from))?
            .set_override_option("server_id", cli.server_id.clone())?
            .set_override_option("database", cli.database.map(|d| d.as_str()))?;

        if cli.seed {
            builder = builder.set_override("seed", true)?;
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(config)
    }

    /// Server identifier attached to every request span
    pub fn server_id(&self) -> String {
        match &self.server_id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("{}-{}", self.name, whoami::hostname()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_file_values_are_loaded() {
        let file = write_config(
            r#"
server_port = 9090
database = "redis"

[redis]
url = "redis://cache:6379"
key_prefix = "catalog:"
"#,
        );

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.server_port, 9090);
        assert_eq!(config.database, DatabaseEngine::Redis);
        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.redis.key_prefix, "catalog:");
        assert_eq!(config.sql.table, "sushis");
    }

    #[test]
    fn test_flags_override_file() {
        let file = write_config(
            r#"
server_host = "127.0.0.1"
server_port = 9090
database = "mysql"
"#,
        );

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            host: Some("10.0.0.1".to_string()),
            port: Some(7070),
            server_id: Some("sushi-1".to_string()),
            database: Some(DatabaseEngine::Sqlite),
            seed: true,
            ..Default::default()
        };
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.bind_address(), "10.0.0.1:7070");
        assert_eq!(config.database, DatabaseEngine::Sqlite);
        assert_eq!(config.server_id(), "sushi-1");
        assert!(config.seed);
    }

    #[test]
    fn test_default_server_id_uses_name_and_hostname() {
        let file = write_config("name = \"catalog\"\n");

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = Config::load(&cli).unwrap();

        assert!(config.server_id().starts_with("catalog-"));
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/sushi-api.toml")),
            ..Default::default()
        };

        assert!(Config::load(&cli).is_err());
    }
}
