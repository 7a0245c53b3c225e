//! Redis repository: one JSON blob per sushi

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisError, Script, Value};
use serde::{Deserialize, Serialize};
use sushi_core::{Result, Sushi, SushiError, SushiRepository};
use tracing::{debug, info};

/// Blob stored under each key: the public record plus its timestamps
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSushi {
    #[serde(flatten)]
    sushi: Sushi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl StoredSushi {
    fn encode(sushi: &Sushi) -> Result<String> {
        let stored = StoredSushi {
            created_at: sushi.created_at,
            updated_at: sushi.updated_at,
            sushi: sushi.clone(),
        };
        Ok(serde_json::to_string(&stored)?)
    }

    fn decode(blob: &str) -> Result<Sushi> {
        let stored: StoredSushi = serde_json::from_str(blob)?;
        Ok(Sushi {
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            ..stored.sushi
        })
    }
}

/// Overwrites `KEYS[1]` with `ARGV[1]` only if the key exists, keeping the
/// stored `createdAt`. Replies 1 when written, 0 when the key is absent.
const UPDATE_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
    return 0
end
local replacement = cjson.decode(ARGV[1])
local ok, stored = pcall(cjson.decode, current)
if ok and type(stored) == 'table' then
    replacement['createdAt'] = stored['createdAt']
end
redis.call('SET', KEYS[1], cjson.encode(replacement))
return 1
"#;

/// Repository over a multiplexed Redis connection
///
/// Create is a `SET NX` and update runs as a script, so neither needs a
/// separate existence check. Listing is a `KEYS` scan followed by `MGET` and
/// is not a snapshot: keys removed between the two calls are skipped.
#[derive(Clone)]
pub struct RedisRepository {
    conn: ConnectionManager,
    key_prefix: String,
    update_script: Script,
}

impl RedisRepository {
    pub async fn connect(url: &str, key_prefix: &str) -> anyhow::Result<Self> {
        info!("Connecting to Redis...");
        let client = redis::Client::open(url).context("Invalid Redis URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        info!("Redis connection established, key_prefix={}", key_prefix);

        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
            update_script: Script::new(UPDATE_SCRIPT),
        })
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    fn pattern(&self) -> String {
        format!("{}*", self.key_prefix)
    }

    /// `SET key value NX`; false when the key was already taken
    async fn set_if_absent(&self, key: &str, blob: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let reply: Value = redis::cmd("SET")
            .arg(key)
            .arg(blob)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;
        set_applied(&reply)
    }
}

/// A conditional `SET` replies `OK` when it wrote and nil when it didn't
fn set_applied(reply: &Value) -> Result<bool> {
    let reply: Option<String> = redis::from_redis_value(reply).map_err(redis_error)?;
    Ok(reply.is_some())
}

fn created_or_taken(id: &str, written: bool) -> Result<()> {
    if written {
        Ok(())
    } else {
        Err(SushiError::AlreadyExists(id.to_string()))
    }
}

fn updated_or_missing(id: &str, written: bool) -> Result<()> {
    if written {
        Ok(())
    } else {
        Err(SushiError::NotFound(id.to_string()))
    }
}

/// Decode an `MGET` reply; nil entries are keys deleted since the `KEYS` scan
fn decode_listing(blobs: Vec<Option<String>>) -> Result<Vec<Sushi>> {
    let missing = blobs.iter().filter(|b| b.is_none()).count();
    if missing > 0 {
        debug!("{} sushi keys vanished between KEYS and MGET", missing);
    }

    blobs
        .into_iter()
        .flatten()
        .map(|blob| StoredSushi::decode(&blob))
        .collect()
}

#[async_trait]
impl SushiRepository for RedisRepository {
    async fn create_sushi(&self, sushi: &Sushi) -> Result<()> {
        let stored = Sushi {
            created_at: Some(Utc::now()),
            updated_at: None,
            ..sushi.clone()
        };
        let blob = StoredSushi::encode(&stored)?;

        let written = self.set_if_absent(&self.key(&sushi.id), &blob).await?;
        created_or_taken(&sushi.id, written)
    }

    async fn get_sushis(&self) -> Result<Vec<Sushi>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(self.pattern()).await.map_err(redis_error)?;
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let blobs: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        decode_listing(blobs)
    }

    async fn get_sushi_by_id(&self, id: &str) -> Result<Sushi> {
        let mut conn = self.conn.clone();
        let blob: Option<String> = conn.get(self.key(id)).await.map_err(redis_error)?;

        match blob {
            Some(blob) if !blob.is_empty() => StoredSushi::decode(&blob),
            _ => Err(SushiError::NotFound(id.to_string())),
        }
    }

    async fn update_sushi(&self, id: &str, sushi: &Sushi) -> Result<()> {
        let stored = Sushi {
            id: id.to_string(),
            created_at: None,
            updated_at: Some(Utc::now()),
            ..sushi.clone()
        };
        let blob = StoredSushi::encode(&stored)?;

        let mut conn = self.conn.clone();
        let written: i64 = self
            .update_script
            .key(self.key(id))
            .arg(blob)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        updated_or_missing(id, written == 1)
    }

    async fn delete_sushi(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(self.key(id)).await.map_err(redis_error)?;
        if removed == 0 {
            debug!("Delete of unknown sushi {} ignored", id);
        }
        Ok(())
    }
}

fn redis_error(e: RedisError) -> SushiError {
    SushiError::Redis(e.to_string())
}
