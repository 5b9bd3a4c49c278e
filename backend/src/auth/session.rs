//! Session records and the stores that hold them
//!
//! Sessions are written once on login and expire on their own; there is no
//! invalidation path. Records are stored as JSON under `sess:<id>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Key prefix for session records
pub const SESSION_KEY_PREFIX: &str = "sess:";

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session signing failed: {0}")]
    Signing(String),
}

impl SessionError {
    /// Whether the failure means the store could not be reached
    pub fn is_unavailable(&self) -> bool {
        match self {
            SessionError::Redis(e) => {
                e.is_io_error()
                    || e.is_connection_dropped()
                    || e.is_connection_refusal()
                    || e.is_timeout()
            }
            _ => false,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Server-side state of a logged-in client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub username: String,
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn authenticated(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            authenticated: true,
            created_at: Utc::now(),
        }
    }
}

/// Generate a fresh opaque session id
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn session_key(id: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, id)
}

/// TTL-bound key-value store for session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `record` under `id`, expiring after `ttl`
    async fn save(&self, id: &str, record: &SessionRecord, ttl: Duration) -> SessionResult<()>;

    /// Fetch a live record; expired or unknown ids yield `None`
    async fn load(&self, id: &str) -> SessionResult<Option<SessionRecord>>;

    /// Check that the store answers
    async fn ping(&self) -> SessionResult<()>;
}

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Open a managed connection to the given url
    pub async fn connect(url: &str) -> SessionResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, id: &str, record: &SessionRecord, ttl: Duration) -> SessionResult<()> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(session_key(id))
            .arg(payload)
            .arg("PX")
            .arg(ttl.as_millis().max(1) as u64)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn load(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await?;

        payload
            .map(|p| serde_json::from_str(&p))
            .transpose()
            .map_err(SessionError::from)
    }

    async fn ping(&self) -> SessionResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

/// Session store held in process memory
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, (SessionRecord, Instant)>>,
}

impl MemorySessionStore {
    /// Number of stored records, expired ones included until the next write
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, id: &str, record: &SessionRecord, ttl: Duration) -> SessionResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        // Sessions are never deleted explicitly, so expired ones go here
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(session_key(id), (record.clone(), now + ttl));
        Ok(())
    }

    async fn load(&self, id: &str) -> SessionResult<Option<SessionRecord>> {
        let key = session_key(id);
        let mut entries = self.entries.lock().await;
        match entries.get(&key) {
            Some((record, expires_at)) if *expires_at > Instant::now() => Ok(Some(record.clone())),
            Some(_) => {
                entries.remove(&key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn ping(&self) -> SessionResult<()> {
        Ok(())
    }
}
