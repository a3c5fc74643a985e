use std::collections::HashMap;

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_rusqlite::Connection;

use crate::chat::models::ConversationState;

/// Durable storage for per-conversation state, keyed by conversation id.
/// A load and a save bracket each exchange; serializing exchanges for the
/// same key is the dispatcher's responsibility, not the store's.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, Error>;
    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), Error>;
}

/// Sqlite-backed store. Each session is a single JSON blob; the schema
/// carries no structure beyond the key because the state shape belongs to
/// the application, not the store.
pub struct SqliteStore {
    db: Connection,
}

impl SqliteStore {
    pub async fn open(path: &str) -> Result<Self, Error> {
        let db = Connection::open(path).await?;
        Self::init(db).await
    }

    pub async fn open_in_memory() -> Result<Self, Error> {
        let db = Connection::open_in_memory().await?;
        Self::init(db).await
    }

    async fn init(db: Connection) -> Result<Self, Error> {
        db.call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS session (id TEXT PRIMARY KEY, data TEXT NOT NULL)",
                [],
            )?;
            Ok::<_, tokio_rusqlite::rusqlite::Error>(())
        })
        .await?;
        Ok(Self { db })
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, Error> {
        let key = key.to_owned();
        let row: Option<String> = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT data FROM session WHERE id = ?")?;
                let rows = stmt
                    .query_map([key], |row| row.get::<_, String>(0))?
                    .filter_map(Result::ok)
                    .collect::<Vec<String>>();
                Ok::<_, tokio_rusqlite::rusqlite::Error>(rows.into_iter().next())
            })
            .await?;

        match row {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), Error> {
        let key = key.to_owned();
        let data = serde_json::to_string(state)?;
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO session (id, data) VALUES (?, ?)
                     ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                    [key, data],
                )?;
                Ok::<_, tokio_rusqlite::rusqlite::Error>(())
            })
            .await?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, ConversationState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<ConversationState>, Error> {
        Ok(self.sessions.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, state: &ConversationState) -> Result<(), Error> {
        self.sessions
            .lock()
            .await
            .insert(key.to_owned(), state.clone());
        Ok(())
    }
}
