use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gemini_chat_core::TurnStore;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Error type for session store operations
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Session not found
    #[error("Session not found: {0}")]
    NotFound(String),
    /// Error occurred during a store operation
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// One chat session and the turns it has accumulated
#[derive(Debug)]
pub struct ChatSession {
    /// Unique session identifier
    pub id: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Last time a turn was appended
    pub updated_at: DateTime<Utc>,
    /// Conversation history, owned by this session only
    pub turns: TurnStore,
}

impl ChatSession {
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            turns: TurnStore::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A session shared between the registry and in-flight requests.
/// Exchanges lock it for their whole duration, so one session never runs
/// two exchanges at once.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

/// Trait defining the interface for session stores
#[async_trait]
pub trait SessionStore: Send + Sync + Debug {
    /// Create a new empty session with a fresh id
    async fn create_session(&self) -> Result<SessionHandle, SessionStoreError>;

    /// Get a session by ID
    async fn get_session(&self, id: &str) -> Result<SessionHandle, SessionStoreError>;

    /// Destroy a session and its turns
    async fn delete_session(&self, id: &str) -> Result<(), SessionStoreError>;

    /// List the ids of all live sessions
    async fn list_sessions(&self) -> Result<Vec<String>, SessionStoreError>;
}

/// Type alias for Arc-wrapped SessionStore trait objects
pub type SessionStoreRef = Arc<dyn SessionStore>;

/// In-memory implementation of SessionStore
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self) -> Result<SessionHandle, SessionStoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let handle = Arc::new(Mutex::new(ChatSession::new(id.clone())));

        let mut sessions = self.sessions.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        sessions.insert(id.clone(), handle.clone());
        debug!("Created session: {}", id);

        Ok(handle)
    }

    async fn get_session(&self, id: &str) -> Result<SessionHandle, SessionStoreError> {
        let sessions = self.sessions.read().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;

        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(id.to_string()))
    }

    async fn delete_session(&self, id: &str) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;

        if sessions.remove(id).is_none() {
            return Err(SessionStoreError::NotFound(id.to_string()));
        }

        debug!("Deleted session: {}", id);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionStoreError> {
        let sessions = self.sessions.read().map_err(|e| {
            SessionStoreError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
