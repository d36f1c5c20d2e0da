//! Document store for users, interviews and feedback
//!
//! Backends implement `DocumentStore`, a plain get/set/list interface over
//! JSON documents grouped in collections. `Repository` layers the typed
//! queries the rest of the service needs on top of any backend.

mod file;
mod memory;
mod models;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use models::{CategoryScore, Feedback, Interview, UserProfile};

use crate::session::Credentials;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Interviews,
    Feedback,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Interviews => "interviews",
            Collection::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} '{id}' not found")]
    NotFound { collection: &'static str, id: String },

    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Raw JSON document storage
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or overwrite a document
    async fn set(&self, collection: Collection, id: &str, doc: Value) -> Result<(), StoreError>;

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;
}

/// Document ids become file names in the file backend
pub(crate) fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Typed access to the document store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,

    /// Serializes read-modify-write updates of user documents
    user_updates: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            user_updates: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        match self.store.get(collection, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    async fn set_typed<T: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        doc: &T,
    ) -> Result<(), StoreError> {
        self.store
            .set(collection, id, serde_json::to_value(doc)?)
            .await
    }

    async fn list_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        self.store
            .list(collection)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn get_user(&self, id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.get_typed(Collection::Users, id).await
    }

    pub async fn put_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.set_typed(Collection::Users, &user.id, user).await
    }

    /// Store voice credentials on a user; `None` fields are left untouched
    pub async fn update_credentials(
        &self,
        user_id: &str,
        credentials: Credentials,
    ) -> Result<UserProfile, StoreError> {
        let _guard = self.user_updates.lock().await;

        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: Collection::Users.as_str(),
                id: user_id.to_string(),
            })?;

        if let Some(token) = credentials.client_token {
            user.client_token = Some(token);
        }
        if let Some(assistant_id) = credentials.assistant_id {
            user.assistant_id = Some(assistant_id);
        }
        user.updated_at = Utc::now();

        self.put_user(&user).await?;
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Interviews
    // ------------------------------------------------------------------

    pub async fn get_interview(&self, id: &str) -> Result<Option<Interview>, StoreError> {
        self.get_typed(Collection::Interviews, id).await
    }

    pub async fn put_interview(&self, interview: &Interview) -> Result<(), StoreError> {
        self.set_typed(Collection::Interviews, &interview.id, interview)
            .await
    }

    /// A user's interviews, newest first
    pub async fn interviews_by_user(&self, user_id: &str) -> Result<Vec<Interview>, StoreError> {
        let mut interviews: Vec<Interview> = self
            .list_typed::<Interview>(Collection::Interviews)
            .await?
            .into_iter()
            .filter(|i| i.user_id == user_id)
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(interviews)
    }

    /// Finalized interviews created by other users, newest first
    pub async fn latest_interviews(
        &self,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<Interview>, StoreError> {
        let mut interviews: Vec<Interview> = self
            .list_typed::<Interview>(Collection::Interviews)
            .await?
            .into_iter()
            .filter(|i| i.finalized && i.user_id != exclude_user_id)
            .collect();
        interviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        interviews.truncate(limit);
        Ok(interviews)
    }

    // ------------------------------------------------------------------
    // Feedback
    // ------------------------------------------------------------------

    pub async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>, StoreError> {
        self.get_typed(Collection::Feedback, id).await
    }

    pub async fn put_feedback(&self, feedback: &Feedback) -> Result<(), StoreError> {
        self.set_typed(Collection::Feedback, &feedback.id, feedback)
            .await
    }

    /// Most recent feedback a user received for an interview
    pub async fn feedback_for_interview(
        &self,
        interview_id: &str,
        user_id: &str,
    ) -> Result<Option<Feedback>, StoreError> {
        let feedback = self
            .list_typed::<Feedback>(Collection::Feedback)
            .await?
            .into_iter()
            .filter(|f| f.interview_id == interview_id && f.user_id == user_id)
            .max_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(feedback)
    }
}
