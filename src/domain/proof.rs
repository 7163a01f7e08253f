//! Proof Entity
//!
//! A photo submitted as proof that a chore was done. Append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, RecordId};

/// A submitted proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRecord {
    /// Unique identifier
    pub id: RecordId,
    /// Member the point goes to
    pub user_name: String,
    pub task: String,
    /// Public URL of the uploaded photo
    pub photo_url: String,
    /// Assigned by the backend
    pub created_at: DateTime<Utc>,
}

/// A proof that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProof {
    pub user_name: String,
    pub task: String,
    pub photo_url: String,
}

impl NewProof {
    pub fn new(user_name: &str, task: &str, photo_url: String) -> DomainResult<Self> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(DomainError::InvalidInput("proof has no member name".to_string()));
        }
        Ok(Self {
            user_name: user_name.to_string(),
            task: task.trim().to_string(),
            photo_url,
        })
    }
}
