use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::models::Event;

/// An event owned by the registry
///
/// Every mutation of an event goes through this mutex, so requests against
/// the same code are serialized while other events stay available.
pub type SharedEvent = Arc<Mutex<Event>>;

/// Errors that can occur with registry operations
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("Event code already in use: {0}")]
    CodeCollision(String),

    #[error("Share id already in use: {0}")]
    ShareIdCollision(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("No free event code found after {0} attempts")]
    CodeSpaceExhausted(u32),
}

/// Storage for live events, keyed by organizer code
#[async_trait]
pub trait Registry: Send + Sync {
    /// Store a new event. Rejects a code or share id that is already taken.
    async fn insert(&self, event: Event) -> Result<SharedEvent, RegistryError>;

    async fn lookup(&self, code: &str) -> Result<SharedEvent, RegistryError>;

    async fn lookup_by_share_id(&self, share_id: &str) -> Result<SharedEvent, RegistryError>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[derive(Default)]
struct RegistryIndex {
    by_code: HashMap<String, SharedEvent>,
    code_by_share_id: HashMap<String, String>,
}

/// Process-local registry; contents are lost on restart
#[derive(Default)]
pub struct InMemoryRegistry {
    index: RwLock<RegistryIndex>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn insert(&self, event: Event) -> Result<SharedEvent, RegistryError> {
        let code = event.code().to_string();
        let share_id = event.share_id().to_string();

        let mut index = self.index.write().await;
        if index.by_code.contains_key(&code) {
            return Err(RegistryError::CodeCollision(code));
        }
        if share_id == code || index.code_by_share_id.contains_key(&share_id) {
            return Err(RegistryError::ShareIdCollision(share_id));
        }

        let shared = Arc::new(Mutex::new(event));
        index.by_code.insert(code.clone(), shared.clone());
        index.code_by_share_id.insert(share_id, code);

        Ok(shared)
    }

    async fn lookup(&self, code: &str) -> Result<SharedEvent, RegistryError> {
        self.index
            .read()
            .await
            .by_code
            .get(code)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(code.to_string()))
    }

    async fn lookup_by_share_id(&self, share_id: &str) -> Result<SharedEvent, RegistryError> {
        let index = self.index.read().await;
        index
            .code_by_share_id
            .get(share_id)
            .and_then(|code| index.by_code.get(code))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(share_id.to_string()))
    }

    async fn len(&self) -> usize {
        self.index.read().await.by_code.len()
    }
}

/// Insert `event`, drawing new identifiers on collision
///
/// Gives up with `CodeSpaceExhausted` after `max_attempts` rejected inserts.
pub async fn register_event(
    registry: &dyn Registry,
    mut event: Event,
    max_attempts: u32,
) -> Result<SharedEvent, RegistryError> {
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match registry.insert(event.clone()).await {
            Ok(shared) => {
                tracing::debug!("Registered event {} on attempt {}", event.share_id(), attempt);
                return Ok(shared);
            }
            Err(RegistryError::CodeCollision(_)) => {
                tracing::warn!("Event code collision on attempt {}, re-rolling", attempt);
                event.reroll_code();
            }
            Err(RegistryError::ShareIdCollision(_)) => {
                tracing::warn!("Share id collision on attempt {}, re-rolling", attempt);
                event.reroll_share_id();
            }
            Err(e) => return Err(e),
        }
    }

    tracing::error!("Could not register event after {} attempts", max_attempts);
    Err(RegistryError::CodeSpaceExhausted(max_attempts))
}
