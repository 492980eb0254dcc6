//! Identity store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::Caller;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{CollaboratorError, Result};

/// Public profile of a requester, collector or admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

impl Profile {
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Trait for resolving callers and looking up profiles.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolves a bearer token to a typed caller.
    async fn verify_caller(&self, token: &str) -> Result<Caller>;

    /// Looks up the profile behind a caller identity.
    async fn profile(&self, caller: Caller) -> Result<Option<Profile>>;
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    tokens: HashMap<String, Caller>,
    profiles: HashMap<Caller, Profile>,
}

/// In-memory identity store keyed by opaque tokens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

impl InMemoryIdentityStore {
    /// Creates a new empty identity store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identity reachable through `token`.
    pub async fn register(&self, token: impl Into<String>, caller: Caller, profile: Option<Profile>) {
        let mut state = self.state.write().await;
        state.tokens.insert(token.into(), caller);
        if let Some(profile) = profile {
            state.profiles.insert(caller, profile);
        }
    }

    /// Returns the number of registered tokens.
    pub async fn token_count(&self) -> usize {
        self.state.read().await.tokens.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn verify_caller(&self, token: &str) -> Result<Caller> {
        let state = self.state.read().await;
        state
            .tokens
            .get(token)
            .copied()
            .ok_or_else(|| CollaboratorError::Unauthorized("unknown token".to_string()))
    }

    async fn profile(&self, caller: Caller) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&caller).cloned())
    }
}
