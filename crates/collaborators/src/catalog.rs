//! Scrap catalog lookup.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Money, ScrapTypeId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;

/// Catalog entry for one scrap type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapInfo {
    pub name: String,
    pub price_per_kg: Money,
}

impl ScrapInfo {
    pub fn new(name: impl Into<String>, price_per_kg: Money) -> Self {
        Self {
            name: name.into(),
            price_per_kg,
        }
    }
}

/// Read-only view of the scrap catalog.
#[async_trait]
pub trait ScrapCatalog: Send + Sync {
    async fn scrap(&self, id: ScrapTypeId) -> Result<Option<ScrapInfo>>;
}

/// In-memory scrap catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScrapCatalog {
    entries: Arc<RwLock<HashMap<ScrapTypeId, ScrapInfo>>>,
}

impl InMemoryScrapCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog entry.
    pub async fn insert(&self, id: ScrapTypeId, info: ScrapInfo) {
        self.entries.write().await.insert(id, info);
    }
}

#[async_trait]
impl ScrapCatalog for InMemoryScrapCatalog {
    async fn scrap(&self, id: ScrapTypeId) -> Result<Option<ScrapInfo>> {
        Ok(self.entries.read().await.get(&id).cloned())
    }
}
