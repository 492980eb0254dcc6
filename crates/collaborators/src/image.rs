//! Image store trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

/// Trait for persisting uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores one local file and returns its public URL, or None if the
    /// upload failed.
    async fn store(&self, local_file: &str) -> Option<String>;
}

/// In-memory image store for testing and the default binary.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageStore {
    stored: Arc<AtomicU32>,
    fail_on_store: Arc<AtomicBool>,
}

impl InMemoryImageStore {
    /// Creates a new in-memory image store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to fail every upload.
    pub fn set_fail_on_store(&self, fail: bool) {
        self.fail_on_store.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of images stored so far.
    pub fn stored_count(&self) -> u32 {
        self.stored.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store(&self, local_file: &str) -> Option<String> {
        if self.fail_on_store.load(Ordering::SeqCst) {
            tracing::warn!(local_file, "image upload failed");
            return None;
        }
        let n = self.stored.fetch_add(1, Ordering::SeqCst) + 1;
        let name = local_file.rsplit('/').next().unwrap_or(local_file);
        Some(format!("memory://images/{n:04}-{name}"))
    }
}
