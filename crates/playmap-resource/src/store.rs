//! Ephemeral resource store.
//!
//! The store plays the part of the hosting runtime's object-URL table:
//! every `create` mints a fresh locator for some content, and the locator
//! stays resolvable until it is explicitly released.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, trace};
use uuid::Uuid;

use playmap_core::{MediaType, ResolverConfig};

use crate::error::{ResourceError, ResourceResult};
use crate::reference::{Resource, ResourceRef};

/// A shared resource store.
pub type SharedResourceStore = Arc<ResourceStore>;

/// Counters of a resource store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// References minted since creation.
    pub created: u64,
    /// References released since creation.
    pub released: u64,
    /// References currently resolvable.
    pub live: usize,
}

/// Table of live ephemeral resources.
pub struct ResourceStore {
    prefix: String,
    resources: DashMap<ResourceRef, Resource>,
    created: AtomicU64,
    released: AtomicU64,
}

impl ResourceStore {
    /// Create a store minting locators under the configured scheme and origin.
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            prefix: format!("{}:{}/", config.scheme, config.origin),
            resources: DashMap::new(),
            created: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Convert into a shared store.
    pub fn into_shared(self) -> SharedResourceStore {
        Arc::new(self)
    }

    /// Prefix shared by every locator this store mints.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create a resource and mint a fresh reference for it.
    pub fn create(&self, content: impl Into<Bytes>, media: MediaType) -> ResourceRef {
        let reference = ResourceRef::new(format!("{}{}", self.prefix, Uuid::new_v4()));
        let resource = Resource::new(content, media);

        trace!(
            reference = %reference,
            media = %media,
            bytes = resource.len(),
            "Created resource"
        );

        self.resources.insert(reference.clone(), resource);
        self.created.fetch_add(1, Ordering::Relaxed);
        reference
    }

    /// Look up a live resource.
    pub fn get(&self, reference: &ResourceRef) -> Option<Resource> {
        self.resources.get(reference).map(|r| r.value().clone())
    }

    /// Resolve a locator string.
    pub fn resolve(&self, locator: &str) -> ResourceResult<Resource> {
        if !locator.starts_with(&self.prefix) {
            return Err(ResourceError::ForeignLocator {
                locator: locator.to_string(),
                expected: self.prefix.clone(),
            });
        }
        self.get(&ResourceRef::from(locator))
            .ok_or_else(|| ResourceError::NotFound(locator.to_string()))
    }

    /// Check whether a reference is live.
    pub fn contains(&self, reference: &ResourceRef) -> bool {
        self.resources.contains_key(reference)
    }

    /// Release one reference. Returns false if it was not live.
    pub fn release(&self, reference: &ResourceRef) -> bool {
        let removed = self.resources.remove(reference).is_some();
        if removed {
            self.released.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Release a batch of references. Returns how many were live.
    pub fn release_all<'a>(&self, references: impl IntoIterator<Item = &'a ResourceRef>) -> usize {
        let count = references
            .into_iter()
            .filter(|reference| self.release(reference))
            .count();
        debug!(released = count, live = self.len(), "Released resources");
        count
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if no resource is live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Snapshot of the store counters.
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            created: self.created.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            live: self.len(),
        }
    }
}

impl Default for ResourceStore {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl std::fmt::Debug for ResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("prefix", &self.prefix)
            .field("live", &self.len())
            .finish()
    }
}
