//! Playmap Resource Management
//!
//! This crate provides the ephemeral resources behind an assembled
//! document:
//!
//! - [`ResourceStore`]: mints, resolves and releases resource references
//! - [`ModuleResolver`]: builds the [`ImportMap`] and [`ReverseRegistry`]
//!   for one run
//!
//! # Resource Lifetime
//!
//! Every assembly pass mints a fresh reference per file. References of a
//! previous pass are not invalidated by the next one; whoever owns the run
//! releases them explicitly once they are no longer needed:
//!
//! ```ignore
//! use playmap_resource::{ModuleResolver, ResourceStore};
//!
//! let store = ResourceStore::new(&config.resolver).into_shared();
//! let resolver = ModuleResolver::new(store.clone(), &config.resolver);
//!
//! let first = resolver.build(files.entries());
//! let second = resolver.build(files.entries());
//! store.release_all(&first.references);
//! ```

pub mod error;
pub mod reference;
pub mod resolver;
pub mod store;

// Re-export main types
pub use error::{ResourceError, ResourceResult};
pub use reference::{Resource, ResourceRef};
pub use resolver::{ImportMap, ModuleResolver, ResolvedModules, ReverseRegistry};
pub use store::{ResourceStats, ResourceStore, SharedResourceStore};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ResourceError, ResourceResult};
    pub use crate::reference::ResourceRef;
    pub use crate::resolver::{ImportMap, ModuleResolver, ReverseRegistry};
    pub use crate::store::{ResourceStore, SharedResourceStore};
}

#[cfg(test)]
mod tests {
    use playmap_core::ResolverConfig;

    use crate::prelude::*;

    #[test]
    fn test_release_previous_pass() {
        let config = ResolverConfig::default();
        let store = ResourceStore::new(&config).into_shared();
        let resolver = ModuleResolver::new(store.clone(), &config);

        let first = resolver.build([("a.js", "1"), ("b.js", "2")]);
        let second = resolver.build([("a.js", "1"), ("b.js", "2")]);
        assert_eq!(store.len(), 4);

        assert_eq!(store.release_all(&first.references), 2);
        assert_eq!(store.len(), 2);
        assert!(second.references.iter().all(|r| store.contains(r)));
    }
}
