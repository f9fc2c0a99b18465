// Fallback Catalog Port (Interface)

use crate::domain::{Entity, EntityFamily};

/// Bundled static datasets, always present and infallible.
///
/// Terminal step of every sourcing chain: when the remote paths fail or
/// are disabled, users see this content instead of an error.
pub trait FallbackCatalog: Send + Sync {
    fn dataset(&self, family: EntityFamily) -> Vec<Entity>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Fixed in-memory catalog for testing
    pub struct StaticCatalog {
        per_family: usize,
    }

    impl StaticCatalog {
        pub fn new(per_family: usize) -> Self {
            Self { per_family }
        }
    }

    impl FallbackCatalog for StaticCatalog {
        fn dataset(&self, family: EntityFamily) -> Vec<Entity> {
            (0..self.per_family)
                .map(|i| {
                    Entity::new(
                        family,
                        format!("{}{}", family.id_prefix(), 100 + i),
                        serde_json::json!({ "slot": i, "source": "static" }),
                    )
                })
                .collect()
        }
    }
}
