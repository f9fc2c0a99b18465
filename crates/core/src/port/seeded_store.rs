// Seeded Selection Store Port (Interface)
// Abstraction over the DB-backed seeded-selection endpoint

use crate::domain::{Entity, EntityFamily};
use async_trait::async_trait;
use thiserror::Error;

/// Sourcing failures from remote collaborators.
///
/// Recovered inside the sourcing chain by advancing to the next step;
/// never surfaced to the UI layer.
#[derive(Error, Debug)]
pub enum SourcingError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timed out after {0}ms")]
    Timeout(u64),

    #[error("Malformed response: {0}")]
    Parse(String),

    #[error("Empty result set")]
    Empty,
}

/// Store port for deterministic seed-keyed entity subsets.
#[async_trait]
pub trait SeededStore: Send + Sync {
    /// Fetch the selection for `(family, seed_value)`, at most `limit` rows.
    ///
    /// The same `(family, seed_value)` must yield the same subset on the
    /// store side; the engine treats the call as a pure lookup.
    async fn fetch_selection(
        &self,
        family: EntityFamily,
        seed_value: u64,
        limit: usize,
    ) -> Result<Vec<Entity>, SourcingError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Mock store behavior
    #[derive(Debug, Clone)]
    pub enum MockStoreBehavior {
        /// Return one entity per requested slot, ids derived from the seed
        Selection,
        /// Return an empty set
        Empty,
        /// Fail with an HTTP error
        Fail(String),
        /// Sleep past any reasonable step timeout
        Hang(Duration),
    }

    /// Mock SeededStore for testing (counts fetches)
    pub struct MockSeededStore {
        behavior: Arc<Mutex<MockStoreBehavior>>,
        fetch_count: Arc<Mutex<usize>>,
    }

    impl MockSeededStore {
        pub fn new(behavior: MockStoreBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                fetch_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_selection() -> Self {
            Self::new(MockStoreBehavior::Selection)
        }

        pub fn new_empty() -> Self {
            Self::new(MockStoreBehavior::Empty)
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self::new(MockStoreBehavior::Fail(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockStoreBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn fetch_count(&self) -> usize {
            *self.fetch_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl SeededStore for MockSeededStore {
        async fn fetch_selection(
            &self,
            family: EntityFamily,
            seed_value: u64,
            limit: usize,
        ) -> Result<Vec<Entity>, SourcingError> {
            *self.fetch_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockStoreBehavior::Selection => Ok((0..limit)
                    .map(|i| {
                        Entity::new(
                            family,
                            format!("{}-{}", seed_value, i),
                            serde_json::json!({ "slot": i, "seed": seed_value }),
                        )
                    })
                    .collect()),
                MockStoreBehavior::Empty => Ok(Vec::new()),
                MockStoreBehavior::Fail(msg) => Err(SourcingError::Http(msg)),
                MockStoreBehavior::Hang(duration) => {
                    tokio::time::sleep(duration).await;
                    Ok(Vec::new())
                }
            }
        }
    }
}
