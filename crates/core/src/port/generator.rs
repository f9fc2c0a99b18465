// Generation Service Port (Interface)
// Abstraction over the AI dataset-generation endpoint

use crate::domain::{Entity, EntityFamily};
use crate::port::seeded_store::SourcingError;
use async_trait::async_trait;

/// Generator port for freshly generated datasets.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Request `count` generated records for the family.
    async fn generate(
        &self,
        family: EntityFamily,
        count: usize,
    ) -> Result<Vec<Entity>, SourcingError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock generator behavior
    #[derive(Debug, Clone)]
    pub enum MockGeneratorBehavior {
        /// Produce `count` synthetic records
        Generate,
        /// Return an empty set
        Empty,
        /// Fail with a parse error
        Fail(String),
    }

    /// Mock Generator for testing (counts calls)
    pub struct MockGenerator {
        behavior: Arc<Mutex<MockGeneratorBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockGenerator {
        pub fn new(behavior: MockGeneratorBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_generating() -> Self {
            Self::new(MockGeneratorBehavior::Generate)
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self::new(MockGeneratorBehavior::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Generator for MockGenerator {
        async fn generate(
            &self,
            family: EntityFamily,
            count: usize,
        ) -> Result<Vec<Entity>, SourcingError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockGeneratorBehavior::Generate => Ok((0..count)
                    .map(|i| {
                        Entity::new(
                            family,
                            format!("gen-{}-{}", family.as_str(), i),
                            serde_json::json!({ "generated": true, "slot": i }),
                        )
                    })
                    .collect()),
                MockGeneratorBehavior::Empty => Ok(Vec::new()),
                MockGeneratorBehavior::Fail(msg) => Err(SourcingError::Parse(msg)),
            }
        }
    }
}
