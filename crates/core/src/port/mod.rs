// Port Layer - Interfaces for external dependencies

pub mod catalog;
pub mod generator;
pub mod seeded_store;

// Re-exports
pub use catalog::FallbackCatalog;
pub use generator::Generator;
pub use seeded_store::{SeededStore, SourcingError};
