// Application Layer - Variation Engine and Data Lifecycle

pub mod facade;
pub mod provider;
pub mod selector;
pub mod structure;

// Re-exports
pub use facade::{DynamicSystem, DynamicSystemBuilder, EngineConfig};
pub use provider::{EntityProvider, ProviderPhase, ReadyWaiter, Subscription};
pub use selector::VariantSelector;
pub use structure::StructuralPerturbation;
