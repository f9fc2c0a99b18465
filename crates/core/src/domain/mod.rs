// Domain Layer - Pure business logic and entities

pub mod entity;
pub mod error;
pub mod hash;
pub mod markup;
pub mod seed;
pub mod variant;

// Re-exports
pub use entity::{Entity, EntityData, EntityFamily};
pub use error::DomainError;
pub use hash::fnv1a_64;
pub use markup::{Element, Node};
pub use seed::{derive_sub_seed, ResolvedSeeds, Seed, SubSeed, Subsystem, SEED_MAX, SEED_MIN};
pub use variant::{ClassKey, ComponentKey, IdKey, ListKey, TextKey, VariantKey, VariantTable};
