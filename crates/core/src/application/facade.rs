//! Dynamic System Facade - one object handed to UI code.
//!
//! Built explicitly at the application root and passed down; the engine
//! reads no globals, so every instance is independently testable. One
//! provider exists per entity family; structure and variant selection
//! share the resolved seeds.

use crate::application::provider::{
    EntityProvider, ProviderConfig, ReadyWaiter, Subscription,
};
use crate::application::selector::VariantSelector;
use crate::application::structure::StructuralPerturbation;
use crate::domain::{Entity, EntityFamily, ResolvedSeeds, Seed};
use crate::error::{AppError, Result};
use crate::port::{FallbackCatalog, Generator, SeededStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Engine-wide configuration, supplied by the composition root.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub variation_enabled: bool,
    pub seeded_store_enabled: bool,
    pub generation_enabled: bool,
    pub step_timeout: Duration,
    pub target_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            variation_enabled: true,
            seeded_store_enabled: false,
            generation_enabled: false,
            step_timeout: crate::application::provider::constants::DEFAULT_STEP_TIMEOUT,
            target_count: crate::application::provider::constants::DEFAULT_TARGET_COUNT,
        }
    }
}

impl EngineConfig {
    fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            seeded_store_enabled: self.seeded_store_enabled,
            generation_enabled: self.generation_enabled,
            step_timeout: self.step_timeout,
            target_count: self.target_count,
        }
    }
}

/// Composed variation engine: seeds, structural perturbation, variant
/// selection and one data provider per entity family.
pub struct DynamicSystem {
    seeds: ResolvedSeeds,
    structure: StructuralPerturbation,
    variants: VariantSelector,
    providers: [Arc<EntityProvider>; 4],
}

impl DynamicSystem {
    pub fn builder() -> DynamicSystemBuilder {
        DynamicSystemBuilder::default()
    }

    pub fn seed(&self) -> Seed {
        self.seeds.base
    }

    pub fn seeds(&self) -> &ResolvedSeeds {
        &self.seeds
    }

    pub fn structure(&self) -> &StructuralPerturbation {
        &self.structure
    }

    pub fn variants(&self) -> &VariantSelector {
        &self.variants
    }

    pub fn provider(&self, family: EntityFamily) -> &Arc<EntityProvider> {
        &self.providers[family.index()]
    }

    /// Kick off the first load on every provider.
    pub fn initialize_all(&self) -> Vec<ReadyWaiter> {
        self.providers.iter().map(|p| p.initialize()).collect()
    }

    /// Await readiness of every provider.
    pub async fn when_ready_all(&self) {
        for provider in &self.providers {
            provider.when_ready().await;
        }
    }

    pub fn entities(&self, family: EntityFamily) -> Arc<Vec<Entity>> {
        self.provider(family).entities()
    }

    pub fn get_by_id(&self, family: EntityFamily, id: &str) -> Option<Entity> {
        self.provider(family).get_by_id(id)
    }

    pub fn subscribe(
        &self,
        family: EntityFamily,
        callback: impl Fn(&[Entity]) + Send + Sync + 'static,
    ) -> Subscription {
        self.provider(family).subscribe(callback)
    }

    /// Reload every provider under a new base seed (in-page navigation).
    pub fn reload_all(&self, seed: Seed) -> Vec<ReadyWaiter> {
        self.providers
            .iter()
            .map(|p| p.reload(Some(seed)))
            .collect()
    }

    /// Defined teardown: shut every provider down.
    pub fn shutdown(&self) {
        for provider in &self.providers {
            provider.shutdown();
        }
        info!(seed = %self.seeds.base, "Dynamic system shut down");
    }
}

/// Builder wiring raw seed input, configuration and port implementations
/// into a [`DynamicSystem`].
#[derive(Default)]
pub struct DynamicSystemBuilder {
    raw_seed: Option<String>,
    raw_structure_seed: Option<String>,
    config: EngineConfig,
    store: Option<Arc<dyn SeededStore>>,
    generator: Option<Arc<dyn Generator>>,
    catalog: Option<Arc<dyn FallbackCatalog>>,
}

impl DynamicSystemBuilder {
    /// Raw `seed` query value (missing or invalid clamps to canonical).
    pub fn seed_param(mut self, raw: Option<&str>) -> Self {
        self.raw_seed = raw.map(str::to_string);
        self
    }

    /// Alternate raw parameter overriding only the structure schedule.
    pub fn structure_param(mut self, raw: Option<&str>) -> Self {
        self.raw_structure_seed = raw.map(str::to_string);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seeded_store(mut self, store: Arc<dyn SeededStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn FallbackCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Construct the system. Providers are created uninitialized; call
    /// [`DynamicSystem::initialize_all`] to start loading.
    pub fn build(self) -> Result<DynamicSystem> {
        let catalog = self
            .catalog
            .ok_or_else(|| AppError::Config("fallback catalog is required".to_string()))?;

        let seeds = ResolvedSeeds::resolve(self.raw_seed.as_deref())
            .with_structure_override(self.raw_structure_seed.as_deref());

        let provider_config = self.config.provider_config();
        let providers = EntityFamily::ALL.map(|family| {
            EntityProvider::new(
                family,
                seeds.base,
                provider_config.clone(),
                self.store.clone(),
                self.generator.clone(),
                catalog.clone(),
            )
        });

        info!(
            seed = %seeds.base,
            variation = self.config.variation_enabled,
            seeded_store = self.config.seeded_store_enabled,
            generation = self.config.generation_enabled,
            "Dynamic system constructed"
        );

        Ok(DynamicSystem {
            structure: StructuralPerturbation::new(seeds.structure),
            variants: VariantSelector::new(seeds.variant, self.config.variation_enabled),
            providers,
            seeds,
        })
    }
}
