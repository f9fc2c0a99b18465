// Sourcing chain
//
// Priority order: per-seed cache, seeded store, generator, bundled
// catalog. Every step past this layer is non-throwing: failures log and
// fall through (fail-open), so readiness always resolves with the best
// available data.

use super::{EntityProvider, ProviderPhase};
use crate::domain::{derive_sub_seed, Entity, Seed, Subsystem};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Where a committed entity set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Source {
    Cache,
    Store,
    Generated,
    Bundle,
}

impl Source {
    pub(super) fn as_str(self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Store => "store",
            Source::Generated => "generated",
            Source::Bundle => "bundle",
        }
    }

    /// Only successful primary loads are worth keeping for in-page
    /// navigation under the same seed.
    fn cacheable(self) -> bool {
        matches!(self, Source::Store | Source::Generated)
    }
}

impl EntityProvider {
    pub(super) async fn run_sourcing(self: Arc<Self>, generation: u64, seed: Seed) {
        let cached = {
            let st = self.state.lock().unwrap();
            st.cache.get(&seed.value()).cloned()
        };
        if let Some(entities) = cached {
            debug!(
                family = %self.family,
                seed = %seed,
                "Serving cached entities"
            );
            self.commit(generation, seed, entities, Source::Cache);
            return;
        }

        let (entities, source) = self.source_entities(seed).await;
        self.commit(generation, seed, Arc::new(entities), source);
    }

    /// Walk the sourcing chain. Never fails: the bundled catalog is the
    /// terminal step.
    async fn source_entities(&self, seed: Seed) -> (Vec<Entity>, Source) {
        // Canonical pages skip remote sourcing entirely: deterministic
        // content at zero cost.
        if seed.is_canonical() {
            debug!(family = %self.family, "Canonical seed, using bundled dataset");
            return (self.catalog.dataset(self.family), Source::Bundle);
        }

        let seed_value = derive_sub_seed(seed, Subsystem::Data);
        let step_timeout = self.config.step_timeout;

        if self.config.seeded_store_enabled {
            if let Some(store) = &self.store {
                match timeout(
                    step_timeout,
                    store.fetch_selection(self.family, seed_value, self.config.target_count),
                )
                .await
                {
                    Ok(Ok(items)) if !items.is_empty() => {
                        info!(
                            family = %self.family,
                            seed = %seed,
                            count = items.len(),
                            "Seeded selection loaded"
                        );
                        return (items, Source::Store);
                    }
                    Ok(Ok(_)) => {
                        warn!(family = %self.family, seed = %seed, "Seeded selection empty, falling through");
                    }
                    Ok(Err(e)) => {
                        warn!(family = %self.family, seed = %seed, error = %e, "Seeded selection failed, falling through");
                    }
                    Err(_) => {
                        warn!(
                            family = %self.family,
                            seed = %seed,
                            timeout_ms = step_timeout.as_millis() as u64,
                            "Seeded selection timed out, falling through"
                        );
                    }
                }
            }
        }

        if self.config.generation_enabled {
            if let Some(generator) = &self.generator {
                match timeout(
                    step_timeout,
                    generator.generate(self.family, self.config.target_count),
                )
                .await
                {
                    Ok(Ok(items)) if !items.is_empty() => {
                        info!(
                            family = %self.family,
                            seed = %seed,
                            count = items.len(),
                            "Generated dataset loaded"
                        );
                        return (items, Source::Generated);
                    }
                    Ok(Ok(_)) => {
                        warn!(family = %self.family, seed = %seed, "Generator returned nothing, falling through");
                    }
                    Ok(Err(e)) => {
                        warn!(family = %self.family, seed = %seed, error = %e, "Generation failed, falling through");
                    }
                    Err(_) => {
                        warn!(
                            family = %self.family,
                            seed = %seed,
                            timeout_ms = step_timeout.as_millis() as u64,
                            "Generation timed out, falling through"
                        );
                    }
                }
            }
        }

        (self.catalog.dataset(self.family), Source::Bundle)
    }

    /// Commit a finished load, unless a newer generation superseded it.
    fn commit(&self, generation: u64, seed: Seed, entities: Arc<Vec<Entity>>, source: Source) {
        let callbacks;
        {
            let mut st = self.state.lock().unwrap();
            if st.closed || generation != st.target_generation {
                debug!(
                    family = %self.family,
                    generation,
                    target = st.target_generation,
                    "Discarding stale sourcing result"
                );
                return;
            }
            st.entities = entities.clone();
            if source.cacheable() {
                st.cache.insert(seed.value(), entities.clone());
            }
            st.phase = ProviderPhase::Ready;
            st.inflight = false;
            st.committed_generation = generation;
            callbacks = st.subscribers.callbacks();
        }
        let _ = self.completed_tx.send(generation);
        info!(
            family = %self.family,
            seed = %seed,
            source = source.as_str(),
            count = entities.len(),
            "Entities committed"
        );
        for cb in &callbacks {
            cb(&entities);
        }
    }
}
