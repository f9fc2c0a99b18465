//! Entity Provider - per-family async data lifecycle.
//!
//! One instance per entity family. Sourcing runs in background tasks;
//! readers await readiness through a watch channel carrying the last
//! committed reload generation. Concurrent reloads for the same seed
//! collapse onto one sourcing run (single-flight); a reload for a newer
//! seed supersedes the in-flight one, whose late result is discarded by
//! the generation check before commit.

pub mod constants;
mod sourcing;
mod subscribers;

use crate::domain::{Entity, EntityFamily, Seed};
use crate::port::{FallbackCatalog, Generator, SeededStore};
use constants::{DEFAULT_STEP_TIMEOUT, DEFAULT_TARGET_COUNT};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use subscribers::SubscriberRegistry;
use tokio::sync::watch;
use tracing::debug;

pub use subscribers::SubscriberCallback;

/// Provider lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPhase {
    Uninitialized,
    Loading,
    Ready,
    Reloading,
}

impl std::fmt::Display for ProviderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderPhase::Uninitialized => write!(f, "UNINITIALIZED"),
            ProviderPhase::Loading => write!(f, "LOADING"),
            ProviderPhase::Ready => write!(f, "READY"),
            ProviderPhase::Reloading => write!(f, "RELOADING"),
        }
    }
}

/// Sourcing toggles and bounds for one provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub seeded_store_enabled: bool,
    pub generation_enabled: bool,
    pub step_timeout: Duration,
    pub target_count: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            seeded_store_enabled: false,
            generation_enabled: false,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            target_count: DEFAULT_TARGET_COUNT,
        }
    }
}

struct ProviderState {
    phase: ProviderPhase,
    entities: Arc<Vec<Entity>>,
    base_seed: Seed,
    target_generation: u64,
    committed_generation: u64,
    inflight: bool,
    closed: bool,
    cache: HashMap<u32, Arc<Vec<Entity>>>,
    subscribers: SubscriberRegistry,
}

/// Awaitable handle for a specific reload generation.
pub struct ReadyWaiter {
    rx: watch::Receiver<u64>,
    generation: u64,
}

impl ReadyWaiter {
    /// Resolve once the awaited generation (or a later one) has committed.
    pub async fn wait(mut self) {
        loop {
            if *self.rx.borrow() >= self.generation {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// RAII unsubscribe guard returned by [`EntityProvider::subscribe`].
pub struct Subscription {
    provider: Weak<EntityProvider>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.upgrade() {
            provider.remove_subscriber(self.id);
        }
    }
}

pub struct EntityProvider {
    family: EntityFamily,
    config: ProviderConfig,
    store: Option<Arc<dyn SeededStore>>,
    generator: Option<Arc<dyn Generator>>,
    catalog: Arc<dyn FallbackCatalog>,
    state: Mutex<ProviderState>,
    completed_tx: watch::Sender<u64>,
    completed_rx: watch::Receiver<u64>,
    // Handle to self for spawning sourcing tasks and subscription guards.
    self_ref: Weak<EntityProvider>,
}

impl EntityProvider {
    pub fn new(
        family: EntityFamily,
        base_seed: Seed,
        config: ProviderConfig,
        store: Option<Arc<dyn SeededStore>>,
        generator: Option<Arc<dyn Generator>>,
        catalog: Arc<dyn FallbackCatalog>,
    ) -> Arc<Self> {
        let (completed_tx, completed_rx) = watch::channel(0);
        Arc::new_cyclic(|self_ref| Self {
            family,
            config,
            store,
            generator,
            catalog,
            state: Mutex::new(ProviderState {
                phase: ProviderPhase::Uninitialized,
                entities: Arc::new(Vec::new()),
                base_seed,
                target_generation: 0,
                committed_generation: 0,
                inflight: false,
                closed: false,
                cache: HashMap::new(),
                subscribers: SubscriberRegistry::default(),
            }),
            completed_tx,
            completed_rx,
            self_ref: self_ref.clone(),
        })
    }

    pub fn family(&self) -> EntityFamily {
        self.family
    }

    pub fn phase(&self) -> ProviderPhase {
        self.state.lock().unwrap().phase
    }

    pub fn is_ready(&self) -> bool {
        let st = self.state.lock().unwrap();
        matches!(st.phase, ProviderPhase::Ready) && !st.inflight
    }

    pub fn current_seed(&self) -> Seed {
        self.state.lock().unwrap().base_seed
    }

    /// Run the first load. Idempotent: repeated calls (and calls racing a
    /// reload) return a waiter for the load already underway.
    pub fn initialize(&self) -> ReadyWaiter {
        let st = self.state.lock().unwrap();
        if st.closed {
            return self.waiter_for(st.committed_generation);
        }
        if st.inflight || !matches!(st.phase, ProviderPhase::Uninitialized) {
            return self.waiter_for(st.target_generation);
        }
        let seed = st.base_seed;
        self.begin_load(st, seed)
    }

    /// Reload entities, optionally switching to a new base seed.
    ///
    /// Single-flight: while a load for the same seed is in flight, the
    /// existing waiter is returned and no second sourcing run starts. A
    /// different seed supersedes the in-flight load; its late result is
    /// discarded at commit time.
    pub fn reload(&self, seed_override: Option<Seed>) -> ReadyWaiter {
        let st = self.state.lock().unwrap();
        if st.closed {
            return self.waiter_for(st.committed_generation);
        }
        let requested = seed_override.unwrap_or(st.base_seed);
        if st.inflight && requested == st.base_seed {
            return self.waiter_for(st.target_generation);
        }
        self.begin_load(st, requested)
    }

    /// Await readiness.
    ///
    /// Captures the newest load generation at call time, so a caller who
    /// awaits after a reload was requested never observes pre-reload data.
    pub async fn when_ready(&self) {
        let wait_generation = {
            let st = self.state.lock().unwrap();
            if st.closed {
                return;
            }
            match st.phase {
                // First load not started yet: wait for it.
                ProviderPhase::Uninitialized => st.target_generation + 1,
                _ if st.inflight => st.target_generation,
                _ => return,
            }
        };
        self.waiter_for(wait_generation).wait().await;
    }

    /// Current entity snapshot. Empty while a load is in flight.
    pub fn entities(&self) -> Arc<Vec<Entity>> {
        self.state.lock().unwrap().entities.clone()
    }

    /// Look up an entity by id across the inconsistent id formats of the
    /// sourcing paths.
    ///
    /// Ladder: exact match, URL-decoded match, numeric match after
    /// stripping the family id prefix, substring match in either
    /// direction.
    pub fn get_by_id(&self, id: &str) -> Option<Entity> {
        let snapshot = self.entities();

        if let Some(found) = snapshot.iter().find(|e| e.id == id) {
            return Some(found.clone());
        }

        let decoded = percent_encoding::percent_decode_str(id)
            .decode_utf8()
            .map(|cow| cow.into_owned())
            .unwrap_or_else(|_| id.to_string());
        if decoded != id {
            if let Some(found) = snapshot.iter().find(|e| e.id == decoded) {
                return Some(found.clone());
            }
        }

        if let Ok(wanted) = decoded.trim().parse::<u64>() {
            let prefix = self.family.id_prefix();
            if let Some(found) = snapshot.iter().find(|e| {
                e.id.strip_prefix(prefix)
                    .and_then(|tail| tail.parse::<u64>().ok())
                    == Some(wanted)
            }) {
                return Some(found.clone());
            }
        }

        if !decoded.is_empty() {
            if let Some(found) = snapshot
                .iter()
                .find(|e| e.id.contains(&decoded) || decoded.contains(&e.id))
            {
                return Some(found.clone());
            }
        }

        None
    }

    /// Register a snapshot callback. The current snapshot is replayed
    /// immediately; the returned guard unsubscribes on drop.
    pub fn subscribe(
        &self,
        callback: impl Fn(&[Entity]) + Send + Sync + 'static,
    ) -> Subscription {
        let callback: SubscriberCallback = Arc::new(callback);
        let (id, snapshot) = {
            let mut st = self.state.lock().unwrap();
            let id = st.subscribers.insert(callback.clone());
            (id, st.entities.clone())
        };
        callback(&snapshot);
        Subscription {
            provider: self.self_ref.clone(),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().unwrap().subscribers.len()
    }

    /// Tear the provider down: drop subscribers, discard any late
    /// sourcing results and release parked waiters.
    pub fn shutdown(&self) {
        {
            let mut st = self.state.lock().unwrap();
            st.closed = true;
            st.subscribers.clear();
        }
        let _ = self.completed_tx.send(u64::MAX);
        debug!(family = %self.family, "Provider shut down");
    }

    fn waiter_for(&self, generation: u64) -> ReadyWaiter {
        ReadyWaiter {
            rx: self.completed_rx.clone(),
            generation,
        }
    }

    fn remove_subscriber(&self, id: u64) {
        self.state.lock().unwrap().subscribers.remove(id);
    }

    /// Begin a load generation: flip to loading, clear the snapshot,
    /// signal subscribers, then source in the background. Takes the held
    /// state guard so the caller's checks and the kickoff are atomic.
    fn begin_load(&self, mut st: MutexGuard<'_, ProviderState>, seed: Seed) -> ReadyWaiter {
        st.target_generation += 1;
        let generation = st.target_generation;
        st.base_seed = seed;
        st.inflight = true;
        st.phase = match st.phase {
            ProviderPhase::Uninitialized | ProviderPhase::Loading => ProviderPhase::Loading,
            _ => ProviderPhase::Reloading,
        };
        st.entities = Arc::new(Vec::new());
        let snapshot = st.entities.clone();
        let callbacks = st.subscribers.callbacks();
        drop(st);

        // Loading signal, strictly after the snapshot mutation.
        for cb in &callbacks {
            cb(&snapshot);
        }
        if let Some(this) = self.self_ref.upgrade() {
            tokio::spawn(async move {
                this.run_sourcing(generation, seed).await;
            });
        }
        self.waiter_for(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{derive_sub_seed, Subsystem};
    use crate::port::catalog::mocks::StaticCatalog;
    use crate::port::generator::mocks::MockGenerator;
    use crate::port::seeded_store::mocks::{MockSeededStore, MockStoreBehavior};
    use std::sync::Mutex as StdMutex;

    fn seed(raw: &str) -> Seed {
        Seed::resolve(Some(raw))
    }

    fn provider_with(
        store: Option<Arc<MockSeededStore>>,
        generator: Option<Arc<MockGenerator>>,
        base: Seed,
    ) -> Arc<EntityProvider> {
        let config = ProviderConfig {
            seeded_store_enabled: store.is_some(),
            generation_enabled: generator.is_some(),
            step_timeout: Duration::from_millis(50),
            target_count: 4,
        };
        EntityProvider::new(
            EntityFamily::Jobs,
            base,
            config,
            store.map(|s| s as Arc<dyn SeededStore>),
            generator.map(|g| g as Arc<dyn Generator>),
            Arc::new(StaticCatalog::new(3)),
        )
    }

    #[tokio::test]
    async fn test_canonical_seed_skips_remote_sourcing() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, Seed::CANONICAL);

        provider.initialize().wait().await;

        assert!(provider.is_ready());
        assert_eq!(provider.entities().len(), 3);
        assert_eq!(store.fetch_count(), 0, "canonical seed must not hit the store");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, seed("7"));

        let first = provider.initialize();
        let second = provider.initialize();
        first.wait().await;
        second.wait().await;

        assert_eq!(store.fetch_count(), 1);
        assert!(provider.is_ready());
    }

    #[tokio::test]
    async fn test_single_flight_reload_shares_one_fetch() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, seed("7"));
        provider.initialize().wait().await;
        let after_init = store.fetch_count();

        let a = provider.reload(None);
        let b = provider.reload(None);
        a.wait().await;
        b.wait().await;

        // Both callers piggyback on one sourcing run; the per-seed cache
        // already holds seed 7, so no second fetch happens at all.
        assert_eq!(store.fetch_count(), after_init);
        assert!(provider.is_ready());
    }

    #[tokio::test]
    async fn test_single_flight_without_cache() {
        let store = Arc::new(MockSeededStore::new(MockStoreBehavior::Hang(
            Duration::from_millis(10),
        )));
        let provider = provider_with(Some(store.clone()), None, seed("7"));

        // Hang resolves within the step timeout but returns empty, so both
        // concurrent loads fall through to the catalog via ONE store call.
        let a = provider.reload(None);
        let b = provider.reload(None);
        a.wait().await;
        b.wait().await;

        assert_eq!(store.fetch_count(), 1);
        assert_eq!(provider.entities().len(), 3);
    }

    #[tokio::test]
    async fn test_newer_seed_supersedes_inflight_reload() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, seed("2"));

        let first = provider.reload(Some(seed("2")));
        let second = provider.reload(Some(seed("5")));
        first.wait().await;
        second.wait().await;
        provider.when_ready().await;

        let expected = derive_sub_seed(seed("5"), Subsystem::Data);
        let entities = provider.entities();
        assert!(!entities.is_empty());
        for entity in entities.iter() {
            assert!(
                entity.id.starts_with(&expected.to_string()),
                "entity {} is not from seed 5",
                entity.id
            );
        }
        assert_eq!(provider.current_seed(), seed("5"));
    }

    #[tokio::test]
    async fn test_when_ready_after_reload_sees_new_data() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, seed("2"));
        provider.initialize().wait().await;

        let _ = provider.reload(Some(seed("9")));
        provider.when_ready().await;

        let expected = derive_sub_seed(seed("9"), Subsystem::Data);
        assert!(provider
            .entities()
            .iter()
            .all(|e| e.id.starts_with(&expected.to_string())));
    }

    #[tokio::test]
    async fn test_fallthrough_empty_store_failing_generator() {
        let store = Arc::new(MockSeededStore::new_empty());
        let generator = Arc::new(MockGenerator::new_failing("schema mismatch"));
        let provider = provider_with(Some(store.clone()), Some(generator.clone()), seed("7"));

        provider.initialize().wait().await;

        assert!(provider.is_ready());
        assert_eq!(provider.entities().len(), 3, "bundled fallback expected");
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_store_timeout_falls_through() {
        let store = Arc::new(MockSeededStore::new(MockStoreBehavior::Hang(
            Duration::from_secs(5),
        )));
        let provider = provider_with(Some(store.clone()), None, seed("7"));

        let started = std::time::Instant::now();
        provider.initialize().wait().await;

        assert!(provider.is_ready());
        assert_eq!(provider.entities().len(), 3);
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "step timeout did not bound the hang"
        );
    }

    #[tokio::test]
    async fn test_generator_supplies_when_store_disabled() {
        let generator = Arc::new(MockGenerator::new_generating());
        let provider = provider_with(None, Some(generator.clone()), seed("7"));

        provider.initialize().wait().await;

        assert_eq!(generator.call_count(), 1);
        assert_eq!(provider.entities().len(), 4);
        assert!(provider.entities()[0].id.starts_with("gen-"));
    }

    #[tokio::test]
    async fn test_successful_primary_load_is_cached() {
        let store = Arc::new(MockSeededStore::new_selection());
        let provider = provider_with(Some(store.clone()), None, seed("7"));

        provider.initialize().wait().await;
        assert_eq!(store.fetch_count(), 1);

        provider.reload(None).wait().await;
        assert_eq!(store.fetch_count(), 1, "same-seed reload must reuse cache");

        provider.reload(Some(seed("8"))).wait().await;
        assert_eq!(store.fetch_count(), 2);

        provider.reload(Some(seed("7"))).wait().await;
        assert_eq!(store.fetch_count(), 2, "seed 7 still cached");
    }

    #[tokio::test]
    async fn test_get_by_id_ladder() {
        let provider = provider_with(None, None, Seed::CANONICAL);
        provider.initialize().wait().await;
        // StaticCatalog ids are JB-100, JB-101, JB-102

        assert_eq!(provider.get_by_id("JB-101").unwrap().id, "JB-101");
        assert_eq!(provider.get_by_id("101").unwrap().id, "JB-101");
        assert_eq!(provider.get_by_id("B-102").unwrap().id, "JB-102");
        assert!(provider.get_by_id("999").is_none());
    }

    #[tokio::test]
    async fn test_get_by_id_url_decoded() {
        struct SpacedCatalog;
        impl FallbackCatalog for SpacedCatalog {
            fn dataset(&self, family: EntityFamily) -> Vec<Entity> {
                vec![Entity::new(family, "42 ", serde_json::json!({}))]
            }
        }

        let provider = EntityProvider::new(
            EntityFamily::Jobs,
            Seed::CANONICAL,
            ProviderConfig::default(),
            None,
            None,
            Arc::new(SpacedCatalog),
        );
        provider.initialize().wait().await;

        assert_eq!(provider.get_by_id("42%20").unwrap().id, "42 ");
    }

    #[tokio::test]
    async fn test_subscribe_replays_and_tracks_reloads() {
        let provider = provider_with(None, None, Seed::CANONICAL);
        provider.initialize().wait().await;

        let observed: Arc<StdMutex<Vec<usize>>> = Arc::new(StdMutex::new(Vec::new()));
        let sink = observed.clone();
        let subscription = provider.subscribe(move |entities| {
            sink.lock().unwrap().push(entities.len());
        });

        // Immediate replay of the current snapshot.
        assert_eq!(*observed.lock().unwrap(), vec![3]);

        provider.reload(None).wait().await;
        // Loading signal (empty) then the committed set.
        assert_eq!(*observed.lock().unwrap(), vec![3, 0, 3]);

        subscription.unsubscribe();
        assert_eq!(provider.subscriber_count(), 0);

        provider.reload(None).wait().await;
        assert_eq!(*observed.lock().unwrap(), vec![3, 0, 3]);
    }

    #[tokio::test]
    async fn test_shutdown_discards_and_releases() {
        let store = Arc::new(MockSeededStore::new(MockStoreBehavior::Hang(
            Duration::from_secs(5),
        )));
        let provider = provider_with(Some(store), None, seed("7"));

        let waiter = provider.initialize();
        provider.shutdown();

        // Waiter released promptly instead of hanging on the dead load.
        tokio::time::timeout(Duration::from_millis(100), waiter.wait())
            .await
            .expect("shutdown must release parked waiters");
        provider.when_ready().await;
    }
}
