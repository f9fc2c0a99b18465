//! Variant Selector - Deterministic pick of one candidate string per
//! semantic key.
//!
//! The same primitive backs element ids, CSS classes and visible text:
//! `index = fnv1a_64(token ":" seed) % candidates.len()`. Selection is a
//! pure function of `(key, seed)`, so the same seed always reproduces the
//! same page.

use crate::domain::seed::SubSeed;
use crate::domain::{fnv1a_64, VariantKey, VariantTable};
use tracing::debug;

pub struct VariantSelector {
    seed: u64,
    canonical: bool,
    enabled: bool,
}

impl VariantSelector {
    pub fn new(seed: SubSeed, enabled: bool) -> Self {
        Self {
            seed: seed.value,
            canonical: seed.canonical,
            enabled,
        }
    }

    /// Pick the variant for `key`.
    ///
    /// Disabled variation, the canonical seed, and a missing or empty
    /// table entry all return the fallback (or the key token itself) so
    /// malformed table data degrades to default markup instead of an
    /// error.
    pub fn get_variant<K: VariantKey>(
        &self,
        key: K,
        table: &VariantTable<K>,
        fallback: Option<&str>,
    ) -> String {
        let token = key.token();
        let default = || fallback.unwrap_or(token).to_string();

        if !self.enabled || self.canonical {
            return default();
        }

        let Some(candidates) = table.candidates(key) else {
            debug!(token = %token, "No variant entry, using fallback");
            return default();
        };
        if candidates.is_empty() {
            debug!(token = %token, "Empty variant entry, using fallback");
            return default();
        }

        let index = (fnv1a_64(&format!("{}:{}", token, self.seed)) % candidates.len() as u64)
            as usize;
        candidates[index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed::{Seed, SubSeed, Subsystem};
    use crate::domain::ClassKey;

    fn table(candidates: &[&str]) -> VariantTable<ClassKey> {
        let (table, unknown) = VariantTable::from_entries(vec![(
            "card".to_string(),
            candidates.iter().map(|s| s.to_string()).collect(),
        )]);
        assert!(unknown.is_empty());
        table
    }

    fn selector_for(raw_seed: &str) -> VariantSelector {
        let seed = SubSeed::derive(Seed::resolve(Some(raw_seed)), Subsystem::Variant);
        VariantSelector::new(seed, true)
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let table = table(&["a", "b", "c"]);
        for raw in ["2", "57", "300"] {
            let first = selector_for(raw).get_variant(ClassKey::Card, &table, None);
            let second = selector_for(raw).get_variant(ClassKey::Card, &table, None);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_canonical_seed_returns_fallback() {
        let table = table(&["a", "b", "c"]);
        let selector = selector_for("1");
        assert_eq!(
            selector.get_variant(ClassKey::Card, &table, Some("base")),
            "base"
        );
        assert_eq!(selector.get_variant(ClassKey::Card, &table, None), "card");
    }

    #[test]
    fn test_disabled_returns_fallback() {
        let table = table(&["a", "b", "c"]);
        let seed = SubSeed::derive(Seed::resolve(Some("9")), Subsystem::Variant);
        let selector = VariantSelector::new(seed, false);
        assert_eq!(selector.get_variant(ClassKey::Card, &table, None), "card");
    }

    #[test]
    fn test_missing_entry_returns_fallback() {
        let table = table(&["a"]);
        let selector = selector_for("5");
        assert_eq!(
            selector.get_variant(ClassKey::Badge, &table, Some("badge-default")),
            "badge-default"
        );
    }

    #[test]
    fn test_empty_candidates_return_fallback() {
        let table = table(&[]);
        let selector = selector_for("5");
        assert_eq!(selector.get_variant(ClassKey::Card, &table, None), "card");
    }

    #[test]
    fn test_selection_lands_in_candidates() {
        let table = table(&["a", "b", "c"]);
        for raw in 2..=300u32 {
            let picked = selector_for(&raw.to_string()).get_variant(ClassKey::Card, &table, None);
            assert!(["a", "b", "c"].contains(&picked.as_str()));
        }
    }

    #[test]
    fn test_distribution_sanity() {
        // No single candidate should win more than half the seeds.
        let table = table(&["a", "b", "c"]);
        let mut counts = std::collections::HashMap::new();
        let samples = 2..=300u32;
        let total = samples.clone().count();
        for raw in samples {
            let picked = selector_for(&raw.to_string()).get_variant(ClassKey::Card, &table, None);
            *counts.entry(picked).or_insert(0usize) += 1;
        }
        for (candidate, count) in counts {
            assert!(
                count <= total / 2,
                "candidate {} chosen {}/{} times",
                candidate,
                count,
                total
            );
        }
    }
}
