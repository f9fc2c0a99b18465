//! Structural Perturbation - Decoy wrapping and list reordering.
//!
//! Both operations are pure functions of `(key, structure seed)`. The
//! canonical seed short-circuits to identity so the default page keeps a
//! stable DOM shape.

use crate::domain::error::{DomainError, Result};
use crate::domain::seed::SubSeed;
use crate::domain::{fnv1a_64, ComponentKey, Element, ListKey, VariantKey};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Marker attribute on the non-semantic shell wrapper.
pub const WRAPPER_MARKER: &str = "data-shell";
/// Marker attribute on the decoy wrapper.
pub const DECOY_MARKER: &str = "data-slot";

/// Upper bound on reorderable list length. Longer requests indicate a
/// caller bug and fail loudly rather than corrupt indexed reads.
pub const MAX_LIST_LEN: usize = 4096;

pub struct StructuralPerturbation {
    seed: u64,
    canonical: bool,
}

impl StructuralPerturbation {
    pub fn new(seed: SubSeed) -> Self {
        Self {
            seed: seed.value,
            canonical: seed.canonical,
        }
    }

    /// Wrap `element` in zero, one or two non-semantic containers.
    ///
    /// The wrapper variant is drawn from [0,2) and the decoy variant from
    /// [0,3), each keyed independently on `(component, seed)`, so the
    /// depth delta above the element is a hash-driven value in {0,1,2}
    /// rather than a linear function of the seed. Wrappers carry marker
    /// attributes only and no visual effect.
    pub fn add_wrap_decoy(
        &self,
        component: ComponentKey,
        element: Element,
        wrap_id: Option<&str>,
    ) -> Element {
        if self.canonical {
            return element;
        }

        let token = component.token();
        let wrapper_variant = fnv1a_64(&format!("{}:wrap:{}", token, self.seed)) % 2;
        let decoy_variant = fnv1a_64(&format!("{}:decoy:{}", token, self.seed)) % 3;

        let mut out = element;
        if wrapper_variant > 0 {
            out = Element::new("div").attr(WRAPPER_MARKER, token).child(out);
        }
        if decoy_variant > 0 {
            let mut decoy = Element::new("div").attr(DECOY_MARKER, decoy_variant.to_string());
            if let Some(id) = wrap_id {
                decoy = decoy.id(id);
            }
            out = decoy.child(out);
        }
        out
    }

    /// Produce the render order for a list of `len` items.
    ///
    /// Always a true permutation of `[0..len)`: `len == 0` yields `[]`,
    /// `len == 1` yields `[0]`, and the canonical seed yields the
    /// identity order.
    pub fn change_order(&self, list: ListKey, len: usize) -> Result<Vec<usize>> {
        if len > MAX_LIST_LEN {
            return Err(DomainError::PermutationLength {
                requested: len,
                max: MAX_LIST_LEN,
            });
        }

        let mut order: Vec<usize> = (0..len).collect();
        if self.canonical || len < 2 {
            return Ok(order);
        }

        let rng_seed = fnv1a_64(&format!("{}:order:{}", list.token(), self.seed));
        let mut rng = ChaCha8Rng::seed_from_u64(rng_seed);
        order.shuffle(&mut rng);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed::{Seed, SubSeed, Subsystem};

    fn perturbation_for(raw_seed: &str) -> StructuralPerturbation {
        let seed = SubSeed::derive(Seed::resolve(Some(raw_seed)), Subsystem::Structure);
        StructuralPerturbation::new(seed)
    }

    fn sample_card() -> Element {
        Element::new("article").class("card").text("Welder wanted")
    }

    #[test]
    fn test_canonical_returns_element_unchanged() {
        let p = perturbation_for("1");
        let card = sample_card();
        let out = p.add_wrap_decoy(ComponentKey::JobCard, card.clone(), Some("wrap-1"));
        assert_eq!(out, card);
    }

    #[test]
    fn test_wrap_depth_delta_bounded() {
        let base_depth = sample_card().depth();
        for raw in 2..=300u32 {
            let p = perturbation_for(&raw.to_string());
            let out = p.add_wrap_decoy(ComponentKey::JobCard, sample_card(), None);
            let delta = out.depth() - base_depth;
            assert!(delta <= 2, "seed {} produced depth delta {}", raw, delta);
        }
    }

    #[test]
    fn test_wrap_depth_not_linear_in_seed() {
        // A fixed stride through the seed range must produce more than one
        // distinct depth delta.
        let base_depth = sample_card().depth();
        let deltas: std::collections::HashSet<usize> = (2..=60u32)
            .map(|raw| {
                let p = perturbation_for(&raw.to_string());
                p.add_wrap_decoy(ComponentKey::SearchPanel, sample_card(), None)
                    .depth()
                    - base_depth
            })
            .collect();
        assert!(deltas.len() > 1, "depth deltas collapsed to {:?}", deltas);
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let a = perturbation_for("42").add_wrap_decoy(ComponentKey::JobCard, sample_card(), None);
        let b = perturbation_for("42").add_wrap_decoy(ComponentKey::JobCard, sample_card(), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrap_id_lands_on_decoy() {
        // Find a seed where the decoy wrapper is present, then check the id.
        for raw in 2..=300u32 {
            let p = perturbation_for(&raw.to_string());
            let out = p.add_wrap_decoy(ComponentKey::JobCard, sample_card(), Some("wrap-7"));
            if out.get_attr(DECOY_MARKER).is_some() {
                assert_eq!(out.get_attr("id"), Some("wrap-7"));
                return;
            }
        }
        panic!("no seed produced a decoy wrapper");
    }

    #[test]
    fn test_change_order_degenerate_lengths() {
        let p = perturbation_for("42");
        assert_eq!(p.change_order(ListKey::JobResults, 0).unwrap(), Vec::<usize>::new());
        assert_eq!(p.change_order(ListKey::JobResults, 1).unwrap(), vec![0]);
    }

    #[test]
    fn test_change_order_is_permutation() {
        for raw in 2..=300u32 {
            let p = perturbation_for(&raw.to_string());
            for len in [2usize, 3, 7, 12] {
                let order = p.change_order(ListKey::ProductGrid, len).unwrap();
                assert_eq!(order.len(), len);
                let mut sorted = order.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_change_order_canonical_identity() {
        let p = perturbation_for("1");
        assert_eq!(
            p.change_order(ListKey::JobResults, 5).unwrap(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_change_order_deterministic() {
        let a = perturbation_for("7").change_order(ListKey::NavItems, 9).unwrap();
        let b = perturbation_for("7").change_order(ListKey::NavItems, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_change_order_rejects_oversized_request() {
        let p = perturbation_for("7");
        let err = p.change_order(ListKey::NavItems, MAX_LIST_LEN + 1).unwrap_err();
        assert!(matches!(err, DomainError::PermutationLength { .. }));
    }

    #[test]
    fn test_different_list_keys_differ() {
        // Not guaranteed for every seed, but across the range the two
        // schedules must diverge somewhere.
        let diverged = (2..=50u32).any(|raw| {
            let p = perturbation_for(&raw.to_string());
            p.change_order(ListKey::JobResults, 8).unwrap()
                != p.change_order(ListKey::ProductGrid, 8).unwrap()
        });
        assert!(diverged);
    }
}
