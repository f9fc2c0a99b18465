// Seed Resolution and Sub-Seed Derivation

use serde::{Deserialize, Serialize};

/// Lowest accepted seed value.
pub const SEED_MIN: u32 = 1;
/// Highest accepted seed value.
pub const SEED_MAX: u32 = 300;

/// Base seed driving all variation for a page render.
///
/// Seed 1 is the canonical seed: every subsystem resolves to identity
/// behavior so functional tests and the no-seed case see a stable DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed(u32);

impl Seed {
    pub const CANONICAL: Seed = Seed(SEED_MIN);

    /// Resolve a raw query value into a valid seed.
    ///
    /// Missing, unparseable and out-of-range input all clamp to the
    /// canonical seed.
    pub fn resolve(raw: Option<&str>) -> Seed {
        let Some(raw) = raw else {
            return Seed::CANONICAL;
        };
        match raw.trim().parse::<i64>() {
            Ok(v) if (SEED_MIN as i64..=SEED_MAX as i64).contains(&v) => Seed(v as u32),
            _ => Seed::CANONICAL,
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn is_canonical(self) -> bool {
        self.0 == SEED_MIN
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variation subsystems with independent schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// Decoy wrapping and list reordering
    Structure,
    /// Entity sourcing
    Data,
    /// Id / class / text variant selection
    Variant,
}

impl Subsystem {
    // Distinct odd salts so toggling one subsystem's behavior does not
    // expose another's schedule.
    fn salt(self) -> u64 {
        match self {
            Subsystem::Structure => 0x9e37_79b9_7f4a_7c15,
            Subsystem::Data => 0xc2b2_ae3d_27d4_eb4f,
            Subsystem::Variant => 0x1656_67b1_9e37_79f9,
        }
    }
}

/// Derive a subsystem seed from the base seed.
///
/// Integer mixer (wrapping multiply + xor-shift finalizer), pure and
/// stable across platforms. Not a simple reuse of the base value: the
/// three subsystem schedules differ even for the same base seed.
pub fn derive_sub_seed(base: Seed, subsystem: Subsystem) -> u64 {
    let mut x = u64::from(base.value()) ^ subsystem.salt();
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^= x >> 31;
    x
}

/// A derived per-subsystem seed plus its canonicality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSeed {
    pub value: u64,
    pub canonical: bool,
}

impl SubSeed {
    pub fn derive(seed: Seed, subsystem: Subsystem) -> SubSeed {
        SubSeed {
            value: derive_sub_seed(seed, subsystem),
            canonical: seed.is_canonical(),
        }
    }
}

/// Per-subsystem seeds resolved once per page load.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSeeds {
    pub base: Seed,
    pub structure: SubSeed,
    pub data: SubSeed,
    pub variant: SubSeed,
}

impl ResolvedSeeds {
    pub fn from_base(base: Seed) -> Self {
        Self {
            base,
            structure: SubSeed::derive(base, Subsystem::Structure),
            data: SubSeed::derive(base, Subsystem::Data),
            variant: SubSeed::derive(base, Subsystem::Variant),
        }
    }

    /// Resolve from the raw `seed` query value.
    pub fn resolve(raw: Option<&str>) -> Self {
        Self::from_base(Seed::resolve(raw))
    }

    /// Apply the alternate structure-only seed parameter.
    ///
    /// Only the structure schedule is re-derived; data and variant
    /// schedules keep following the base seed.
    pub fn with_structure_override(mut self, raw: Option<&str>) -> Self {
        if raw.is_some() {
            let override_seed = Seed::resolve(raw);
            self.structure = SubSeed::derive(override_seed, Subsystem::Structure);
        }
        self
    }
}
