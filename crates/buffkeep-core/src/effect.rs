//! Effect kinds and the allocation-free set used to iterate them
//!
//! An [`EffectKind`] is a category of status effect that the scheduler knows
//! how to maintain. Which host effect it maps to, and for how long each
//! application lasts, is decided by the [`EffectCatalog`](crate::EffectCatalog).

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Emits light around the entity
    Glow,
    /// Immunity to lava and fire blocks
    LavaImmunity,
    /// Walk on water and other liquids
    WaterWalking,
    /// Companion pet, granted once rather than maintained
    Bunny,
}

impl EffectKind {
    /// Number of kinds
    pub const COUNT: usize = 4;

    /// Every kind, in declaration order
    pub const ALL: [EffectKind; Self::COUNT] = [
        EffectKind::Glow,
        EffectKind::LavaImmunity,
        EffectKind::WaterWalking,
        EffectKind::Bunny,
    ];

    /// Dense index in `0..COUNT`, used to address per-kind storage
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Glow => "glow",
            EffectKind::LavaImmunity => "lava_immunity",
            EffectKind::WaterWalking => "water_walking",
            EffectKind::Bunny => "bunny",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

/// A set of effect kinds packed into a bitmask
///
/// Copyable and allocation-free so it can be produced on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    /// The empty set
    pub const EMPTY: KindSet = KindSet(0);

    /// Create an empty set
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Add a kind
    pub fn insert(&mut self, kind: EffectKind) {
        self.0 |= 1 << kind.index();
    }

    /// Remove a kind
    pub fn remove(&mut self, kind: EffectKind) {
        self.0 &= !(1 << kind.index());
    }

    /// Check membership
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = EffectKind> + '_ {
        EffectKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<EffectKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = EffectKind>>(iter: I) -> Self {
        let mut set = KindSet::new();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(kind.name())?;
            first = false;
        }
        Ok(())
    }
}
