//! Effect catalog: what each effect kind means to the host
//!
//! The catalog is fixed when the scheduler is built. Each entry names the
//! host effect to apply and how long one application lasts, measured in host
//! ticks. Entries marked `refresh` are maintained by the reapplication pass;
//! the rest are only ever granted once.

use crate::{EffectId, EffectKind, Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How one effect kind is applied on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Host effect identifier
    pub effect_id: EffectId,
    /// Length of a single application in host ticks
    pub duration_ticks: u32,
    /// Host-defined trailing flag on the apply call; observed to mean
    /// "force reapply even if already active"
    #[serde(default = "default_force")]
    pub force: bool,
    /// Whether the kind can be toggled and maintained by the pass
    #[serde(default = "default_refresh")]
    pub refresh: bool,
}

fn default_force() -> bool {
    true
}

fn default_refresh() -> bool {
    true
}

impl CatalogEntry {
    /// Create a maintained entry with `force` set
    pub fn new(effect_id: u32, duration_ticks: u32) -> Self {
        Self {
            effect_id: EffectId::new(effect_id),
            duration_ticks,
            force: true,
            refresh: true,
        }
    }

    /// Mark the entry as grant-only
    pub fn one_shot(mut self) -> Self {
        self.refresh = false;
        self
    }

    /// Wall-clock length of one application at the given host tick rate
    pub fn duration(&self, ticks_per_second: u32) -> Duration {
        let tps = u64::from(ticks_per_second.max(1));
        Duration::from_micros(u64::from(self.duration_ticks) * 1_000_000 / tps)
    }
}

/// Static mapping from effect kind to host application parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCatalog {
    entries: IndexMap<EffectKind, CatalogEntry>,
}

impl EffectCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog
    ///
    /// | kind | host id | duration |
    /// |---|---|---|
    /// | glow | 11 | 300 ticks |
    /// | lava_immunity | 1 | 300 ticks |
    /// | water_walking | 15 | 300 ticks |
    /// | bunny | 40 | 3600 ticks, one-shot |
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert(EffectKind::Glow, CatalogEntry::new(11, 300));
        catalog.insert(EffectKind::LavaImmunity, CatalogEntry::new(1, 300));
        catalog.insert(EffectKind::WaterWalking, CatalogEntry::new(15, 300));
        catalog.insert(EffectKind::Bunny, CatalogEntry::new(40, 3600).one_shot());
        catalog
    }

    /// Add or replace the entry for a kind
    pub fn insert(&mut self, kind: EffectKind, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(kind, entry)
    }

    /// Look up a kind
    pub fn get(&self, kind: EffectKind) -> Option<&CatalogEntry> {
        self.entries.get(&kind)
    }

    /// Look up a kind, failing with [`Error::NotInCatalog`]
    pub fn entry(&self, kind: EffectKind) -> Result<&CatalogEntry> {
        self.get(kind).ok_or(Error::NotInCatalog(kind))
    }

    /// Check that a kind can be toggled on a slot
    pub fn check_toggleable(&self, kind: EffectKind) -> Result<()> {
        if self.entry(kind)?.refresh {
            Ok(())
        } else {
            Err(Error::NotToggleable(kind))
        }
    }

    /// Shortest single-application duration among maintained kinds
    ///
    /// The reapplication interval has to stay strictly below this, or a
    /// maintained effect lapses between passes.
    pub fn shortest_refresh_duration(&self, ticks_per_second: u32) -> Option<Duration> {
        self.entries
            .values()
            .filter(|entry| entry.refresh)
            .map(|entry| entry.duration(ticks_per_second))
            .min()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EffectKind, &CatalogEntry)> {
        self.entries.iter().map(|(kind, entry)| (*kind, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = EffectCatalog::standard();
        assert_eq!(catalog.len(), EffectKind::COUNT);

        let glow = catalog.get(EffectKind::Glow).unwrap();
        assert_eq!(glow.effect_id, EffectId::new(11));
        assert_eq!(glow.duration_ticks, 300);
        assert!(glow.force);
        assert!(glow.refresh);

        let bunny = catalog.get(EffectKind::Bunny).unwrap();
        assert_eq!(bunny.effect_id, EffectId::new(40));
        assert!(!bunny.refresh);
    }

    #[test]
    fn test_entry_duration() {
        let entry = CatalogEntry::new(11, 300);
        assert_eq!(entry.duration(60), Duration::from_secs(5));
        assert_eq!(entry.duration(30), Duration::from_secs(10));
    }

    #[test]
    fn test_toggleable() {
        let catalog = EffectCatalog::standard();
        assert!(catalog.check_toggleable(EffectKind::Glow).is_ok());
        assert_eq!(
            catalog.check_toggleable(EffectKind::Bunny),
            Err(Error::NotToggleable(EffectKind::Bunny))
        );

        let empty = EffectCatalog::new();
        assert_eq!(
            empty.check_toggleable(EffectKind::Glow),
            Err(Error::NotInCatalog(EffectKind::Glow))
        );
    }

    #[test]
    fn test_shortest_refresh_duration_skips_one_shot() {
        let mut catalog = EffectCatalog::new();
        catalog.insert(EffectKind::Glow, CatalogEntry::new(11, 180));
        catalog.insert(EffectKind::Bunny, CatalogEntry::new(40, 60).one_shot());

        assert_eq!(
            catalog.shortest_refresh_duration(60),
            Some(Duration::from_secs(3))
        );
        assert_eq!(EffectCatalog::new().shortest_refresh_duration(60), None);
    }

    #[test]
    fn test_entry_defaults_from_ron() {
        let entry: CatalogEntry =
            ron::from_str("(effect_id: 15, duration_ticks: 240)").unwrap();
        assert_eq!(entry, CatalogEntry::new(15, 240));
    }
}
