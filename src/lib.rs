//! # loottables
//!
//! Rarity-weighted container loot generation.
//!
//! Given a container type and an item catalog, the engine decides which items
//! (and how many) go into one container. Items come from two sources:
//!
//! 1. **Loot groups**: named, reusable sets of items with independent
//!    probabilities, sampled through a cumulative table in O(log n).
//! 2. **Fallback picks**: the container's ungrouped items, bucketed by rarity
//!    tier and weighted `base^(4 - tier) * scale` per item.
//!
//! Fills enforce duplicate and blueprint limits with a bounded, shared retry
//! budget, strip blacklisted items afterwards and add a bonus scrap stack.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use loottables::{
//!     ContainerProfile, ItemDefinition, LootConfig, LootEngine, LootEntry, MemoryCatalog,
//!     Range, Rarity, SlotContainer,
//! };
//!
//! # fn main() {
//! let catalog = MemoryCatalog::from_items([
//!     ItemDefinition::new("wood", "Wood", Rarity::Common),
//!     ItemDefinition::new("pistol", "Pistol", Rarity::Rare).with_blueprint(true),
//! ]);
//!
//! let mut profile = ContainerProfile::default();
//! profile.items.insert("wood".into(), LootEntry::new(Range::new(50, 100)));
//! profile.items.insert("pistol".into(), LootEntry::default());
//!
//! let mut config = LootConfig::default();
//! config.containers.insert("crate_basic".into(), profile);
//!
//! let mut engine = LootEngine::seeded(catalog, config, 42);
//! let mut container = SlotContainer::default();
//! let outcome = engine.fill("crate_basic", &mut container);
//! assert!(outcome.processed);
//! # }
//! ```
//!
//! ## Configuration
//! [`JsonFileStore`] loads the JSON document, fills in fields added since it
//! was written (see [`reconcile`]) and falls back to defaults, keeping a
//! `.bak` copy, when the file cannot be parsed.
//!
//! ## Gotchas
//! * Group probabilities that sum below 100 leave a "nothing" chance unless
//!   `normalize_group_probabilities` is on.
//! * The engine holds one random source and is not meant to be shared
//!   between threads.

mod balance;
mod catalog;
mod config;
mod container;
mod engine;
mod error;
mod index;
pub mod logging;
mod populate;
mod reconcile;
mod sampler;
mod select;
mod table;
mod uniform;

/// A minimal interface for index samplers that can come up empty.
/// Implemented by [`TierWeights`] (rarity tiers) and [`CumulativeTable`]
/// (loot group items).
#[allow(clippy::len_without_is_empty)]
pub trait IndexSampler {
    fn len(&self) -> usize;
    fn sample_index<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Option<usize>;
}

pub use balance::{BALANCE_TOLERANCE, Normalization, normalize, validate};
pub use catalog::{
    BLUEPRINT_ITEM, BLUEPRINT_SUFFIX, ItemCatalog, ItemDefinition, ItemKey, MemoryCatalog, Rarity,
    SCRAP_ITEM, parse_key, strip_instance_tag,
};
pub use config::{
    ConfigStore, ContainerProfile, GroupEntry, GroupImport, JsonFileStore, LootConfig, LootEntry,
    LootGroup, Range, Settings, upgrade_document,
};
pub use container::{ItemRequest, LootContainer, SlotContainer};
pub use engine::{LootEngine, RebuildReport};
pub use error::LootError;
pub use index::{CatalogIndex, ContainerIndex, Pool, TierReport};
pub use populate::{FillBudget, FillOutcome, Origin, Populator};
pub use reconcile::reconcile;
pub use sampler::{DEFAULT_RARITY_BASE, DEFAULT_RARITY_SCALE, TierWeights};
pub use select::{FallbackSampler, sample_from_group, scale_amount};
pub use table::CumulativeTable;
pub use uniform::TierBucket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_fill() {
        let catalog =
            MemoryCatalog::from_items([ItemDefinition::new("wood", "Wood", Rarity::Common)]);
        let mut profile = ContainerProfile::default();
        profile
            .items
            .insert("wood".into(), LootEntry::new(Range::new(1, 5)));
        let mut config = LootConfig::default();
        config.containers.insert("box".into(), profile);

        let mut engine = LootEngine::seeded(catalog, config, 1);
        let mut c = SlotContainer::default();
        let out = engine.fill("box", &mut c);
        assert!(out.processed);
        assert_eq!(out.added, 1);
    }
}
