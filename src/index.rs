//! Per-container rarity buckets derived from the item catalog.
//!
//! Buckets and weights are a cache over the catalog and the container
//! profiles. [`CatalogIndex::rebuild`] recomputes everything;
//! [`CatalogIndex::invalidate`] drops it so the next user rebuilds.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::catalog::{ItemCatalog, Rarity, parse_key};
use crate::config::LootConfig;
use crate::sampler::TierWeights;
use crate::uniform::TierBucket;

/// Which bucket set a fallback pick draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    Items,
    Blueprints,
}

/// Rarity buckets and weights for one container type.
#[derive(Debug, Clone, Default)]
pub struct ContainerIndex {
    items: [TierBucket; Rarity::COUNT],
    blueprints: [TierBucket; Rarity::COUNT],
    item_weights: TierWeights,
    blueprint_weights: TierWeights,
}

impl ContainerIndex {
    /// Sort configured keys into rarity buckets.
    ///
    /// Blueprint requests go to the blueprint buckets only when the catalog
    /// says the item's blueprint can be handed out; otherwise the item lands
    /// in the plain buckets. Unknown identifiers are skipped and returned.
    pub fn build<'k, C, I>(catalog: &C, keys: I, base: u32, scale: u64) -> (Self, Vec<String>)
    where
        C: ItemCatalog + ?Sized,
        I: IntoIterator<Item = &'k str>,
    {
        let mut index = Self::default();
        let mut unknown = Vec::new();

        for key in keys {
            let parsed = parse_key(key);
            let Some(def) = catalog.lookup(parsed.id) else {
                unknown.push(key.to_owned());
                continue;
            };
            let tier = def.rarity.index();
            if parsed.blueprint && def.blueprint_allowed() {
                index.blueprints[tier].insert(key, parsed.id);
            } else {
                index.items[tier].insert(key, parsed.id);
            }
        }

        index.compute_weights(base, scale);
        (index, unknown)
    }

    fn compute_weights(&mut self, base: u32, scale: u64) {
        self.item_weights = TierWeights::new(base, scale, self.items.each_ref().map(TierBucket::len));
        self.blueprint_weights =
            TierWeights::new(base, scale, self.blueprints.each_ref().map(TierBucket::len));
    }

    pub fn bucket(&self, pool: Pool, tier: Rarity) -> &TierBucket {
        match pool {
            Pool::Items => &self.items[tier.index()],
            Pool::Blueprints => &self.blueprints[tier.index()],
        }
    }

    pub fn weights(&self, pool: Pool) -> &TierWeights {
        match pool {
            Pool::Items => &self.item_weights,
            Pool::Blueprints => &self.blueprint_weights,
        }
    }

    /// Number of distinct entries across both pools.
    pub fn item_count(&self) -> usize {
        self.items
            .iter()
            .chain(self.blueprints.iter())
            .map(TierBucket::len)
            .sum()
    }

    /// Bucket sizes per tier for both pools.
    pub fn report(&self) -> Vec<TierReport> {
        Rarity::ALL
            .iter()
            .map(|&tier| TierReport {
                tier,
                items: self.items[tier.index()].len(),
                blueprints: self.blueprints[tier.index()].len(),
                item_weight: self.item_weights.tier_weight(tier),
            })
            .collect()
    }
}

/// One row of [`ContainerIndex::report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierReport {
    pub tier: Rarity,
    pub items: usize,
    pub blueprints: usize,
    pub item_weight: u64,
}

/// Owned index of every enabled container type.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    containers: HashMap<String, ContainerIndex>,
    built: bool,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute buckets and weights for every enabled profile.
    pub fn rebuild<C: ItemCatalog + ?Sized>(&mut self, catalog: &C, config: &LootConfig) {
        self.containers.clear();
        for kind in config.containers.keys() {
            self.refresh(catalog, config, kind);
        }
        self.built = true;
    }

    /// Recompute one container type, leaving the others as they are. A
    /// missing or disabled profile is dropped from the index.
    pub fn refresh<C: ItemCatalog + ?Sized>(&mut self, catalog: &C, config: &LootConfig, kind: &str) {
        let Some(profile) = config.containers.get(kind).filter(|p| p.enabled) else {
            self.containers.remove(kind);
            return;
        };
        let keys = profile.items.keys().map(String::as_str);
        let (index, unknown) = ContainerIndex::build(
            catalog,
            keys,
            config.settings.rarity_base,
            config.settings.rarity_scale,
        );
        if !unknown.is_empty() {
            warn!(container = %kind, skipped = ?unknown, "unknown items in container profile");
        }
        debug!(
            container = %kind,
            items = index.item_count(),
            total_weight = index.weights(Pool::Items).total(),
            "indexed container"
        );
        self.containers.insert(kind.to_owned(), index);
    }

    pub fn invalidate(&mut self) {
        self.containers.clear();
        self.built = false;
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn get(&self, kind: &str) -> Option<&ContainerIndex> {
        self.containers.get(kind)
    }

    /// Container types currently indexed.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }
}
