//! The loot engine: owns configuration, derived caches and the random source.

use std::collections::HashMap;

use indexmap::IndexMap;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{info, warn};

use crate::balance::{self, Normalization};
use crate::catalog::{ItemCatalog, parse_key};
use crate::config::{ContainerProfile, GroupEntry, LootConfig, LootGroup};
use crate::container::LootContainer;
use crate::error::LootError;
use crate::index::{CatalogIndex, ContainerIndex, Pool, TierReport};
use crate::populate::{FillOutcome, Populator};
use crate::sampler::TierWeights;
use crate::table::CumulativeTable;

/// What a rebuild changed in the loot groups.
///
/// Validation and normalization rewrite group items in place; a host that
/// persists configuration should save when [`RebuildReport::is_dirty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    /// `(group, removed item keys)` for groups that lost unknown items.
    pub removed: Vec<(String, Vec<String>)>,
    /// Groups whose probabilities were rescaled.
    pub normalized: Vec<String>,
    /// Groups with no valid items left.
    pub empty: Vec<String>,
    /// `(container, group)` imports that name a group that does not exist.
    pub missing_imports: Vec<(String, String)>,
}

impl RebuildReport {
    pub fn is_dirty(&self) -> bool {
        !self.removed.is_empty() || !self.normalized.is_empty()
    }
}

/// Decides container contents from profiles, loot groups and the catalog.
///
/// All caches are owned here and only rebuilt through [`LootEngine::rebuild`]
/// or the mutation methods, which invalidate what they touch. The engine is
/// meant to be driven from one thread; give each thread its own engine if
/// fills must run in parallel.
#[derive(Debug)]
pub struct LootEngine<C, R = StdRng> {
    catalog: C,
    config: LootConfig,
    index: CatalogIndex,
    tables: HashMap<String, CumulativeTable>,
    rng: R,
}

impl<C: ItemCatalog> LootEngine<C, StdRng> {
    /// Engine with a deterministic random source.
    pub fn seeded(catalog: C, config: LootConfig, seed: u64) -> Self {
        Self::new(catalog, config, StdRng::seed_from_u64(seed))
    }

    /// Engine seeded from the operating system.
    pub fn from_os_rng(catalog: C, config: LootConfig) -> Self {
        Self::new(catalog, config, StdRng::from_os_rng())
    }
}

impl<C: ItemCatalog, R: Rng> LootEngine<C, R> {
    /// Build the engine and its caches.
    pub fn new(catalog: C, config: LootConfig, rng: R) -> Self {
        let mut engine = Self {
            catalog,
            config,
            index: CatalogIndex::new(),
            tables: HashMap::new(),
            rng,
        };
        engine.rebuild();
        engine
    }

    pub fn config(&self) -> &LootConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Drop every derived cache. The next fill rebuilds.
    pub fn invalidate(&mut self) {
        self.index.invalidate();
        self.tables.clear();
    }

    /// Validate and balance every loot group, then rebuild the catalog index
    /// and the cumulative tables.
    pub fn rebuild(&mut self) -> RebuildReport {
        let mut report = RebuildReport::default();
        let normalize = self.config.settings.normalize_group_probabilities;

        for (name, group) in self.config.groups.iter_mut() {
            let removed = balance::validate(name, group, &self.catalog);
            if !removed.is_empty() {
                report.removed.push((name.clone(), removed));
            }
            if group.items.is_empty() {
                warn!(group = %name, "loot group has no valid items");
                report.empty.push(name.clone());
                continue;
            }
            if normalize {
                if let Normalization::Adjusted { previous_sum } = balance::normalize(group) {
                    info!(group = %name, previous_sum, "rebalanced loot group probabilities");
                    report.normalized.push(name.clone());
                }
            }
        }

        for (kind, profile) in &self.config.containers {
            for import in &profile.groups {
                if !self.config.groups.contains_key(&import.name) {
                    warn!(container = %kind, group = %import.name, "container imports unknown loot group");
                    report
                        .missing_imports
                        .push((kind.clone(), import.name.clone()));
                }
            }
        }

        self.index.rebuild(&self.catalog, &self.config);
        self.tables = self
            .config
            .groups
            .iter()
            .map(|(name, group)| (name.clone(), group.cumulative_table()))
            .collect();

        info!(
            containers = self.config.containers.len(),
            groups = self.config.groups.len(),
            "loot caches rebuilt"
        );
        report
    }

    /// Fill `container` as a `kind` container.
    ///
    /// Returns an outcome with `processed == false`, leaving the container
    /// untouched, when no enabled profile exists for `kind`.
    pub fn fill<L: LootContainer + ?Sized>(&mut self, kind: &str, container: &mut L) -> FillOutcome {
        if !self.index.is_built() {
            self.rebuild();
        }
        let Some(profile) = self.config.containers.get(kind).filter(|p| p.enabled) else {
            return FillOutcome::skipped();
        };
        Populator {
            profile,
            index: self.index.get(kind),
            groups: &self.config.groups,
            tables: &mut self.tables,
            catalog: &self.catalog,
            settings: &self.config.settings,
            blacklist: &self.config.blacklist,
        }
        .fill(container, &mut self.rng)
    }

    /// Swap the item catalog and rebuild.
    pub fn replace_catalog(&mut self, catalog: C) -> RebuildReport {
        self.catalog = catalog;
        self.rebuild()
    }

    /// Replace all container profiles, as after a remote import.
    pub fn replace_containers(&mut self, containers: IndexMap<String, ContainerProfile>) -> RebuildReport {
        self.config.containers = containers;
        self.rebuild()
    }

    /// Replace all loot groups, as after a remote import.
    pub fn replace_groups(&mut self, groups: IndexMap<String, LootGroup>) -> RebuildReport {
        self.config.groups = groups;
        self.rebuild()
    }

    /// Replace the whole configuration.
    pub fn replace_config(&mut self, config: LootConfig) -> RebuildReport {
        self.config = config;
        self.rebuild()
    }

    pub fn set_container_enabled(&mut self, kind: &str, enabled: bool) -> Result<(), LootError> {
        let profile = self
            .config
            .containers
            .get_mut(kind)
            .ok_or_else(|| LootError::UnknownContainer(kind.to_owned()))?;
        if profile.enabled != enabled {
            profile.enabled = enabled;
            if self.index.is_built() {
                self.index.refresh(&self.catalog, &self.config, kind);
            }
        }
        Ok(())
    }

    pub fn set_group_enabled(&mut self, name: &str, enabled: bool) -> Result<(), LootError> {
        self.group_mut(name)?.enabled = enabled;
        Ok(())
    }

    pub fn add_group(&mut self, name: &str, group: LootGroup) -> Result<(), LootError> {
        if self.config.groups.contains_key(name) {
            return Err(LootError::GroupExists(name.to_owned()));
        }
        let mut group = group;
        balance::validate(name, &mut group, &self.catalog);
        if group.items.is_empty() {
            return Err(LootError::EmptyGroup(name.to_owned()));
        }
        if self.config.settings.normalize_group_probabilities {
            balance::normalize(&mut group);
        }
        self.tables.insert(name.to_owned(), group.cumulative_table());
        self.config.groups.insert(name.to_owned(), group);
        Ok(())
    }

    pub fn remove_group(&mut self, name: &str) -> Result<LootGroup, LootError> {
        self.tables.remove(name);
        self.config
            .groups
            .shift_remove(name)
            .ok_or_else(|| LootError::UnknownGroup(name.to_owned()))
    }

    /// Insert or replace one group item. The group's table goes stale and is
    /// rebuilt on its next draw.
    pub fn set_group_item(&mut self, name: &str, key: &str, entry: GroupEntry) -> Result<(), LootError> {
        if !entry.probability.is_finite() || !(0.0..=100.0).contains(&entry.probability) {
            return Err(LootError::InvalidProbability {
                item: key.to_owned(),
                value: entry.probability,
            });
        }
        if !self.catalog.contains(parse_key(key).id) {
            warn!(group = %name, item = %key, "refusing unknown item");
            return Err(LootError::UnknownItem(key.to_owned()));
        }
        self.group_mut(name)?.items.insert(key.to_owned(), entry);
        self.tables.remove(name);
        Ok(())
    }

    pub fn remove_group_item(&mut self, name: &str, key: &str) -> Result<Option<GroupEntry>, LootError> {
        let removed = self.group_mut(name)?.items.shift_remove(key);
        self.tables.remove(name);
        Ok(removed)
    }

    /// Rescale one group's probabilities to sum to 100.
    pub fn normalize_group(&mut self, name: &str) -> Result<Normalization, LootError> {
        let result = balance::normalize(self.group_mut(name)?);
        self.tables.remove(name);
        Ok(result)
    }

    /// Returns `false` if the item was already blacklisted.
    pub fn add_to_blacklist(&mut self, id: &str) -> bool {
        self.config.blacklist.insert(id.to_owned())
    }

    pub fn remove_from_blacklist(&mut self, id: &str) -> bool {
        self.config.blacklist.remove(id)
    }

    /// Container types with an indexed, enabled profile.
    pub fn watched_containers(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.index.kinds().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn container_index(&self, kind: &str) -> Option<&ContainerIndex> {
        self.index.get(kind)
    }

    /// Distinct fallback items known for `kind`.
    pub fn item_count_for(&self, kind: &str) -> usize {
        self.index.get(kind).map_or(0, ContainerIndex::item_count)
    }

    pub fn tier_weights(&self, kind: &str) -> Option<TierWeights> {
        self.index.get(kind).map(|i| *i.weights(Pool::Items))
    }

    /// Per-tier bucket sizes for `kind`.
    pub fn container_report(&self, kind: &str) -> Option<Vec<TierReport>> {
        self.index.get(kind).map(ContainerIndex::report)
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut LootGroup, LootError> {
        self.config
            .groups
            .get_mut(name)
            .ok_or_else(|| LootError::UnknownGroup(name.to_owned()))
    }
}
