//! Persisted loot configuration: container profiles, loot groups, blacklist
//! and global settings.
//!
//! Documents are JSON. Maps are [`IndexMap`]s so item order survives a
//! load/save cycle; group sampling walks items in that order.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::LootError;
use crate::reconcile::reconcile;
use crate::sampler::{DEFAULT_RARITY_BASE, DEFAULT_RARITY_SCALE};
use crate::table::CumulativeTable;

/// Inclusive `min..=max` range as written in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// `min <= max` form of the range. An inverted range collapses to `min`.
    pub const fn normalized(self) -> Self {
        if self.min > self.max {
            Self::fixed(self.min)
        } else {
            self
        }
    }

    /// Bounds in ascending order, whichever way they were written.
    pub fn ordered(self) -> (u32, u32) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    /// Sample inside the normalized range (`min` wins when inverted).
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let r = self.normalized();
        if r.max > r.min {
            rng.random_range(r.min..=r.max)
        } else {
            r.min
        }
    }

    /// Sample between the two bounds taken in either order.
    pub fn sample_either<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let (lo, hi) = self.ordered();
        rng.random_range(lo..=hi)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::fixed(1)
    }
}

/// Global tuning shared by every container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Chance (0..=100) that a fallback pick draws from the blueprint pool.
    pub blueprint_probability: f64,
    /// Whether fallback picks may repeat an item within one container.
    pub allow_duplicate_items: bool,
    pub loot_multiplier: f64,
    pub scrap_multiplier: f64,
    pub normalize_group_probabilities: bool,
    pub max_container_slots: usize,
    pub rarity_base: u32,
    pub rarity_scale: u64,
    /// Failed slot attempts tolerated per fill.
    pub fill_retry_budget: u32,
    /// Fallback draws per requested item before giving up on a slot.
    pub fallback_retries_per_item: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blueprint_probability: 11.0,
            allow_duplicate_items: false,
            loot_multiplier: 1.0,
            scrap_multiplier: 1.0,
            normalize_group_probabilities: true,
            max_container_slots: 36,
            rarity_base: DEFAULT_RARITY_BASE,
            rarity_scale: DEFAULT_RARITY_SCALE,
            fill_retry_budget: 10,
            fallback_retries_per_item: 10,
        }
    }
}

/// A container profile's reference to a named loot group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupImport {
    pub name: String,
    /// Chance (1..=100) that the group is drawn from for a slot.
    #[serde(default = "full_probability")]
    pub probability: f64,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl GroupImport {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
            enabled: true,
        }
    }
}

/// Amount and cosmetic overrides for an ungrouped item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootEntry {
    pub amount: Range,
    pub skin: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl LootEntry {
    pub fn new(amount: Range) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }
}

/// Per-container-type configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerProfile {
    pub enabled: bool,
    pub item_count: Range,
    pub scrap: Range,
    pub max_blueprints: u32,
    /// Cap on group-sourced items per fill; `0` means no cap.
    pub max_groups: u32,
    pub groups: Vec<GroupImport>,
    /// Ungrouped items eligible for rarity-weighted fallback picks.
    pub items: IndexMap<String, LootEntry>,
}

impl Default for ContainerProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            item_count: Range::new(2, 6),
            scrap: Range::fixed(0),
            max_blueprints: 2,
            max_groups: 0,
            groups: Vec::new(),
            items: IndexMap::new(),
        }
    }
}

/// One item of a loot group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupEntry {
    /// Chance (0..=100) of this item when the group is sampled.
    pub probability: f64,
    pub amount: Range,
    pub skin: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl GroupEntry {
    pub fn new(probability: f64, amount: Range) -> Self {
        Self {
            probability,
            amount,
            ..Self::default()
        }
    }
}

impl Default for GroupEntry {
    fn default() -> Self {
        Self {
            probability: 0.0,
            amount: Range::default(),
            skin: 0,
            display_name: None,
        }
    }
}

/// A named, reusable set of items with independent probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootGroup {
    pub enabled: bool,
    /// Whether items from this group may repeat within one container.
    pub allow_duplicates: bool,
    pub items: IndexMap<String, GroupEntry>,
}

impl Default for LootGroup {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_duplicates: false,
            items: IndexMap::new(),
        }
    }
}

impl LootGroup {
    /// Sum of item probabilities.
    pub fn probability_sum(&self) -> f64 {
        self.items.values().map(|e| e.probability).sum()
    }

    /// Running probability totals in item order.
    pub fn cumulative_table(&self) -> CumulativeTable {
        CumulativeTable::new(self.items.values().map(|e| e.probability))
    }
}

/// The whole persisted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    pub settings: Settings,
    pub containers: IndexMap<String, ContainerProfile>,
    pub groups: IndexMap<String, LootGroup>,
    pub blacklist: BTreeSet<String>,
}

impl LootConfig {
    pub fn from_json(json: &str) -> Result<Self, LootError> {
        let mut value: Value = serde_json::from_str(json)?;
        upgrade_document(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String, LootError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fill every missing field of a raw config document with its default.
///
/// Profiles, groups and their items are keyed by user-chosen names, so each
/// entry is reconciled against its own default. Group imports are reconciled
/// too, except for `name`, which has no sensible default. Returns `true` if
/// anything was added or replaced.
pub fn upgrade_document(doc: &mut Value) -> bool {
    let mut changed = reconcile(doc, &default_value::<LootConfig>());

    let profile = default_value::<ContainerProfile>();
    let loot_entry = default_value::<LootEntry>();
    let import = import_defaults();
    let group = default_value::<LootGroup>();
    let group_entry = default_value::<GroupEntry>();

    let Value::Object(root) = doc else {
        return changed;
    };
    if let Some(Value::Object(containers)) = root.get_mut("containers") {
        for entry in containers.values_mut() {
            changed |= reconcile(entry, &profile);
            changed |= reconcile_items(entry, &loot_entry);
            if let Some(Value::Array(imports)) = entry.get_mut("groups") {
                for i in imports.iter_mut().filter(|i| i.is_object()) {
                    changed |= reconcile(i, &import);
                }
            }
        }
    }
    if let Some(Value::Object(groups)) = root.get_mut("groups") {
        for entry in groups.values_mut() {
            changed |= reconcile(entry, &group);
            changed |= reconcile_items(entry, &group_entry);
        }
    }
    changed
}

/// Reconcile every value of `entry.items` against `defaults`.
fn reconcile_items(entry: &mut Value, defaults: &Value) -> bool {
    let Some(Value::Object(items)) = entry.get_mut("items") else {
        return false;
    };
    items
        .values_mut()
        .fold(false, |changed, item| reconcile(item, defaults) | changed)
}

fn import_defaults() -> Value {
    let mut value = serde_json::to_value(GroupImport::new(String::new(), full_probability()))
        .unwrap_or(Value::Null);
    if let Value::Object(fields) = &mut value {
        fields.remove("name");
    }
    value
}

fn default_value<T: Default + Serialize>() -> Value {
    serde_json::to_value(T::default()).unwrap_or(Value::Null)
}

fn full_probability() -> f64 {
    100.0
}

fn enabled() -> bool {
    true
}

/// Load/save contract for the configuration document.
pub trait ConfigStore {
    fn load(&self) -> Result<LootConfig, LootError>;
    fn save(&self, config: &LootConfig) -> Result<(), LootError>;
}

/// [`ConfigStore`] backed by a pretty-printed JSON file.
///
/// Loading never fails on bad content: an unreadable document is moved aside
/// to `<file>.bak` and replaced with defaults.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a corrupt document is moved before defaults are written.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn regenerate(&self, reason: &str) -> Result<LootConfig, LootError> {
        let backup = self.backup_path();
        fs::rename(&self.path, &backup)?;
        warn!(
            path = %self.path.display(),
            backup = %backup.display(),
            reason,
            "loot config unreadable, regenerating defaults"
        );
        let config = LootConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<LootConfig, LootError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "no loot config found, writing defaults");
            let config = LootConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&self.path)?;
        let mut value: Value = match serde_json::from_str(&contents) {
            Ok(v) => v,
            Err(e) => return self.regenerate(&e.to_string()),
        };

        let changed = upgrade_document(&mut value);
        let config: LootConfig = match serde_json::from_value(value) {
            Ok(c) => c,
            Err(e) => return self.regenerate(&e.to_string()),
        };

        if changed {
            info!(path = %self.path.display(), "loot config gained new default fields");
            self.save(&config)?;
        }
        Ok(config)
    }

    fn save(&self, config: &LootConfig) -> Result<(), LootError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, config.to_json()?)?;
        Ok(())
    }
}
