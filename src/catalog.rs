//! Item catalog collaborator and configured-identifier parsing.
//!
//! The engine never owns item definitions. It reads them through
//! [`ItemCatalog`], which a host backs with its own item registry.
//! [`MemoryCatalog`] is a map-backed implementation for tools and tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Suffix that marks a configured identifier as a blueprint request.
pub const BLUEPRINT_SUFFIX: &str = ".blueprint";

/// Identifier of the item that carries a blueprint target.
pub const BLUEPRINT_ITEM: &str = "blueprintbase";

/// Identifier of the bonus currency stack.
pub const SCRAP_ITEM: &str = "scrap";

/// Ordinal rarity tier, common first.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Exotic,
}

impl Rarity {
    /// All tiers in ordinal order.
    pub const ALL: &'static [Rarity] = &[
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Exotic,
    ];

    pub const COUNT: usize = 5;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// One entry of the external item catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub blueprint_eligible: bool,
    #[serde(default)]
    pub blueprint_researchable: bool,
}

impl ItemDefinition {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            rarity,
            blueprint_eligible: false,
            blueprint_researchable: false,
        }
    }

    /// Mark the item as having a blueprint.
    pub fn with_blueprint(mut self, researchable: bool) -> Self {
        self.blueprint_eligible = true;
        self.blueprint_researchable = researchable;
        self
    }

    /// Whether a blueprint for this item may be handed out.
    pub fn blueprint_allowed(&self) -> bool {
        self.blueprint_eligible && self.blueprint_researchable
    }
}

/// Read-only item lookup provided by the host.
pub trait ItemCatalog {
    fn lookup(&self, id: &str) -> Option<&ItemDefinition>;

    fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }
}

/// Map-backed [`ItemCatalog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
    items: HashMap<String, ItemDefinition>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ItemDefinition>,
    {
        Self {
            items: items.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// Insert or replace a definition, returning the previous one.
    pub fn insert(&mut self, def: ItemDefinition) -> Option<ItemDefinition> {
        self.items.insert(def.id.clone(), def)
    }

    pub fn remove(&mut self, id: &str) -> Option<ItemDefinition> {
        self.items.remove(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemCatalog for MemoryCatalog {
    fn lookup(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }
}

/// A configured identifier resolved to its catalog identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemKey<'a> {
    pub id: &'a str,
    pub blueprint: bool,
}

/// Parse a configured identifier such as `rifle.ak.blueprint [2]`.
///
/// The instance tag is removed first, then the blueprint suffix.
pub fn parse_key(raw: &str) -> ItemKey<'_> {
    let id = strip_instance_tag(raw);
    match id.strip_suffix(BLUEPRINT_SUFFIX) {
        Some(base) => ItemKey {
            id: base,
            blueprint: true,
        },
        None => ItemKey {
            id,
            blueprint: false,
        },
    }
}

/// Remove a trailing `[N]` instance tag.
///
/// Config templates repeat an identifier as `ammo [1]`, `ammo [2]` so the
/// same item can appear with different settings; the tag is not part of the
/// catalog identifier.
pub fn strip_instance_tag(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    if let Some(body) = trimmed.strip_suffix(']') {
        if let Some(open) = body.rfind('[') {
            let digits = &body[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return body[..open].trim_end();
            }
        }
    }
    trimmed
}
