//! The engine's view of a container and the item requests it fills it with.

use serde::{Deserialize, Serialize};

use crate::catalog::BLUEPRINT_ITEM;

/// An abstract item for the host to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRequest {
    /// Catalog identifier; the blueprint target when `blueprint` is set.
    pub item: String,
    pub amount: u32,
    #[serde(default)]
    pub skin: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub blueprint: bool,
}

impl ItemRequest {
    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
            skin: 0,
            display_name: None,
            blueprint: false,
        }
    }

    /// A blueprint for `target`.
    pub fn blueprint(target: impl Into<String>) -> Self {
        Self {
            blueprint: true,
            ..Self::new(target, 1)
        }
    }

    pub fn with_skin(mut self, skin: u64) -> Self {
        self.skin = skin;
        self
    }

    pub fn with_display_name(mut self, name: Option<String>) -> Self {
        self.display_name = name;
        self
    }

    /// Identifier of the item that ends up in the container.
    pub fn item_id(&self) -> &str {
        if self.blueprint {
            BLUEPRINT_ITEM
        } else {
            &self.item
        }
    }

    pub fn blueprint_target(&self) -> Option<&str> {
        self.blueprint.then_some(self.item.as_str())
    }
}

/// Host-side container the engine fills.
pub trait LootContainer {
    /// Drop all current contents.
    fn clear(&mut self);

    fn set_capacity(&mut self, slots: usize);

    /// Place one item. Returns `false` if it did not fit; the item is then
    /// discarded.
    fn insert(&mut self, item: ItemRequest) -> bool;

    /// Number of occupied slots.
    fn occupied(&self) -> usize;

    /// Flag the container for persistence and replication.
    fn mark_dirty(&mut self) {}
}

/// A plain slot vector implementing [`LootContainer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotContainer {
    slots: Vec<ItemRequest>,
    capacity: usize,
    dirty: bool,
}

impl SlotContainer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            dirty: false,
        }
    }

    pub fn items(&self) -> &[ItemRequest] {
        &self.slots
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl LootContainer for SlotContainer {
    fn clear(&mut self) {
        self.slots.clear();
    }

    fn set_capacity(&mut self, slots: usize) {
        self.capacity = slots;
    }

    fn insert(&mut self, item: ItemRequest) -> bool {
        if self.slots.len() >= self.capacity {
            return false;
        }
        self.slots.push(item);
        true
    }

    fn occupied(&self) -> usize {
        self.slots.len()
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
