//! Filling one container from its profile.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use rand::Rng;
use tracing::debug;

use crate::catalog::{ItemCatalog, SCRAP_ITEM};
use crate::config::{ContainerProfile, LootGroup, Settings};
use crate::container::{ItemRequest, LootContainer};
use crate::index::ContainerIndex;
use crate::select::{FallbackSampler, sample_from_group, scale_amount};
use crate::table::CumulativeTable;

/// Slot and retry accounting for one fill.
///
/// Every failed attempt, on any slot, spends from one shared retry budget
/// and leaves the slot open. The fill stops when all slots are taken or the
/// budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillBudget {
    remaining_slots: usize,
    retry_budget: u32,
}

impl FillBudget {
    pub const fn new(slots: usize, retry_budget: u32) -> Self {
        Self {
            remaining_slots: slots,
            retry_budget,
        }
    }

    /// Whether another attempt may be made.
    pub const fn should_continue(&self) -> bool {
        self.remaining_slots > 0 && self.retry_budget > 0
    }

    pub const fn is_exhausted(&self) -> bool {
        self.retry_budget == 0
    }

    /// A candidate took a slot.
    pub fn accept(&mut self) {
        self.remaining_slots = self.remaining_slots.saturating_sub(1);
    }

    /// An attempt failed; the slot stays open.
    pub fn reject(&mut self) {
        self.retry_budget = self.retry_budget.saturating_sub(1);
    }

    pub const fn remaining_slots(&self) -> usize {
        self.remaining_slots
    }

    pub const fn retry_budget(&self) -> u32 {
        self.retry_budget
    }
}

/// Where a candidate came from; decides its duplicate policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Group { allow_duplicates: bool },
    Fallback,
}

/// Result of a fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOutcome {
    /// A profile was found and processing ran. Says nothing about how full
    /// the container ended up.
    pub processed: bool,
    /// Item count drawn for this fill.
    pub requested: usize,
    /// Items placed in the container, bonus scrap excluded.
    pub added: usize,
    /// Accepted candidates, and a bonus scrap stack, removed by the blacklist.
    pub blacklisted: usize,
    /// Candidates that did not fit.
    pub overflowed: usize,
    /// Bonus scrap placed; zero if none.
    pub scrap: u32,
    /// Retry budget left when the loop ended.
    pub retries_left: u32,
}

impl FillOutcome {
    pub const fn skipped() -> Self {
        Self {
            processed: false,
            requested: 0,
            added: 0,
            blacklisted: 0,
            overflowed: 0,
            scrap: 0,
            retries_left: 0,
        }
    }
}

/// Candidates accepted so far in one fill.
#[derive(Debug, Default)]
struct Picks {
    accepted: Vec<ItemRequest>,
    seen: HashSet<(bool, String)>,
    blueprints: u32,
    from_groups: u32,
}

impl Picks {
    fn admits(&self, request: &ItemRequest, origin: Origin, global_dups: bool, max_blueprints: u32) -> bool {
        if request.blueprint && self.blueprints >= max_blueprints {
            return false;
        }
        let allow = match origin {
            Origin::Group { allow_duplicates } => allow_duplicates,
            Origin::Fallback => global_dups,
        };
        allow || !self.seen.contains(&(request.blueprint, request.item.clone()))
    }

    fn accept(&mut self, request: ItemRequest, origin: Origin) {
        self.seen.insert((request.blueprint, request.item.clone()));
        if request.blueprint {
            self.blueprints += 1;
        }
        if matches!(origin, Origin::Group { .. }) {
            self.from_groups += 1;
        }
        self.accepted.push(request);
    }
}

/// Everything one fill reads, borrowed from the engine.
pub struct Populator<'a, C: ?Sized> {
    pub profile: &'a ContainerProfile,
    pub index: Option<&'a ContainerIndex>,
    pub groups: &'a IndexMap<String, LootGroup>,
    pub tables: &'a mut HashMap<String, CumulativeTable>,
    pub catalog: &'a C,
    pub settings: &'a Settings,
    pub blacklist: &'a BTreeSet<String>,
}

impl<C: ItemCatalog + ?Sized> Populator<'_, C> {
    /// Clear `container` and fill it from the profile.
    pub fn fill<L, R>(mut self, container: &mut L, rng: &mut R) -> FillOutcome
    where
        L: LootContainer + ?Sized,
        R: Rng + ?Sized,
    {
        let mut item_count = self.profile.item_count.sample(rng) as usize;
        let available = self.index.map_or(0, ContainerIndex::item_count);
        if available > 0 && available < item_count {
            item_count = available;
        }

        container.clear();
        container.set_capacity(self.settings.max_container_slots);

        let mut budget = FillBudget::new(item_count, self.settings.fill_retry_budget);
        let mut picks = Picks::default();

        while budget.should_continue() {
            let Some((request, origin)) = self.candidate(&picks, item_count, rng) else {
                budget.reject();
                continue;
            };
            if !picks.admits(
                &request,
                origin,
                self.settings.allow_duplicate_items,
                self.profile.max_blueprints,
            ) {
                budget.reject();
                continue;
            }
            picks.accept(request, origin);
            budget.accept();
        }

        let before = picks.accepted.len();
        picks
            .accepted
            .retain(|r| !self.blacklist.contains(r.item_id()));
        let mut blacklisted = before - picks.accepted.len();

        let mut added = 0;
        let mut overflowed = 0;
        for request in picks.accepted {
            if container.insert(request) {
                added += 1;
            } else {
                overflowed += 1;
            }
        }

        let mut scrap = scale_amount(self.profile.scrap.sample(rng), self.settings.scrap_multiplier);
        if scrap > 0 && self.blacklist.contains(SCRAP_ITEM) {
            blacklisted += 1;
            scrap = 0;
        }
        if scrap > 0 && !container.insert(ItemRequest::new(SCRAP_ITEM, scrap)) {
            scrap = 0;
        }

        container.set_capacity(container.occupied());
        container.mark_dirty();

        let outcome = FillOutcome {
            processed: true,
            requested: item_count,
            added,
            blacklisted,
            overflowed,
            scrap,
            retries_left: budget.retry_budget(),
        };
        debug!(?outcome, exhausted = budget.is_exhausted(), "container filled");
        outcome
    }

    /// Produce one candidate: every enabled group import gets a chance and
    /// the last one to produce an item wins; the fallback sampler runs only
    /// if no group produced anything.
    fn candidate<R: Rng + ?Sized>(
        &mut self,
        picks: &Picks,
        item_count: usize,
        rng: &mut R,
    ) -> Option<(ItemRequest, Origin)> {
        let mut found = None;

        let groups_open = self.profile.max_groups == 0 || picks.from_groups < self.profile.max_groups;
        if groups_open {
            for import in self.profile.groups.iter().filter(|g| g.enabled) {
                if rng.random_range(0.0..100.0) >= import.probability {
                    continue;
                }
                let Some(group) = self.groups.get(&import.name).filter(|g| g.enabled) else {
                    continue;
                };
                let table = self.tables.entry(import.name.clone()).or_default();
                if let Some(request) = sample_from_group(group, table, self.catalog, rng) {
                    let origin = Origin::Group {
                        allow_duplicates: group.allow_duplicates,
                    };
                    found = Some((request, origin));
                }
            }
        }

        if found.is_none() {
            let index = self.index?;
            let sampler = FallbackSampler {
                index,
                profile: self.profile,
                catalog: self.catalog,
                settings: self.settings,
            };
            let block_blueprints = picks.blueprints >= self.profile.max_blueprints;
            found = sampler
                .sample(item_count, block_blueprints, rng)
                .map(|r| (r, Origin::Fallback));
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_stops_when_retries_run_out() {
        let mut b = FillBudget::new(5, 10);
        let mut attempts = 0;
        while b.should_continue() {
            attempts += 1;
            b.reject();
        }
        assert_eq!(attempts, 10);
        assert!(b.is_exhausted());
        assert_eq!(b.remaining_slots(), 5);
    }

    #[test]
    fn budget_is_shared_across_slots() {
        let mut b = FillBudget::new(3, 2);
        b.accept();
        b.reject();
        b.accept();
        b.reject();
        assert!(!b.should_continue());
        assert_eq!(b.remaining_slots(), 1);
    }

    #[test]
    fn budget_stops_when_slots_are_filled() {
        let mut b = FillBudget::new(2, 10);
        b.accept();
        b.accept();
        assert!(!b.should_continue());
        assert_eq!(b.retry_budget(), 10);
    }

    #[test]
    fn duplicate_policy_depends_on_origin() {
        let mut picks = Picks::default();
        picks.accept(ItemRequest::new("wood", 1), Origin::Fallback);
        let again = ItemRequest::new("wood", 3);
        assert!(!picks.admits(&again, Origin::Fallback, false, 2));
        assert!(picks.admits(&again, Origin::Fallback, true, 2));
        assert!(picks.admits(&again, Origin::Group { allow_duplicates: true }, false, 2));
        assert!(!picks.admits(&again, Origin::Group { allow_duplicates: false }, true, 2));
    }

    #[test]
    fn blueprints_are_keyed_by_target_and_capped() {
        let mut picks = Picks::default();
        picks.accept(ItemRequest::blueprint("pistol"), Origin::Fallback);
        assert!(picks.admits(&ItemRequest::new("pistol", 1), Origin::Fallback, false, 2));
        assert!(!picks.admits(&ItemRequest::blueprint("pistol"), Origin::Fallback, false, 2));
        assert!(picks.admits(&ItemRequest::blueprint("rifle"), Origin::Fallback, false, 2));
        assert!(!picks.admits(&ItemRequest::blueprint("rifle"), Origin::Fallback, false, 1));
    }
}
