//! Item selection: named-group draws and rarity-weighted fallback draws.

use rand::Rng;

use crate::IndexSampler;
use crate::catalog::{ItemCatalog, Rarity, parse_key};
use crate::config::{ContainerProfile, LootGroup, Settings};
use crate::container::ItemRequest;
use crate::index::{ContainerIndex, Pool};
use crate::table::CumulativeTable;

/// Draw one item from `group`.
///
/// An empty `table` is treated as stale and rebuilt from the group first.
/// Returns `None` when the roll lands past the group's probability sum.
/// A `.blueprint` entry whose blueprint the catalog does not allow hands out
/// the plain item instead.
pub fn sample_from_group<C, R>(
    group: &LootGroup,
    table: &mut CumulativeTable,
    catalog: &C,
    rng: &mut R,
) -> Option<ItemRequest>
where
    C: ItemCatalog + ?Sized,
    R: Rng + ?Sized,
{
    if table.is_empty() {
        *table = group.cumulative_table();
    }
    let index = table.sample_index(rng)?;
    let (key, entry) = group.items.get_index(index)?;

    let parsed = parse_key(key);
    let blueprint = parsed.blueprint
        && catalog
            .lookup(parsed.id)
            .is_some_and(|def| def.blueprint_allowed());
    let request = if blueprint {
        ItemRequest::blueprint(parsed.id)
    } else {
        let amount = entry.amount.sample_either(rng);
        if amount == 0 {
            return None;
        }
        ItemRequest::new(parsed.id, amount)
    };
    Some(
        request
            .with_skin(entry.skin)
            .with_display_name(entry.display_name.clone()),
    )
}

/// Rarity-weighted draw from a container's ungrouped items.
pub struct FallbackSampler<'a, C: ?Sized> {
    pub index: &'a ContainerIndex,
    pub profile: &'a ContainerProfile,
    pub catalog: &'a C,
    pub settings: &'a Settings,
}

impl<C: ItemCatalog + ?Sized> FallbackSampler<'_, C> {
    /// Draw one item, retrying transient misses up to
    /// `fallback_retries_per_item * item_count` times.
    ///
    /// With `block_blueprints` the blueprint pool is never chosen. An empty
    /// plain pool gives up at once since no retry can fix it.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        item_count: usize,
        block_blueprints: bool,
        rng: &mut R,
    ) -> Option<ItemRequest> {
        let attempts = (self.settings.fallback_retries_per_item as usize)
            .saturating_mul(item_count.max(1));

        for _ in 0..attempts {
            let pool = if !block_blueprints
                && rng.random_range(0.0..100.0) < self.settings.blueprint_probability
            {
                Pool::Blueprints
            } else {
                Pool::Items
            };

            let weights = self.index.weights(pool);
            if weights.total() == 0 {
                if pool == Pool::Items {
                    return None;
                }
                continue;
            }

            let Some(tier) = weights.sample_index(rng).and_then(Rarity::from_index) else {
                continue;
            };
            let Some(key) = self.index.bucket(pool, tier).sample(rng) else {
                continue;
            };
            if let Some(request) = self.resolve(pool, key, rng) {
                return Some(request);
            }
        }
        None
    }

    /// Turn a bucket key back into a request, checking the catalog again.
    fn resolve<R: Rng + ?Sized>(&self, pool: Pool, key: &str, rng: &mut R) -> Option<ItemRequest> {
        let id = parse_key(key).id;
        let def = self.catalog.lookup(id)?;
        let entry = self.profile.items.get(key);

        let request = match pool {
            Pool::Blueprints => {
                if !def.blueprint_allowed() {
                    return None;
                }
                ItemRequest::blueprint(id)
            }
            Pool::Items => {
                let amount = entry.map_or(1, |e| e.amount.sample_either(rng));
                let amount = scale_amount(amount, self.settings.loot_multiplier);
                if amount == 0 {
                    return None;
                }
                ItemRequest::new(id, amount)
            }
        };

        Some(match entry {
            Some(e) => request
                .with_skin(e.skin)
                .with_display_name(e.display_name.clone()),
            None => request,
        })
    }
}

/// Apply a quantity multiplier, rounding to the nearest whole amount.
///
/// Negative or non-finite multipliers leave the amount unchanged.
pub fn scale_amount(amount: u32, multiplier: f64) -> u32 {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return amount;
    }
    (f64::from(amount) * multiplier).round().min(f64::from(u32::MAX)) as u32
}
