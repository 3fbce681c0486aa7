//! Loot group validation and probability normalization.

use tracing::warn;

use crate::catalog::{ItemCatalog, parse_key};
use crate::config::LootGroup;

/// Sums this close to 100 are left alone.
pub const BALANCE_TOLERANCE: f64 = 0.001;

/// Outcome of [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Probabilities already summed to 100.
    Balanced,
    /// Probabilities were rescaled from `previous_sum`.
    Adjusted { previous_sum: f64 },
    /// No items, or nothing to scale from; left untouched.
    Skipped,
}

/// Remove items the catalog does not know, returning their keys.
pub fn validate<C: ItemCatalog + ?Sized>(name: &str, group: &mut LootGroup, catalog: &C) -> Vec<String> {
    let removed: Vec<String> = group
        .items
        .keys()
        .filter(|key| !catalog.contains(parse_key(key).id))
        .cloned()
        .collect();
    if !removed.is_empty() {
        group.items.retain(|key, _| !removed.contains(key));
        warn!(group = %name, removed = ?removed, "dropped unknown items from loot group");
    }
    removed
}

/// Rescale probabilities so they sum to exactly 100.
///
/// Each probability is scaled and rounded to two decimals; the rounding
/// residual goes to the largest entry (first one on ties).
pub fn normalize(group: &mut LootGroup) -> Normalization {
    if group.items.is_empty() {
        return Normalization::Skipped;
    }
    let sum = group.probability_sum();
    if (100.0 - sum).abs() <= BALANCE_TOLERANCE {
        return Normalization::Balanced;
    }
    if !sum.is_finite() || sum <= 0.0 {
        return Normalization::Skipped;
    }

    let factor = 100.0 / sum;
    for entry in group.items.values_mut() {
        entry.probability = round2(entry.probability * factor);
    }

    let residual = 100.0 - group.probability_sum();
    let mut largest = 0;
    for (i, entry) in group.items.values().enumerate() {
        if entry.probability > group.items[largest].probability {
            largest = i;
        }
    }
    if let Some(entry) = group.items.values_mut().nth(largest) {
        entry.probability = round2(entry.probability + residual);
    }

    Normalization::Adjusted { previous_sum: sum }
}

#[inline]
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemDefinition, MemoryCatalog, Rarity};
    use crate::config::{GroupEntry, Range};

    fn group(items: &[(&str, f64)]) -> LootGroup {
        let mut g = LootGroup::default();
        for &(k, p) in items {
            g.items.insert(k.to_string(), GroupEntry::new(p, Range::fixed(1)));
        }
        g
    }

    fn probs(g: &LootGroup) -> Vec<f64> {
        g.items.values().map(|e| e.probability).collect()
    }

    #[test]
    fn residual_goes_to_first_largest() {
        let mut g = group(&[("a", 40.0), ("b", 40.0), ("c", 40.0)]);
        assert_eq!(normalize(&mut g), Normalization::Adjusted { previous_sum: 120.0 });
        let p = probs(&g);
        assert!((p[0] - 33.34).abs() < 1e-9, "{p:?}");
        assert!((p[1] - 33.33).abs() < 1e-9, "{p:?}");
        assert!((p[2] - 33.33).abs() < 1e-9, "{p:?}");
        assert!((g.probability_sum() - 100.0).abs() < 0.01);
    }

    #[test]
    fn under_summed_groups_scale_up() {
        let mut g = group(&[("a", 10.0), ("b", 30.0)]);
        normalize(&mut g);
        assert_eq!(probs(&g), [25.0, 75.0]);
    }

    #[test]
    fn balanced_and_empty_groups_are_left_alone() {
        let mut g = group(&[("a", 50.0), ("b", 50.0)]);
        assert_eq!(normalize(&mut g), Normalization::Balanced);
        let mut empty = LootGroup::default();
        assert_eq!(normalize(&mut empty), Normalization::Skipped);
        let mut zero = group(&[("a", 0.0)]);
        assert_eq!(normalize(&mut zero), Normalization::Skipped);
    }

    #[test]
    fn validate_strips_unknown_items_and_keeps_order() {
        let catalog = MemoryCatalog::from_items([
            ItemDefinition::new("a", "A", Rarity::Common),
            ItemDefinition::new("c", "C", Rarity::Common).with_blueprint(true),
        ]);
        let mut g = group(&[("a [1]", 10.0), ("ghost", 10.0), ("c.blueprint", 10.0)]);
        let removed = validate("test", &mut g, &catalog);
        assert_eq!(removed, ["ghost"]);
        let keys: Vec<&str> = g.items.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a [1]", "c.blueprint"]);
    }
}
