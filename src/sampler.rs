use rand::Rng;

use crate::{IndexSampler, catalog::Rarity, table::CumulativeTable};

/// Default exponent base for rarity weights.
pub const DEFAULT_RARITY_BASE: u32 = 2;

/// Default integer scale for rarity weights.
pub const DEFAULT_RARITY_SCALE: u64 = 1000;

/// Rarity-tier weights for one pool of a container.
///
/// Each tier has a per-item weight of `base^(4 - tier) * scale`; a tier's
/// share of the pool is that weight times the number of items in its bucket.
/// Empty buckets contribute nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierWeights {
    per_item: [u64; Rarity::COUNT],
    counts: [usize; Rarity::COUNT],
    total: u64,
}

impl TierWeights {
    pub fn new(base: u32, scale: u64, counts: [usize; Rarity::COUNT]) -> Self {
        let per_item = Self::per_item(base, scale);
        let total = per_item
            .iter()
            .zip(counts.iter())
            .fold(0u64, |acc, (&w, &n)| {
                acc.saturating_add(w.saturating_mul(n as u64))
            });
        Self {
            per_item,
            counts,
            total,
        }
    }

    /// Per-item weight of every tier.
    pub fn per_item(base: u32, scale: u64) -> [u64; Rarity::COUNT] {
        let top = (Rarity::COUNT - 1) as u32;
        std::array::from_fn(|i| {
            u64::from(base)
                .saturating_pow(top - i as u32)
                .saturating_mul(scale)
        })
    }

    #[inline]
    pub fn tier_weight(&self, tier: Rarity) -> u64 {
        self.per_item[tier.index()]
    }

    /// Weight of the whole bucket for `tier`.
    #[inline]
    pub fn bucket_weight(&self, tier: Rarity) -> u64 {
        self.per_item[tier.index()].saturating_mul(self.counts[tier.index()] as u64)
    }

    #[inline]
    pub fn count(&self, tier: Rarity) -> usize {
        self.counts[tier.index()]
    }

    /// Sum of all bucket weights. Zero means nothing can be drawn.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Walk the tiers in order and return the one whose running total first
    /// exceeds `roll`.
    pub fn tier_for_roll(&self, roll: u64) -> Option<Rarity> {
        let mut running = 0u64;
        for &tier in Rarity::ALL {
            running = running.saturating_add(self.bucket_weight(tier));
            if roll < running {
                return Some(tier);
            }
        }
        None
    }
}

impl IndexSampler for TierWeights {
    #[inline]
    fn len(&self) -> usize {
        Rarity::COUNT
    }

    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let roll = rng.random_range(0..self.total);
        self.tier_for_roll(roll).map(Rarity::index)
    }
}

/// `CumulativeTable` is the group sampler; wire it into the trait.
impl IndexSampler for CumulativeTable {
    #[inline]
    fn len(&self) -> usize {
        CumulativeTable::len(self)
    }

    #[inline]
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let roll = rng.random_range(0.0..100.0);
        self.index_for_roll(roll)
    }
}
