//! Cumulative-probability tables for O(log n) sampling from a loot group.

/// Running totals of a group's item probabilities, in item order.
///
/// The totals need not reach 100: a roll past the last total draws nothing,
/// so an under-filled group has a `100 - sum` chance of dropping nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeTable {
    cumulative: Vec<f64>,
}

impl CumulativeTable {
    /// Build from probabilities in item order. O(n).
    ///
    /// Negative or non-finite probabilities count as zero so the totals stay
    /// monotonic.
    pub fn new<I>(probabilities: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sum = 0.0f64;
        let cumulative = probabilities
            .into_iter()
            .map(|p| {
                if p.is_finite() && p > 0.0 {
                    sum += p;
                }
                sum
            })
            .collect();
        Self { cumulative }
    }

    /// Index of the first running total `>= roll`, or `None` if the roll is
    /// past the last total. O(log n).
    pub fn index_for_roll(&self, roll: f64) -> Option<usize> {
        let i = self.cumulative.partition_point(|&c| c < roll);
        (i < self.cumulative.len()).then_some(i)
    }

    /// Final running total (the group's probability sum).
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// An empty table is stale and must be rebuilt before sampling.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexSampler;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn accumulates_in_order() {
        let t = CumulativeTable::new([10.0, 20.0, 70.0]);
        assert_eq!(t.as_slice(), &[10.0, 30.0, 100.0]);
        assert_eq!(t.total(), 100.0);
    }

    #[test]
    fn rolls_map_to_first_total_at_or_above() {
        let t = CumulativeTable::new([10.0, 20.0, 70.0]);
        assert_eq!(t.index_for_roll(0.0), Some(0));
        assert_eq!(t.index_for_roll(10.0), Some(0));
        assert_eq!(t.index_for_roll(10.5), Some(1));
        assert_eq!(t.index_for_roll(99.9), Some(2));
    }

    #[test]
    fn under_summed_group_can_miss() {
        let t = CumulativeTable::new([25.0, 25.0]);
        assert_eq!(t.index_for_roll(49.0), Some(1));
        assert_eq!(t.index_for_roll(50.5), None);
        assert_eq!(CumulativeTable::default().index_for_roll(0.0), None);
    }

    #[test]
    fn bad_probabilities_count_as_zero() {
        let t = CumulativeTable::new([5.0, -3.0, f64::NAN, 5.0]);
        assert_eq!(t.as_slice(), &[5.0, 5.0, 5.0, 10.0]);
    }

    #[test]
    fn roughly_matches_distribution() {
        let weights = [10.0, 20.0, 30.0, 40.0];
        let t = CumulativeTable::new(weights);
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 20_000usize;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            counts[t.sample_index(&mut rng).unwrap()] += 1;
        }
        for (i, &c) in counts.iter().enumerate() {
            let p = weights[i] / 100.0;
            let emp = c as f64 / draws as f64;
            assert!((emp - p).abs() < 0.03, "i={i} emp={emp} p={p}");
        }
    }
}
