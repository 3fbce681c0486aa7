use std::collections::HashSet;

use rand::Rng;

/// A bucket of configured identifiers where every entry is equally likely.
///
/// Entries keep the key exactly as configured (instance tag and blueprint
/// suffix included) so amount settings can be looked up again after a draw.
/// Deduplication is by catalog identifier: the first configured key for an
/// identifier wins.
#[derive(Debug, Clone, Default)]
pub struct TierBucket {
    keys: Vec<String>,
    ids: HashSet<String>,
}

impl TierBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key` under catalog identifier `id`. Returns `false` if `id` is
    /// already present.
    pub fn insert(&mut self, key: &str, id: &str) -> bool {
        if !self.ids.insert(id.to_owned()) {
            return false;
        }
        self.keys.push(key.to_owned());
        true
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Sample a configured key. `None` if the bucket is empty.
    pub fn sample<'a, R: Rng + ?Sized>(&'a self, rng: &mut R) -> Option<&'a str> {
        if self.keys.is_empty() {
            return None;
        }
        let i = rng.random_range(0..self.keys.len());
        Some(&self.keys[i])
    }

    /// Configured keys in insertion order, first key per item id.
    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn dedups_by_identifier() {
        let mut b = TierBucket::new();
        assert!(b.insert("ammo [1]", "ammo"));
        assert!(!b.insert("ammo [2]", "ammo"));
        assert!(b.insert("wood", "wood"));
        assert_eq!(b.len(), 2);
        assert_eq!(b.as_slice(), &["ammo [1]".to_string(), "wood".to_string()]);
    }

    #[test]
    fn empty_bucket_samples_nothing() {
        let b = TierBucket::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(b.sample(&mut rng).is_none());
    }

    #[test]
    fn samples_every_entry() {
        let mut b = TierBucket::new();
        for id in ["a", "b", "c"] {
            b.insert(id, id);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            seen.insert(b.sample(&mut rng).unwrap().to_string());
        }
        assert_eq!(seen.len(), 3);
    }
}
