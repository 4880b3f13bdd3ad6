//! Tower identifiers and tower sets.
//!
//! The tracking detector is a 4x4 grid of sixteen towers. A [`TowerSet`]
//! is the per-event bitmask of towers reporting a three-consecutive-layer
//! x/y coincidence.

use serde::{Deserialize, Serialize};

/// Number of tracker towers.
pub const TOWER_COUNT: usize = 16;

/// One of the sixteen tracking-detector modules, numbered 0-15 across the
/// 4x4 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u8);

impl TowerId {
    /// Create a tower id. `id` must be in 0..16.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        assert!(id < TOWER_COUNT as u8, "tower id out of range");
        Self(id)
    }

    /// Raw tower number.
    #[must_use]
    pub const fn id(self) -> u8 {
        self.0
    }

    /// Index into per-tower tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Single-bit mask for this tower.
    #[must_use]
    pub const fn bit(self) -> u16 {
        1 << self.0
    }
}

impl std::fmt::Display for TowerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tower({})", self.0)
    }
}

/// Bitmask of triggered towers, one bit per tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TowerSet(pub u16);

impl TowerSet {
    /// Empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Set from a raw 16-bit mask.
    #[must_use]
    pub const fn from_mask(mask: u16) -> Self {
        Self(mask)
    }

    /// Raw mask.
    #[must_use]
    pub const fn mask(self) -> u16 {
        self.0
    }

    /// True if no tower triggered.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of triggered towers.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// True if the given tower is in the set.
    #[must_use]
    pub const fn contains(self, tower: TowerId) -> bool {
        self.0 & tower.bit() != 0
    }

    /// Add a tower.
    pub fn insert(&mut self, tower: TowerId) {
        self.0 |= tower.bit();
    }

    /// Iterate triggered towers in ascending tower-id order.
    pub fn iter(self) -> impl Iterator<Item = TowerId> {
        (0..TOWER_COUNT as u8)
            .filter(move |i| self.0 & (1 << i) != 0)
            .map(TowerId)
    }
}

impl FromIterator<TowerId> for TowerSet {
    fn from_iter<I: IntoIterator<Item = TowerId>>(iter: I) -> Self {
        let mut set = TowerSet::new();
        for tower in iter {
            set.insert(tower);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tower_id() {
        let tower = TowerId::new(5);
        assert_eq!(tower.id(), 5);
        assert_eq!(tower.bit(), 0x20);
        assert_eq!(format!("{}", tower), "Tower(5)");
    }

    #[test]
    #[should_panic(expected = "tower id out of range")]
    fn test_tower_id_out_of_range() {
        TowerId::new(16);
    }

    #[test]
    fn test_tower_set_insert_contains() {
        let mut set = TowerSet::new();
        assert!(set.is_empty());

        set.insert(TowerId::new(0));
        set.insert(TowerId::new(12));
        assert_eq!(set.mask(), 0x1001);
        assert_eq!(set.len(), 2);
        assert!(set.contains(TowerId::new(12)));
        assert!(!set.contains(TowerId::new(3)));
    }

    #[test]
    fn test_tower_set_iter_order() {
        let set = TowerSet::from_mask(0b1000_0000_0010_0001);
        let ids: Vec<u8> = set.iter().map(TowerId::id).collect();
        assert_eq!(ids, vec![0, 5, 15]);
    }

    #[test]
    fn test_tower_set_collect() {
        let set: TowerSet = [TowerId::new(1), TowerId::new(2)].into_iter().collect();
        assert_eq!(set.mask(), 0b110);
    }
}
