//! Status query options — which categories a snapshot should carry.
//!
//! Every category starts included. Narrowing is one-way: each
//! `exclude_*` call returns a new value with one more category switched
//! off, and nothing switches a category back on.
//!
//! On the wire the options travel as a bitset with one bit per
//! [`Category`]. A bit that is absent reads as "excluded", and bits this
//! build does not know are dropped, so an older or newer peer never
//! causes work that was not asked for.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A selectable section of the cluster status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Version,
    ClusterId,
    LiveServers,
    DeadServers,
    Master,
    BackupMasters,
    MasterCoprocessors,
    BalancerOn,
    RegionState,
}

impl Category {
    /// All categories, in wire bit order.
    pub const ALL: [Category; 9] = [
        Category::Version,
        Category::ClusterId,
        Category::LiveServers,
        Category::DeadServers,
        Category::Master,
        Category::BackupMasters,
        Category::MasterCoprocessors,
        Category::BalancerOn,
        Category::RegionState,
    ];

    /// Bit position in the wire bitset. Fixed forever; new categories
    /// append.
    pub const fn bit(self) -> u32 {
        match self {
            Category::Version => 0,
            Category::ClusterId => 1,
            Category::LiveServers => 2,
            Category::DeadServers => 3,
            Category::Master => 4,
            Category::BackupMasters => 5,
            Category::MasterCoprocessors => 6,
            Category::BalancerOn => 7,
            Category::RegionState => 8,
        }
    }

    const fn mask(self) -> u32 {
        1 << self.bit()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Version => "version",
            Category::ClusterId => "cluster-id",
            Category::LiveServers => "live-servers",
            Category::DeadServers => "dead-servers",
            Category::Master => "master",
            Category::BackupMasters => "backup-masters",
            Category::MasterCoprocessors => "master-coprocessors",
            Category::BalancerOn => "balancer-on",
            Category::RegionState => "region-state",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// Bits of every category this build knows about.
const KNOWN_MASK: u32 = {
    let mut mask = 0;
    let mut i = 0;
    while i < Category::ALL.len() {
        mask |= Category::ALL[i].mask();
        i += 1;
    }
    mask
};

/// Selection of status categories for one query.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StatusOptions {
    included: u32,
}

impl StatusOptions {
    /// Options selecting every category (a full snapshot).
    pub const fn default_options() -> Self {
        Self {
            included: KNOWN_MASK,
        }
    }

    /// Options selecting nothing.
    pub const fn none() -> Self {
        Self { included: 0 }
    }

    /// Whether `category` is selected.
    pub fn includes(&self, category: Category) -> bool {
        self.included & category.mask() != 0
    }

    /// Return these options with `category` excluded.
    #[must_use]
    pub fn exclude(self, category: Category) -> Self {
        Self {
            included: self.included & !category.mask(),
        }
    }

    #[must_use]
    pub fn exclude_version(self) -> Self {
        self.exclude(Category::Version)
    }

    #[must_use]
    pub fn exclude_cluster_id(self) -> Self {
        self.exclude(Category::ClusterId)
    }

    #[must_use]
    pub fn exclude_live_servers(self) -> Self {
        self.exclude(Category::LiveServers)
    }

    #[must_use]
    pub fn exclude_dead_servers(self) -> Self {
        self.exclude(Category::DeadServers)
    }

    #[must_use]
    pub fn exclude_master(self) -> Self {
        self.exclude(Category::Master)
    }

    #[must_use]
    pub fn exclude_backup_masters(self) -> Self {
        self.exclude(Category::BackupMasters)
    }

    #[must_use]
    pub fn exclude_master_coprocessors(self) -> Self {
        self.exclude(Category::MasterCoprocessors)
    }

    #[must_use]
    pub fn exclude_balancer_on(self) -> Self {
        self.exclude(Category::BalancerOn)
    }

    /// Exclude per-server region state, the most expensive category.
    #[must_use]
    pub fn exclude_region_state(self) -> Self {
        self.exclude(Category::RegionState)
    }

    /// Wire bitset: bit `c.bit()` set when `c` is included.
    pub fn to_mask(&self) -> u32 {
        self.included
    }

    /// Read a wire bitset. Unknown bits are dropped; missing bits mean
    /// excluded.
    pub fn from_mask(mask: u32) -> Self {
        Self {
            included: mask & KNOWN_MASK,
        }
    }

    /// Included categories, in wire bit order.
    pub fn included(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(move |c| self.includes(*c))
    }
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self::default_options()
    }
}

impl fmt::Debug for StatusOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.included().map(Category::as_str))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_includes_every_category() {
        let options = StatusOptions::default();
        for category in Category::ALL {
            assert!(options.includes(category), "{category} should be included");
        }
        assert_eq!(options, StatusOptions::default_options());
    }

    #[test]
    fn exclude_clears_exactly_one_category() {
        for target in Category::ALL {
            let options = StatusOptions::default().exclude(target);
            for category in Category::ALL {
                assert_eq!(options.includes(category), category != target);
            }
        }
    }

    #[test]
    fn exclude_twice_is_same_as_once() {
        let once = StatusOptions::default().exclude_dead_servers();
        let twice = StatusOptions::default()
            .exclude_dead_servers()
            .exclude_dead_servers();
        assert_eq!(once, twice);

        let chained = StatusOptions::default()
            .exclude_master()
            .exclude_backup_masters()
            .exclude_backup_masters();
        assert_eq!(chained.included().count(), Category::ALL.len() - 2);
    }

    #[test]
    fn excluding_everything_is_legal() {
        let options = StatusOptions::default()
            .exclude_version()
            .exclude_cluster_id()
            .exclude_live_servers()
            .exclude_dead_servers()
            .exclude_master()
            .exclude_backup_masters()
            .exclude_master_coprocessors()
            .exclude_balancer_on()
            .exclude_region_state();

        assert_eq!(options, StatusOptions::none());
        assert_eq!(options.to_mask(), 0);
    }

    #[test]
    fn bit_positions_are_stable() {
        let bits: Vec<u32> = Category::ALL.iter().map(|c| c.bit()).collect();
        assert_eq!(bits, (0..9).collect::<Vec<_>>());
        assert_eq!(StatusOptions::default().to_mask(), 0x1ff);
    }

    #[test]
    fn unknown_bits_are_dropped() {
        let options = StatusOptions::from_mask(0xffff_ffff);
        assert_eq!(options, StatusOptions::default());
        assert_eq!(options.to_mask(), 0x1ff);
    }

    #[test]
    fn missing_bits_read_as_excluded() {
        // A peer that only knows the first four categories.
        let options = StatusOptions::from_mask(0b1111);
        assert!(options.includes(Category::DeadServers));
        assert!(!options.includes(Category::Master));
        assert!(!options.includes(Category::RegionState));
    }

    #[test]
    fn category_names_parse_back() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("regions".parse::<Category>().is_err());
    }

    #[test]
    fn debug_lists_included_categories() {
        let options = StatusOptions::none().exclude_master();
        assert_eq!(format!("{options:?}"), "{}");

        let options = StatusOptions::from_mask(Category::Master.mask());
        assert_eq!(format!("{options:?}"), "{\"master\"}");
    }
}
