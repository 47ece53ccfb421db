//! Area upgrades. The upgrade count is tracked outside the machine (on the
//! placed item, by the host) and only ever reaches the simulation through
//! [`AreaConfig::tier_for`].

use crate::config::AreaConfig;
use crate::cursor::{AreaTier, MAX_HALF_WIDTH};

impl AreaConfig {
    /// Clamp a raw upgrade count into `0..=max_upgrades`.
    pub fn clamp_upgrade_count(&self, count: i64) -> u32 {
        count.clamp(0, self.max_upgrades as i64) as u32
    }

    /// Half-width of the excavation square for an upgrade count, capped at
    /// [`MAX_HALF_WIDTH`].
    pub fn half_width_for(&self, count: i64) -> u32 {
        let count = self.clamp_upgrade_count(count);
        self.base_half_width
            .saturating_add(self.step.saturating_mul(count))
            .min(MAX_HALF_WIDTH)
    }

    /// Side length of the excavation square for an upgrade count.
    pub fn area_for(&self, count: i64) -> u32 {
        self.half_width_for(count).saturating_mul(2).saturating_add(1)
    }

    /// Side length with every upgrade applied.
    pub fn max_area(&self) -> u32 {
        self.area_for(self.max_upgrades as i64)
    }

    /// Side length gained per upgrade.
    pub fn area_step(&self) -> u32 {
        self.step.saturating_mul(2)
    }

    pub fn tier_for(&self, count: i64) -> AreaTier {
        AreaTier::new(self.half_width_for(count))
    }
}
