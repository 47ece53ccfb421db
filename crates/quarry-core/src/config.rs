//! Machine configuration. Every field has a default, so a config file only
//! needs to name what it changes.

use serde::{Deserialize, Serialize};

/// Size and limits of one quarry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Number of output slots.
    pub output_slots: usize,
    /// Per-slot stack ceiling of the output store, applied on top of each
    /// item's own limit.
    pub max_stack_size: u32,
    /// Target probes allowed per completed mining cycle.
    pub max_probes: u32,
    pub area: AreaConfig,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            output_slots: 36,
            max_stack_size: 64,
            max_probes: 512,
            area: AreaConfig::default(),
        }
    }
}

/// How upgrades widen the excavation square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    /// Half-width of the square with no upgrades (2 gives 5x5).
    pub base_half_width: u32,
    /// Half-width added per upgrade.
    pub step: u32,
    /// Upgrades beyond this count are ignored.
    pub max_upgrades: u32,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            base_half_width: 2,
            step: 1,
            max_upgrades: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_machine() {
        let config = QuarryConfig::default();
        assert_eq!(config.output_slots, 36);
        assert_eq!(config.max_stack_size, 64);
        assert_eq!(config.max_probes, 512);
        assert_eq!(config.area.base_half_width, 2);
    }
}
