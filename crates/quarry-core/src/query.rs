//! Read-only views of a quarry for display.
//!
//! [`QuarryView`] is the four-integer projection published once per tick;
//! the control surface reads it instead of live state. [`QuarrySnapshot`]
//! is a fuller owned copy for tooling and debugging. Neither holds
//! references into the machine.

use crate::engine::Quarry;
use crate::fixed::{Fixed64, ratio};
use crate::item::ItemStack;
use crate::machine::{MachineState, QuarryStatus};

/// Pixel height of the fuel gauge.
pub const FUEL_GAUGE_SCALE: u32 = 13;
/// Pixel width of the mining progress arrow.
pub const MINING_GAUGE_SCALE: u32 = 22;

// ---------------------------------------------------------------------------
// Published projection
// ---------------------------------------------------------------------------

/// Progress integers as of the last completed tick. The four fields are
/// consistent with each other only as of that publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QuarryView {
    pub fuel_budget: u32,
    pub last_fuel_grant: u32,
    pub mining_progress: u32,
    pub ticks_per_block: u32,
}

impl QuarryView {
    pub fn capture(state: &MachineState) -> Self {
        Self {
            fuel_budget: state.ledger.remaining(),
            last_fuel_grant: state.ledger.last_grant(),
            mining_progress: state.mining_progress,
            ticks_per_block: state.ticks_per_block,
        }
    }

    /// Whether the machine still has paid-for budget.
    pub fn is_burning(&self) -> bool {
        self.fuel_budget > 0
    }

    /// Remaining budget scaled to `0..=scale`. Zero without a last grant.
    pub fn scaled_fuel_progress(&self, scale: u32) -> u32 {
        scaled(self.fuel_budget, self.last_fuel_grant, scale)
    }

    /// Progress toward the current block scaled to `0..=scale`. Zero
    /// without a valid tool.
    pub fn scaled_mining_progress(&self, scale: u32) -> u32 {
        scaled(self.mining_progress, self.ticks_per_block, scale)
    }

    pub fn fuel_fraction(&self) -> Fixed64 {
        ratio(self.fuel_budget, self.last_fuel_grant)
    }

    pub fn mining_fraction(&self) -> Fixed64 {
        ratio(self.mining_progress, self.ticks_per_block)
    }
}

fn scaled(value: u32, total: u32, scale: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let v = (value as u64 * scale as u64) / total as u64;
    v.min(scale as u64) as u32
}

// ---------------------------------------------------------------------------
// Full snapshot
// ---------------------------------------------------------------------------

/// An owned copy of everything about one quarry that a UI or debugger may
/// want, taken from live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarrySnapshot {
    pub status: QuarryStatus,
    pub view: QuarryView,
    pub depth: u32,
    pub cursor_index: u32,
    pub upgrades: u32,
    /// Side length of the current excavation square.
    pub area_side: u32,
    pub tool: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
    /// Occupied output slots with their indices.
    pub outputs: Vec<(usize, ItemStack)>,
}

impl Quarry {
    /// The projection published at the end of the last tick.
    pub fn view(&self) -> &QuarryView {
        &self.view
    }

    pub fn snapshot(&self) -> QuarrySnapshot {
        QuarrySnapshot {
            status: self.status,
            view: QuarryView::capture(&self.state),
            depth: self.state.cursor.depth(),
            cursor_index: self.state.cursor.index(),
            upgrades: self.upgrades,
            area_side: self.area_tier().side(),
            tool: self.state.tool.clone(),
            fuel: self.state.fuel.clone(),
            outputs: self
                .state
                .outputs
                .occupied()
                .map(|(i, s)| (i, s.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuarryConfig;
    use crate::world::BlockPos;

    fn view(fuel_budget: u32, last_fuel_grant: u32, progress: u32, tpb: u32) -> QuarryView {
        QuarryView {
            fuel_budget,
            last_fuel_grant,
            mining_progress: progress,
            ticks_per_block: tpb,
        }
    }

    #[test]
    fn gauges_scale_like_the_screen() {
        let v = view(4, 8, 100, 200);
        assert_eq!(v.scaled_fuel_progress(FUEL_GAUGE_SCALE), 6);
        assert_eq!(v.scaled_mining_progress(MINING_GAUGE_SCALE), 11);
        assert!(v.is_burning());
    }

    #[test]
    fn zero_denominators_read_as_empty() {
        let v = view(5, 0, 3, 0);
        assert_eq!(v.scaled_fuel_progress(FUEL_GAUGE_SCALE), 0);
        assert_eq!(v.scaled_mining_progress(MINING_GAUGE_SCALE), 0);
        assert_eq!(v.mining_fraction(), Fixed64::ZERO);
    }

    #[test]
    fn budget_above_last_grant_is_capped() {
        // Refuelling on top of leftover budget can exceed the last grant.
        let v = view(30, 8, 0, 200);
        assert_eq!(v.scaled_fuel_progress(FUEL_GAUGE_SCALE), FUEL_GAUGE_SCALE);
        assert_eq!(v.fuel_fraction(), Fixed64::ONE);
    }

    #[test]
    fn snapshot_copies_live_state() {
        let mut quarry = Quarry::new(BlockPos::new(0, 64, 0), QuarryConfig::default());
        quarry.set_upgrades(1);
        let _ = quarry
            .state
            .outputs
            .insert(ItemStack::new(crate::id::ItemTypeId(0), 5), 64);
        let snap = quarry.snapshot();
        assert_eq!(snap.status, QuarryStatus::NoTool);
        assert_eq!(snap.depth, 1);
        assert_eq!(snap.area_side, 7);
        assert_eq!(snap.outputs.len(), 1);
        assert_eq!(snap.outputs[0].0, 0);
    }
}
