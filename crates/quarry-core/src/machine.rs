//! Per-machine state: slots, fuel ledger, mining progress and cursor.

use crate::config::QuarryConfig;
use crate::cursor::ExcavationCursor;
use crate::fuel::FuelLedger;
use crate::item::ItemStack;
use crate::store::OutputStore;

/// Where the tick state machine ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum QuarryStatus {
    /// Tool slot empty or holding something that is not a tool.
    #[default]
    NoTool,
    /// Budget exhausted and the fuel slot cannot pay for more.
    IdleNoFuel,
    Mining,
}

/// Everything one placed quarry owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub tool: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
    pub outputs: OutputStore,
    pub ledger: FuelLedger,
    /// Ticks accumulated toward the current block; always below
    /// `ticks_per_block` between ticks.
    pub mining_progress: u32,
    /// Derived from the tool each tick. Zero means "no valid tool".
    pub ticks_per_block: u32,
    pub cursor: ExcavationCursor,
}

impl MachineState {
    /// Freshly placed machine: empty slots, no budget, depth 1, cursor 0.
    pub fn new(config: &QuarryConfig) -> Self {
        Self {
            tool: None,
            fuel: None,
            outputs: OutputStore::new(config.output_slots, config.max_stack_size),
            ledger: FuelLedger::new(),
            mining_progress: 0,
            ticks_per_block: 0,
            cursor: ExcavationCursor::new(),
        }
    }

    pub fn reset_progress(&mut self) {
        self.mining_progress = 0;
    }

    /// Empty every slot, returning the held items (tool, fuel, then outputs).
    pub fn release_all(&mut self) -> Vec<ItemStack> {
        let mut released = Vec::new();
        released.extend(self.tool.take());
        released.extend(self.fuel.take());
        released.extend(self.outputs.drain());
        released
    }
}
