//! Save/load for a single quarry.
//!
//! Snapshots are `bitcode` blobs with a versioned header. The machine itself
//! is stored as a [`MachineRecord`] of wide signed integers so that a record
//! written by a buggy or tampered host still decodes; restoring then clamps
//! every field back into range instead of rejecting the save.
//!
//! The upgrade count lives outside the machine and is supplied on restore.

use crate::config::QuarryConfig;
use crate::control::RequestQueue;
use crate::cursor::ExcavationCursor;
use crate::engine::Quarry;
use crate::fuel::FuelLedger;
use crate::item::ItemStack;
use crate::machine::{MachineState, QuarryStatus};
use crate::query::QuarryView;
use crate::sim::{SimState, StateHash};
use crate::store::OutputStore;
use crate::world::{BlockPos, DropSink};
use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a quarry snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x51A7_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count at the time the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One occupied output slot. Empty slots are not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRecord {
    pub slot: i64,
    pub stack: ItemStack,
}

/// Persisted machine fields, deliberately wider than the live types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRecord {
    pub tool: Option<ItemStack>,
    pub fuel: Option<ItemStack>,
    pub outputs: Vec<SlotRecord>,
    pub fuel_budget_remaining: i64,
    pub last_fuel_grant: i64,
    pub mining_progress: i64,
    pub ticks_per_block: i64,
    pub depth: i64,
    pub cursor_index: i64,
}

impl MachineRecord {
    pub fn capture(state: &MachineState) -> Self {
        Self {
            tool: state.tool.clone(),
            fuel: state.fuel.clone(),
            outputs: state.outputs.to_records(),
            fuel_budget_remaining: state.ledger.remaining() as i64,
            last_fuel_grant: state.ledger.last_grant() as i64,
            mining_progress: state.mining_progress as i64,
            ticks_per_block: state.ticks_per_block as i64,
            depth: state.cursor.depth() as i64,
            cursor_index: state.cursor.index() as i64,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedQuarry {
    header: SnapshotHeader,
    status: QuarryStatus,
    machine: MachineRecord,
}

/// A restored quarry plus any items that no longer fit anywhere in it
/// (oversized stacks, out-of-range slots in a full store). The caller
/// decides where those go.
#[derive(Debug)]
pub struct Restored {
    pub quarry: Quarry,
    pub displaced: Vec<ItemStack>,
}

impl Restored {
    /// Spill every displaced stack above the machine and return the quarry.
    pub fn spill_into<S: DropSink + ?Sized>(self, sink: &mut S) -> Quarry {
        let at = self.quarry.spill_position();
        for stack in self.displaced {
            sink.spill(at, stack);
        }
        self.quarry
    }
}

/// Encode a raw record. Mostly useful for producing hand-made saves.
pub fn encode_record(
    tick: u64,
    status: QuarryStatus,
    machine: &MachineRecord,
) -> Result<Vec<u8>, SerializeError> {
    let saved = SavedQuarry {
        header: SnapshotHeader::new(tick),
        status,
        machine: machine.clone(),
    };
    bitcode::serialize(&saved).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Decode only far enough to read and return the header.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let saved: SavedQuarry =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(saved.header)
}

// ---------------------------------------------------------------------------
// Quarry serialization methods
// ---------------------------------------------------------------------------

impl Quarry {
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        encode_record(
            self.sim_state.tick,
            self.status,
            &MachineRecord::capture(&self.state),
        )
    }

    /// Restore a quarry, discarding anything that no longer fits.
    ///
    /// Use [`Quarry::restore`] when those items must be kept, for example
    /// through [`Restored::spill_into`].
    pub fn deserialize(
        data: &[u8],
        origin: BlockPos,
        config: QuarryConfig,
        upgrades: i64,
    ) -> Result<Self, DeserializeError> {
        let restored = Self::restore(data, origin, config, upgrades)?;
        if !restored.displaced.is_empty() {
            warn!(
                stacks = restored.displaced.len(),
                "discarding items that did not fit the restored quarry"
            );
        }
        Ok(restored.quarry)
    }

    /// Restore a quarry and hand back anything that no longer fits.
    ///
    /// Header and decode failures are errors. Everything past that is
    /// clamped: depth to at least 1, the cursor into the pattern of the
    /// supplied upgrade tier, negative counters to zero, progress below
    /// ticks-per-block, stack counts to the slot ceiling.
    pub fn restore(
        data: &[u8],
        origin: BlockPos,
        config: QuarryConfig,
        upgrades: i64,
    ) -> Result<Restored, DeserializeError> {
        let saved: SavedQuarry =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        saved.header.validate()?;

        let mut quarry = Quarry::new(origin, config);
        quarry.set_upgrades(upgrades);
        quarry.sim_state = SimState {
            tick: saved.header.tick,
        };
        quarry.status = saved.status;

        let (state, displaced, clamped) =
            restore_machine(saved.machine, &quarry.config, &quarry);
        if clamped {
            warn!(tick = saved.header.tick, "clamped malformed quarry snapshot");
        }
        quarry.view = QuarryView::capture(&state);
        quarry.state = state;
        quarry.requests = RequestQueue::new();
        quarry.dirty = false;

        Ok(Restored { quarry, displaced })
    }

    /// Hash of everything that determines future behaviour.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim_state.tick);
        h.write_u32(self.status as u32);
        h.write_u32(self.upgrades);
        let state = &self.state;
        hash_stack(&mut h, state.tool.as_ref());
        hash_stack(&mut h, state.fuel.as_ref());
        for index in 0..state.outputs.len() {
            hash_stack(&mut h, state.outputs.slot(index));
        }
        h.write_u32(state.ledger.remaining());
        h.write_u32(state.ledger.last_grant());
        h.write_u32(state.mining_progress);
        h.write_u32(state.ticks_per_block);
        h.write_u32(state.cursor.depth());
        h.write_u32(state.cursor.index());
        h.finish()
    }
}

fn hash_stack(h: &mut StateHash, stack: Option<&ItemStack>) {
    let Some(stack) = stack else {
        h.write_u32(0);
        return;
    };
    h.write_u32(1);
    h.write_u32(stack.item_type.0);
    h.write_u32(stack.quantity);
    h.write_u32(stack.damage);
    h.write_u32(stack.properties.len() as u32);
    for (id, value) in &stack.properties {
        h.write_u32(id.0 as u32);
        h.write_u64(value.to_bits() as u64);
    }
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Rebuild machine state from a record. Returns the state, the items that
/// did not fit, and whether anything had to be clamped.
fn restore_machine(
    record: MachineRecord,
    config: &QuarryConfig,
    quarry: &Quarry,
) -> (MachineState, Vec<ItemStack>, bool) {
    let mut clamped = false;
    let mut displaced = Vec::new();
    let mut state = MachineState::new(config);

    state.tool = record.tool.filter(|s| !s.is_empty()).map(|mut tool| {
        if tool.quantity > 1 {
            clamped = true;
            displaced.push(tool.split(tool.quantity - 1));
        }
        tool
    });

    let cap = state.outputs.max_stack_size();
    state.fuel = record.fuel.filter(|s| !s.is_empty()).map(|mut fuel| {
        if fuel.quantity > cap {
            clamped = true;
            displaced.push(fuel.split(fuel.quantity - cap));
        }
        fuel
    });

    let mut leftovers = Vec::new();
    for SlotRecord { slot, stack } in record.outputs {
        if stack.is_empty() {
            continue;
        }
        let in_range = usize::try_from(slot)
            .ok()
            .filter(|&i| i < state.outputs.len() && state.outputs.slot(i).is_none());
        match in_range {
            Some(index) => leftovers.extend(state.outputs.set_slot(index, Some(stack), cap)),
            None => leftovers.push(stack),
        }
    }
    if !leftovers.is_empty() {
        clamped = true;
    }
    for stack in leftovers {
        displaced.extend(state.outputs.insert(stack, cap));
    }

    let remaining = clamp_u32(record.fuel_budget_remaining);
    let last_grant = clamp_u32(record.last_fuel_grant);
    state.ledger = FuelLedger::from_parts(remaining, last_grant);

    state.ticks_per_block = clamp_u32(record.ticks_per_block);
    let progress = clamp_u32(record.mining_progress);
    state.mining_progress = progress.min(state.ticks_per_block.saturating_sub(1));

    let tier = quarry.area_tier();
    state.cursor = ExcavationCursor::from_raw(record.depth, record.cursor_index, tier);

    clamped |= remaining as i64 != record.fuel_budget_remaining
        || last_grant as i64 != record.last_fuel_grant
        || state.ticks_per_block as i64 != record.ticks_per_block
        || state.mining_progress as i64 != record.mining_progress
        || state.cursor.depth() as i64 != record.depth
        || state.cursor.index() as i64 != record.cursor_index;

    (state, displaced, clamped)
}

// ---------------------------------------------------------------------------
// Output store persistence helper
// ---------------------------------------------------------------------------

impl OutputStore {
    /// Sparse `(slot, stack)` view of the occupied slots.
    pub fn to_records(&self) -> Vec<SlotRecord> {
        self.occupied()
            .map(|(slot, stack)| SlotRecord {
                slot: slot as i64,
                stack: stack.clone(),
            })
            .collect()
    }
}
