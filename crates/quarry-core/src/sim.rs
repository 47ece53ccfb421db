//! Per-machine simulation bookkeeping: tick counter, tick reports and the
//! state hash used to check that save/load reproduces a run exactly.

use crate::control::RequestOutcome;
use crate::event::{EventKind, QuarryEvent};
use crate::fixed::Ticks;
use crate::machine::QuarryStatus;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Current tick counter. Incremented by 1 for each simulation step.
    pub tick: Ticks,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// What one call to `Quarry::step` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick the report belongs to.
    pub tick: Ticks,
    /// Status the machine ended the tick in.
    pub status: QuarryStatus,
    pub events: Vec<QuarryEvent>,
    /// Outcomes of queued slot requests applied at the start of this tick,
    /// in submission order.
    pub request_outcomes: Vec<RequestOutcome>,
}

impl TickReport {
    pub fn new(tick: Ticks) -> Self {
        Self {
            tick,
            status: QuarryStatus::default(),
            events: Vec::new(),
            request_outcomes: Vec::new(),
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn blocks_mined(&self) -> usize {
        self.count(EventKind::BlockMined)
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of machine state for restart checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
