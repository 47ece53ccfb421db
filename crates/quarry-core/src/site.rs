//! Placement lifecycle for many independent quarries.
//!
//! A [`Site`] only owns machines. It shares nothing between them beyond the
//! world each tick is run against.

use crate::catalog::ItemClassification;
use crate::config::QuarryConfig;
use crate::engine::Quarry;
use crate::id::QuarryId;
use crate::item::ItemStack;
use crate::sim::TickReport;
use crate::world::{BlockPos, DropSink, WorldAccess};
use slotmap::SlotMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Site {
    quarries: SlotMap<QuarryId, Quarry>,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a fresh machine at `origin`.
    pub fn place(&mut self, origin: BlockPos, config: QuarryConfig) -> QuarryId {
        let id = self.quarries.insert(Quarry::new(origin, config));
        debug!(?id, ?origin, "quarry placed");
        id
    }

    /// Adopt an already built (for example restored) machine.
    pub fn adopt(&mut self, quarry: Quarry) -> QuarryId {
        self.quarries.insert(quarry)
    }

    /// Remove a machine, returning every stack it held. `None` if the id is
    /// stale.
    pub fn remove(&mut self, id: QuarryId) -> Option<Vec<ItemStack>> {
        let mut quarry = self.quarries.remove(id)?;
        let released = quarry.state.release_all();
        debug!(?id, stacks = released.len(), "quarry removed");
        Some(released)
    }

    pub fn get(&self, id: QuarryId) -> Option<&Quarry> {
        self.quarries.get(id)
    }

    pub fn get_mut(&mut self, id: QuarryId) -> Option<&mut Quarry> {
        self.quarries.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.quarries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quarries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuarryId, &Quarry)> {
        self.quarries.iter()
    }

    /// Tick every machine once, one after another, against the same world.
    pub fn step_all<W, C>(&mut self, world: &mut W, catalog: &C) -> Vec<(QuarryId, TickReport)>
    where
        W: WorldAccess + DropSink + ?Sized,
        C: ItemClassification + ?Sized,
    {
        self.quarries
            .iter_mut()
            .map(|(id, quarry)| (id, quarry.step(world, catalog)))
            .collect()
    }
}
