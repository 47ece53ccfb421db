//! The quarry: one placed machine and its per-tick state machine.
//!
//! # Tick phases
//!
//! Each `step()` runs:
//! 1. **Pre-tick** -- apply queued slot requests in submission order
//! 2. **Tool** -- validate the tool and derive ticks-per-block
//! 3. **Fuel** -- refuel if the budget is exhausted
//! 4. **Mine** -- accumulate progress; on completion resolve a target,
//!    harvest it and pay one unit of budget
//! 5. **Bookkeeping** -- record status changes, publish the read-only view,
//!    advance the tick counter
//!
//! Every failure inside a tick is a quiet no-op. The resulting
//! [`QuarryStatus`] and the [`TickReport`] are the only signals.

use crate::catalog::ItemClassification;
use crate::config::QuarryConfig;
use crate::control::RequestQueue;
use crate::cursor::AreaTier;
use crate::event::QuarryEvent;
use crate::harvest::harvest;
use crate::machine::{MachineState, QuarryStatus};
use crate::query::QuarryView;
use crate::sim::{SimState, TickReport};
use crate::target::TargetResolver;
use crate::tool::{is_valid_tool, ticks_per_block};
use crate::world::{BlockPos, DropSink, WorldAccess};
use tracing::debug;

// ---------------------------------------------------------------------------
// Quarry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Quarry {
    /// Position of the machine block. Layers are mined below it.
    pub(crate) origin: BlockPos,
    pub(crate) config: QuarryConfig,
    /// Upgrade count, already clamped to the configured maximum.
    pub(crate) upgrades: u32,
    pub(crate) state: MachineState,
    pub(crate) sim_state: SimState,
    pub(crate) status: QuarryStatus,
    /// Last published projection.
    pub(crate) view: QuarryView,
    pub(crate) requests: RequestQueue,
    /// Set when anything that must survive a restart changed.
    pub(crate) dirty: bool,
}

impl Quarry {
    /// A freshly placed machine with empty slots, zero budget, depth 1.
    pub fn new(origin: BlockPos, config: QuarryConfig) -> Self {
        let state = MachineState::new(&config);
        let view = QuarryView::capture(&state);
        Self {
            origin,
            config,
            upgrades: 0,
            state,
            sim_state: SimState::new(),
            status: QuarryStatus::NoTool,
            view,
            requests: RequestQueue::new(),
            dirty: false,
        }
    }

    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    pub fn config(&self) -> &QuarryConfig {
        &self.config
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn status(&self) -> QuarryStatus {
        self.status
    }

    pub fn tick(&self) -> u64 {
        self.sim_state.tick
    }

    /// Where drops the output store cannot hold are spilled.
    pub fn spill_position(&self) -> BlockPos {
        self.origin.up()
    }

    // -----------------------------------------------------------------------
    // Upgrades
    // -----------------------------------------------------------------------

    pub fn upgrades(&self) -> u32 {
        self.upgrades
    }

    /// Set the externally tracked upgrade count. Out-of-range counts are
    /// clamped, and the cursor is pulled back in if the pattern shrank.
    pub fn set_upgrades(&mut self, count: i64) {
        self.upgrades = self.config.area.clamp_upgrade_count(count);
        let tier = self.area_tier();
        self.state.cursor.clamp_to(tier);
    }

    /// Install one more upgrade. Returns `false` when already at the maximum.
    pub fn try_apply_upgrade(&mut self) -> bool {
        if self.upgrades >= self.config.area.max_upgrades {
            return false;
        }
        self.upgrades += 1;
        debug!(upgrades = self.upgrades, "area upgrade applied");
        true
    }

    pub fn area_tier(&self) -> AreaTier {
        self.config.area.tier_for(self.upgrades as i64)
    }

    // -----------------------------------------------------------------------
    // Dirty tracking
    // -----------------------------------------------------------------------

    /// Whether resumption-relevant state changed since the last
    /// [`mark_clean`](Self::mark_clean).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Advance the machine by one tick.
    pub fn step<W, C>(&mut self, world: &mut W, catalog: &C) -> TickReport
    where
        W: WorldAccess + DropSink + ?Sized,
        C: ItemClassification + ?Sized,
    {
        let mut report = TickReport::new(self.sim_state.tick + 1);

        self.phase_pre_tick(catalog, &mut report);
        let status = self.phase_machine(world, catalog, &mut report);
        self.phase_bookkeeping(status, &mut report);

        report
    }

    /// Advance `ticks` steps and collect the reports.
    pub fn advance<W, C>(&mut self, world: &mut W, catalog: &C, ticks: u64) -> Vec<TickReport>
    where
        W: WorldAccess + DropSink + ?Sized,
        C: ItemClassification + ?Sized,
    {
        (0..ticks).map(|_| self.step(world, catalog)).collect()
    }

    fn phase_pre_tick<C: ItemClassification + ?Sized>(
        &mut self,
        catalog: &C,
        report: &mut TickReport,
    ) {
        for request in self.requests.drain(self.sim_state.tick) {
            let outcome = self.apply_request(request, catalog);
            report.request_outcomes.push(outcome);
        }
    }

    fn phase_machine<W, C>(
        &mut self,
        world: &mut W,
        catalog: &C,
        report: &mut TickReport,
    ) -> QuarryStatus
    where
        W: WorldAccess + DropSink + ?Sized,
        C: ItemClassification + ?Sized,
    {
        let tier = self.area_tier();
        let resolver = TargetResolver::new(self.config.max_probes.max(1));
        let origin = self.origin;
        let spill_at = self.spill_position();
        let state = &mut self.state;

        if !is_valid_tool(catalog, state.tool.as_ref()) {
            if state.mining_progress != 0 || state.ticks_per_block != 0 {
                self.dirty = true;
            }
            state.reset_progress();
            state.ticks_per_block = 0;
            return QuarryStatus::NoTool;
        }

        let speed = ticks_per_block(catalog, state.tool.as_ref());
        if speed != state.ticks_per_block {
            state.ticks_per_block = speed;
            self.dirty = true;
        }

        if state.ledger.is_exhausted() {
            let fuel_item = state.fuel.as_ref().map(|s| s.item_type);
            let had_grant = state.ledger.last_grant();
            if state.ledger.try_refuel(&mut state.fuel, catalog) {
                let grant = state.ledger.last_grant();
                debug!(item = ?fuel_item, grant, "refuelled");
                if let Some(item_type) = fuel_item {
                    report
                        .events
                        .push(QuarryEvent::FuelConsumed { item_type, grant });
                }
                self.dirty = true;
            } else {
                if state.mining_progress != 0 || had_grant != 0 {
                    self.dirty = true;
                }
                state.reset_progress();
                return QuarryStatus::IdleNoFuel;
            }
        }

        if state.ticks_per_block == 0 {
            state.reset_progress();
            return QuarryStatus::NoTool;
        }

        state.mining_progress += 1;
        self.dirty = true;
        if state.mining_progress < state.ticks_per_block {
            return QuarryStatus::Mining;
        }
        state.reset_progress();

        let depth_before = state.cursor.depth();
        let target = resolver.find_next_target(&mut state.cursor, tier, origin, world);
        for depth in depth_before..state.cursor.depth() {
            report.events.push(QuarryEvent::LayerCompleted { depth });
        }

        let Some(target) = target else {
            return QuarryStatus::Mining;
        };

        let mined = harvest(
            world,
            catalog,
            target,
            spill_at,
            &mut state.tool,
            &mut state.outputs,
            &mut report.events,
        );
        if mined {
            state.ledger.consume_block();
            report.events.push(QuarryEvent::BlockMined { pos: target });
        }

        QuarryStatus::Mining
    }

    fn phase_bookkeeping(&mut self, status: QuarryStatus, report: &mut TickReport) {
        if status != self.status {
            debug!(from = ?self.status, to = ?status, "quarry status changed");
            report.events.push(QuarryEvent::StatusChanged {
                from: self.status,
                to: status,
            });
            self.status = status;
        }
        self.view = QuarryView::capture(&self.state);
        self.sim_state.tick += 1;
        report.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::item::ItemStack;
    use crate::test_utils::*;

    const ORIGIN: BlockPos = BlockPos::new(0, 64, 0);

    fn stocked_quarry(tool: ItemStack, fuel: ItemStack) -> Quarry {
        let mut quarry = Quarry::new(ORIGIN, QuarryConfig::default());
        quarry.state.tool = Some(tool);
        quarry.state.fuel = Some(fuel);
        quarry
    }

    #[test]
    fn empty_machine_stays_in_no_tool() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = Quarry::new(ORIGIN, QuarryConfig::default());
        let before = quarry.state.clone();
        for report in quarry.advance(&mut world, &catalog, 100) {
            assert_eq!(report.status, QuarryStatus::NoTool);
            assert!(report.events.is_empty());
        }
        assert_eq!(quarry.state, before);
        assert!(!quarry.is_dirty());
    }

    #[test]
    fn first_tick_refuels_and_starts_mining() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1),
            ItemStack::new(coal(), 2),
        );
        let report = quarry.step(&mut world, &catalog);
        assert_eq!(report.status, QuarryStatus::Mining);
        assert_eq!(report.count(EventKind::FuelConsumed), 1);
        assert_eq!(report.count(EventKind::StatusChanged), 1);
        assert_eq!(quarry.state.ledger.remaining(), 8);
        assert_eq!(quarry.state.mining_progress, 1);
        assert_eq!(quarry.state.ticks_per_block, 20);
        assert_eq!(quarry.state.fuel.as_ref().unwrap().quantity, 1);
    }

    #[test]
    fn block_completes_after_ticks_per_block() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        let reports = quarry.advance(&mut world, &catalog, 20);
        let mined: usize = reports.iter().map(TickReport::blocks_mined).sum();
        assert_eq!(mined, 1);
        assert_eq!(reports[19].blocks_mined(), 1);
        assert_eq!(quarry.state.mining_progress, 0);
        assert_eq!(quarry.state.ledger.remaining(), 7);
        assert_eq!(quarry.state.outputs.total(), 1);
        assert_eq!(quarry.state.cursor.index(), 1);
    }

    #[test]
    fn removing_the_tool_resets_progress() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(wooden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        quarry.advance(&mut world, &catalog, 50);
        assert_eq!(quarry.state.mining_progress, 50);

        quarry.state.tool = None;
        let report = quarry.step(&mut world, &catalog);
        assert_eq!(report.status, QuarryStatus::NoTool);
        assert_eq!(quarry.state.mining_progress, 0);
        assert_eq!(quarry.state.ticks_per_block, 0);
        // Budget already paid for is kept.
        assert_eq!(quarry.state.ledger.remaining(), 8);
    }

    #[test]
    fn non_tool_in_tool_slot_is_no_tool() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(ItemStack::new(cobblestone(), 1), ItemStack::new(coal(), 1));
        let report = quarry.step(&mut world, &catalog);
        assert_eq!(report.status, QuarryStatus::NoTool);
        assert_eq!(quarry.state.fuel.as_ref().unwrap().quantity, 1);
    }

    #[test]
    fn no_fuel_idles_without_progress() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(iron_pickaxe(), 1),
            ItemStack::new(cobblestone(), 4),
        );
        for report in quarry.advance(&mut world, &catalog, 10) {
            assert_eq!(report.status, QuarryStatus::IdleNoFuel);
        }
        assert_eq!(quarry.state.mining_progress, 0);
        assert_eq!(quarry.state.ticks_per_block, 120);
        assert_eq!(quarry.state.fuel.as_ref().unwrap().quantity, 4);
    }

    #[test]
    fn empty_area_is_a_quiet_no_op() {
        let catalog = test_catalog();
        let mut world = GridWorld::new(0);
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        let reports = quarry.advance(&mut world, &catalog, 20);
        assert_eq!(reports[19].status, QuarryStatus::Mining);
        assert_eq!(reports[19].blocks_mined(), 0);
        // No harvest means no budget spent and no wear.
        assert_eq!(quarry.state.ledger.remaining(), 8);
        assert_eq!(quarry.state.tool.as_ref().unwrap().damage, 0);
        assert!(quarry.state.cursor.depth() > 1);
    }

    #[test]
    fn protected_block_costs_nothing() {
        let catalog = test_catalog();
        let mut world = GridWorld::new(0);
        world.set(BlockPos::new(-2, 63, -2), TestBlock::Protected);
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        let reports = quarry.advance(&mut world, &catalog, 20);
        assert_eq!(reports[19].blocks_mined(), 0);
        assert_eq!(quarry.state.ledger.remaining(), 8);
        assert_eq!(quarry.state.tool.as_ref().unwrap().damage, 0);
        assert_eq!(quarry.state.cursor.index(), 1);
    }

    #[test]
    fn broken_tool_stops_the_machine_next_tick() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1).with_damage(31),
            ItemStack::new(coal(), 1),
        );
        let reports = quarry.advance(&mut world, &catalog, 21);
        assert_eq!(reports[19].count(EventKind::ToolBroken), 1);
        assert!(quarry.state.tool.is_none());
        assert_eq!(reports[20].status, QuarryStatus::NoTool);
    }

    #[test]
    fn finished_layer_reports_layer_completed() {
        let catalog = test_catalog();
        let mut world = GridWorld::new(0);
        world.set(BlockPos::new(0, 62, 0), TestBlock::stone());
        let mut quarry = stocked_quarry(
            ItemStack::new(golden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        let reports = quarry.advance(&mut world, &catalog, 20);
        assert_eq!(reports[19].count(EventKind::LayerCompleted), 1);
        assert_eq!(reports[19].blocks_mined(), 1);
        assert_eq!(quarry.state.cursor.depth(), 2);
    }

    #[test]
    fn upgrades_are_clamped_and_shrink_clamps_cursor() {
        let mut quarry = Quarry::new(ORIGIN, QuarryConfig::default());
        quarry.set_upgrades(3);
        quarry.state.cursor = crate::cursor::ExcavationCursor::from_raw(1, 80, quarry.area_tier());
        quarry.set_upgrades(-5);
        assert_eq!(quarry.upgrades(), 0);
        assert_eq!(quarry.state.cursor.index(), 24);
        quarry.set_upgrades(99);
        assert_eq!(quarry.upgrades(), 6);
        assert!(!quarry.try_apply_upgrade());
    }

    #[test]
    fn try_apply_upgrade_widens_area() {
        let mut quarry = Quarry::new(ORIGIN, QuarryConfig::default());
        assert_eq!(quarry.area_tier().side(), 5);
        assert!(quarry.try_apply_upgrade());
        assert_eq!(quarry.area_tier().side(), 7);
    }

    #[test]
    fn view_is_published_once_per_tick() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 4);
        let mut quarry = stocked_quarry(
            ItemStack::new(wooden_pickaxe(), 1),
            ItemStack::new(coal(), 1),
        );
        assert_eq!(quarry.view().fuel_budget, 0);
        quarry.step(&mut world, &catalog);
        assert_eq!(quarry.view().fuel_budget, 8);
        assert_eq!(quarry.view().mining_progress, 1);
        assert_eq!(quarry.view().ticks_per_block, 200);
        assert_eq!(quarry.tick(), 1);
    }
}
