//! Control surface: validated slot requests from a supervising actor.
//!
//! The simulation owns every slot. Players and automation never alias it;
//! they submit [`SlotRequest`]s, either applied immediately between ticks
//! ([`Quarry::request`]) or queued and applied at the start of the next tick
//! ([`Quarry::queue_request`]). Either way a tick never observes a
//! half-applied request.

use crate::catalog::ItemClassification;
use crate::engine::Quarry;
use crate::item::ItemStack;
use crate::tool::is_valid_tool;
use tracing::debug;

// ---------------------------------------------------------------------------
// Requests and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotRequest {
    /// Place one tool from the stack into the empty tool slot.
    InsertTool(ItemStack),
    /// Add fuel to the fuel slot, merging with what is already there.
    InsertFuel(ItemStack),
    TakeTool,
    /// Withdraw up to `amount` items from the fuel slot (spent buckets too).
    TakeFuel { amount: u32 },
    /// Withdraw up to `amount` items from an output slot.
    TakeOutput { slot: usize, amount: u32 },
    /// Overwrite an output slot directly. The count is re-clamped and any
    /// previous occupant and excess come back in the outcome.
    WriteOutput {
        slot: usize,
        stack: Option<ItemStack>,
    },
    /// Shift-click routing: tools go to the tool slot, fuel to the fuel
    /// slot, anything else is refused.
    QuickInsert(ItemStack),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotATool,
    NotFuel,
    SlotOccupied,
    EmptySlot,
    NoSuchSlot,
    /// Stack was empty to begin with.
    NothingToInsert,
    /// Quick insert found no slot that accepts the item.
    NoAcceptingSlot,
}

/// Result of a [`SlotRequest`]. Items that end up outside the machine are
/// always handed back, never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    Applied { returned: Vec<ItemStack> },
    Rejected {
        reason: RejectReason,
        returned: Vec<ItemStack>,
    },
}

impl RequestOutcome {
    fn applied(returned: impl IntoIterator<Item = ItemStack>) -> Self {
        RequestOutcome::Applied {
            returned: returned.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    fn rejected(reason: RejectReason, returned: impl IntoIterator<Item = ItemStack>) -> Self {
        RequestOutcome::Rejected {
            reason,
            returned: returned.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, RequestOutcome::Applied { .. })
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            RequestOutcome::Applied { .. } => None,
            RequestOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// Items handed back to the requester.
    pub fn returned(&self) -> &[ItemStack] {
        match self {
            RequestOutcome::Applied { returned } | RequestOutcome::Rejected { returned, .. } => {
                returned
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RequestQueue
// ---------------------------------------------------------------------------

/// Requests waiting for the next tick boundary.
///
/// Supports optional history tracking for replay and debugging.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    pending: Vec<SlotRequest>,
    /// Applied requests: (tick, request).
    history: Vec<(u64, SlotRequest)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    /// Change the history bound, dropping the oldest entries if it shrank.
    pub fn set_max_history(&mut self, max_history: usize) {
        self.max_history = max_history;
        let excess = self.history.len().saturating_sub(max_history);
        self.history.drain(..excess);
    }

    pub fn push(&mut self, request: SlotRequest) {
        self.pending.push(request);
    }

    /// Take every pending request in submission order, recording them in
    /// the history under `tick`.
    pub fn drain(&mut self, tick: u64) -> Vec<SlotRequest> {
        let requests: Vec<SlotRequest> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            self.history
                .extend(requests.iter().map(|r| (tick, r.clone())));
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        requests
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, SlotRequest)] {
        &self.history
    }
}

// ---------------------------------------------------------------------------
// Quarry control methods
// ---------------------------------------------------------------------------

impl Quarry {
    /// Apply a request right now. Only call this between ticks.
    pub fn request<C: ItemClassification + ?Sized>(
        &mut self,
        request: SlotRequest,
        catalog: &C,
    ) -> RequestOutcome {
        self.apply_request(request, catalog)
    }

    /// Queue a request for the pre-tick phase of the next `step()`.
    pub fn queue_request(&mut self, request: SlotRequest) {
        self.requests.push(request);
    }

    /// Keep up to `max` applied requests for inspection.
    pub fn enable_request_history(&mut self, max: usize) {
        self.requests.set_max_history(max);
    }

    pub fn request_queue(&self) -> &RequestQueue {
        &self.requests
    }

    pub fn has_tool<C: ItemClassification + ?Sized>(&self, catalog: &C) -> bool {
        is_valid_tool(catalog, self.state.tool.as_ref())
    }

    /// Whether the fuel slot holds something that burns.
    pub fn has_fuel<C: ItemClassification + ?Sized>(&self, catalog: &C) -> bool {
        self.state
            .fuel
            .as_ref()
            .is_some_and(|s| !s.is_empty() && catalog.fuel_value(s.item_type) > 0)
    }

    pub(crate) fn apply_request<C: ItemClassification + ?Sized>(
        &mut self,
        request: SlotRequest,
        catalog: &C,
    ) -> RequestOutcome {
        debug!(?request, "applying slot request");
        let outcome = match request {
            SlotRequest::InsertTool(stack) => self.insert_tool(stack, catalog),
            SlotRequest::InsertFuel(stack) => self.insert_fuel(stack, catalog),
            SlotRequest::TakeTool => match self.state.tool.take() {
                Some(tool) => RequestOutcome::applied([tool]),
                None => RequestOutcome::rejected(RejectReason::EmptySlot, []),
            },
            SlotRequest::TakeFuel { amount } => self.take_fuel(amount),
            SlotRequest::TakeOutput { slot, amount } => self.take_output(slot, amount),
            SlotRequest::WriteOutput { slot, stack } => self.write_output(slot, stack, catalog),
            SlotRequest::QuickInsert(stack) => {
                if catalog.tool_tier(stack.item_type).is_some() {
                    self.insert_tool(stack, catalog)
                } else if catalog.fuel_value(stack.item_type) > 0 {
                    self.insert_fuel(stack, catalog)
                } else {
                    RequestOutcome::rejected(RejectReason::NoAcceptingSlot, [stack])
                }
            }
        };
        if outcome.is_applied() {
            self.dirty = true;
        }
        outcome
    }

    fn insert_tool<C: ItemClassification + ?Sized>(
        &mut self,
        mut stack: ItemStack,
        catalog: &C,
    ) -> RequestOutcome {
        if stack.is_empty() {
            return RequestOutcome::rejected(RejectReason::NothingToInsert, []);
        }
        if catalog.tool_tier(stack.item_type).is_none() {
            return RequestOutcome::rejected(RejectReason::NotATool, [stack]);
        }
        if self.state.tool.is_some() {
            return RequestOutcome::rejected(RejectReason::SlotOccupied, [stack]);
        }
        self.state.tool = Some(stack.split(1));
        RequestOutcome::applied([stack])
    }

    fn insert_fuel<C: ItemClassification + ?Sized>(
        &mut self,
        mut stack: ItemStack,
        catalog: &C,
    ) -> RequestOutcome {
        if stack.is_empty() {
            return RequestOutcome::rejected(RejectReason::NothingToInsert, []);
        }
        if catalog.fuel_value(stack.item_type) == 0 {
            return RequestOutcome::rejected(RejectReason::NotFuel, [stack]);
        }
        let limit = catalog.max_stack_size(stack.item_type).max(1);
        match self.state.fuel.as_mut() {
            None => {
                self.state.fuel = Some(stack.split(limit));
                RequestOutcome::applied([stack])
            }
            Some(existing) if existing.can_stack_with(&stack) && existing.quantity < limit => {
                let room = limit - existing.quantity;
                existing.quantity += stack.split(room).quantity;
                RequestOutcome::applied([stack])
            }
            Some(_) => RequestOutcome::rejected(RejectReason::SlotOccupied, [stack]),
        }
    }

    fn take_fuel(&mut self, amount: u32) -> RequestOutcome {
        let Some(fuel) = self.state.fuel.as_mut() else {
            return RequestOutcome::rejected(RejectReason::EmptySlot, []);
        };
        let taken = fuel.split(amount);
        if fuel.is_empty() {
            self.state.fuel = None;
        }
        RequestOutcome::applied([taken])
    }

    fn take_output(&mut self, slot: usize, amount: u32) -> RequestOutcome {
        if slot >= self.state.outputs.len() {
            return RequestOutcome::rejected(RejectReason::NoSuchSlot, []);
        }
        match self.state.outputs.take(slot, amount) {
            Some(taken) => RequestOutcome::applied([taken]),
            None => RequestOutcome::rejected(RejectReason::EmptySlot, []),
        }
    }

    fn write_output<C: ItemClassification + ?Sized>(
        &mut self,
        slot: usize,
        stack: Option<ItemStack>,
        catalog: &C,
    ) -> RequestOutcome {
        if slot >= self.state.outputs.len() {
            return RequestOutcome::rejected(RejectReason::NoSuchSlot, stack);
        }
        let previous = self.state.outputs.take(slot, u32::MAX);
        let limit = stack
            .as_ref()
            .map_or(u32::MAX, |s| catalog.max_stack_size(s.item_type));
        let excess = self.state.outputs.set_slot(slot, stack, limit);
        RequestOutcome::applied(previous.into_iter().chain(excess))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuarryConfig;
    use crate::machine::QuarryStatus;
    use crate::test_utils::*;
    use crate::world::BlockPos;

    const ORIGIN: BlockPos = BlockPos::new(0, 64, 0);

    fn quarry() -> Quarry {
        Quarry::new(ORIGIN, QuarryConfig::default())
    }

    #[test]
    fn tool_slot_takes_exactly_one_tool() {
        let catalog = test_catalog();
        let mut q = quarry();
        let outcome = q.request(SlotRequest::InsertTool(ItemStack::new(iron_pickaxe(), 3)), &catalog);
        assert_eq!(
            outcome,
            RequestOutcome::Applied {
                returned: vec![ItemStack::new(iron_pickaxe(), 2)]
            }
        );
        assert_eq!(q.state().tool, Some(ItemStack::new(iron_pickaxe(), 1)));
        assert!(q.has_tool(&catalog));
        assert!(q.is_dirty());
    }

    #[test]
    fn tool_slot_rejects_non_tools_and_occupancy() {
        let catalog = test_catalog();
        let mut q = quarry();
        let outcome = q.request(SlotRequest::InsertTool(ItemStack::new(coal(), 1)), &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::NotATool));
        assert_eq!(outcome.returned(), &[ItemStack::new(coal(), 1)]);

        let _ = q.request(SlotRequest::InsertTool(ItemStack::new(iron_pickaxe(), 1)), &catalog);
        let outcome = q.request(SlotRequest::InsertTool(ItemStack::new(golden_pickaxe(), 1)), &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::SlotOccupied));
        assert_eq!(q.state().tool.as_ref().unwrap().item_type, iron_pickaxe());
    }

    #[test]
    fn fuel_slot_merges_up_to_stack_limit() {
        let catalog = test_catalog();
        let mut q = quarry();
        let _ = q.request(SlotRequest::InsertFuel(ItemStack::new(coal(), 40)), &catalog);
        let outcome = q.request(SlotRequest::InsertFuel(ItemStack::new(coal(), 40)), &catalog);
        assert_eq!(outcome.returned(), &[ItemStack::new(coal(), 16)]);
        assert_eq!(q.state().fuel.as_ref().unwrap().quantity, 64);
        assert!(q.has_fuel(&catalog));
    }

    #[test]
    fn fuel_slot_rejects_non_fuel_and_mismatched_fuel() {
        let catalog = test_catalog();
        let mut q = quarry();
        let outcome = q.request(SlotRequest::InsertFuel(ItemStack::new(cobblestone(), 5)), &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::NotFuel));

        let _ = q.request(SlotRequest::InsertFuel(ItemStack::new(coal(), 1)), &catalog);
        let outcome = q.request(SlotRequest::InsertFuel(ItemStack::new(charcoal(), 1)), &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::SlotOccupied));
    }

    #[test]
    fn quick_insert_routes_by_classification() {
        let catalog = test_catalog();
        let mut q = quarry();
        assert!(q
            .request(SlotRequest::QuickInsert(ItemStack::new(diamond_pickaxe(), 1)), &catalog)
            .is_applied());
        assert!(q
            .request(SlotRequest::QuickInsert(ItemStack::new(lava_bucket(), 1)), &catalog)
            .is_applied());
        let outcome = q.request(SlotRequest::QuickInsert(ItemStack::new(dirt(), 9)), &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::NoAcceptingSlot));
        assert_eq!(outcome.returned(), &[ItemStack::new(dirt(), 9)]);
        assert_eq!(q.state().tool.as_ref().unwrap().item_type, diamond_pickaxe());
        assert_eq!(q.state().fuel.as_ref().unwrap().item_type, lava_bucket());
    }

    #[test]
    fn outputs_allow_partial_withdrawal() {
        let catalog = test_catalog();
        let mut q = quarry();
        let _ = q.state.outputs.insert(ItemStack::new(cobblestone(), 10), 64);
        let outcome = q.request(SlotRequest::TakeOutput { slot: 0, amount: 4 }, &catalog);
        assert_eq!(outcome.returned(), &[ItemStack::new(cobblestone(), 4)]);
        assert_eq!(q.state().outputs.total(), 6);

        let outcome = q.request(SlotRequest::TakeOutput { slot: 5, amount: 1 }, &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::EmptySlot));
        let outcome = q.request(SlotRequest::TakeOutput { slot: 99, amount: 1 }, &catalog);
        assert_eq!(outcome.reject_reason(), Some(RejectReason::NoSuchSlot));
    }

    #[test]
    fn write_output_reclamps_and_returns_previous() {
        let catalog = test_catalog();
        let mut q = quarry();
        let _ = q.state.outputs.insert(ItemStack::new(dirt(), 3), 64);
        let outcome = q.request(
            SlotRequest::WriteOutput {
                slot: 0,
                stack: Some(ItemStack::new(snowball(), 40)),
            },
            &catalog,
        );
        assert_eq!(
            outcome.returned(),
            &[ItemStack::new(dirt(), 3), ItemStack::new(snowball(), 24)]
        );
        assert_eq!(q.state().outputs.slot(0), Some(&ItemStack::new(snowball(), 16)));
    }

    #[test]
    fn take_fuel_returns_spent_bucket() {
        let catalog = test_catalog();
        let mut q = quarry();
        q.state.fuel = Some(ItemStack::new(bucket(), 1));
        assert!(!q.has_fuel(&catalog));
        let outcome = q.request(SlotRequest::TakeFuel { amount: 1 }, &catalog);
        assert_eq!(outcome.returned(), &[ItemStack::new(bucket(), 1)]);
        assert!(q.state().fuel.is_none());
    }

    #[test]
    fn queued_requests_apply_at_next_tick() {
        let catalog = test_catalog();
        let mut world = stone_world(ORIGIN, 2, 2);
        let mut q = quarry();
        q.queue_request(SlotRequest::InsertTool(ItemStack::new(golden_pickaxe(), 1)));
        q.queue_request(SlotRequest::InsertFuel(ItemStack::new(coal(), 1)));
        assert!(q.state().tool.is_none());
        assert_eq!(q.request_queue().pending_count(), 2);

        let report = q.step(&mut world, &catalog);
        assert_eq!(report.request_outcomes.len(), 2);
        assert!(report.request_outcomes.iter().all(RequestOutcome::is_applied));
        assert_eq!(report.status, QuarryStatus::Mining);
        assert!(q.request_queue().is_empty());
    }

    #[test]
    fn request_history_is_bounded() {
        let mut queue = RequestQueue::with_max_history(2);
        for _ in 0..3 {
            queue.push(SlotRequest::TakeTool);
        }
        let drained = queue.drain(7);
        assert_eq!(drained.len(), 3);
        assert_eq!(queue.history().len(), 2);
        assert!(queue.history().iter().all(|(tick, _)| *tick == 7));

        queue.set_max_history(1);
        assert_eq!(queue.history().len(), 1);
    }

    #[test]
    fn enabling_history_keeps_pending_requests() {
        let mut q = quarry();
        q.queue_request(SlotRequest::TakeTool);
        q.enable_request_history(4);
        assert_eq!(q.request_queue().pending_count(), 1);
    }
}
