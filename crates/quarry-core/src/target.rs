//! Target resolution: walk the cursor until it lands on something worth
//! breaking.

use crate::cursor::{AreaTier, ExcavationCursor};
use crate::world::{BlockPos, WorldAccess};
use tracing::trace;

/// Why a probed coordinate was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Air,
    Unbreakable,
    OtherQuarry,
}

/// Finds the next breakable block under a quarry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetResolver {
    /// Probe budget per call.
    pub max_probes: u32,
}

impl TargetResolver {
    pub fn new(max_probes: u32) -> Self {
        Self { max_probes }
    }

    /// Probe forward from the cursor for a breakable block.
    ///
    /// The cursor advances on every probe, accepted or not, so repeated
    /// calls always make progress. Returns `None` when the current layer is
    /// below the world floor or the probe budget ran out; neither is an
    /// error.
    pub fn find_next_target<W: WorldAccess + ?Sized>(
        &self,
        cursor: &mut ExcavationCursor,
        tier: AreaTier,
        origin: BlockPos,
        world: &W,
    ) -> Option<BlockPos> {
        let floor = world.min_depth() as i64;
        let mut probes = 0;

        while probes < self.max_probes && cursor.layer_y(origin) >= floor {
            let target = cursor.target(origin, tier);
            cursor.advance(tier);
            probes += 1;

            match classify(world, target) {
                Ok(()) => return Some(target),
                Err(reason) => trace!(?target, ?reason, "skipping excavation target"),
            }
        }

        None
    }
}

fn classify<W: WorldAccess + ?Sized>(world: &W, pos: BlockPos) -> Result<(), Rejection> {
    if world.is_air(pos) {
        return Err(Rejection::Air);
    }
    if !world.hardness(pos).is_breakable() {
        return Err(Rejection::Unbreakable);
    }
    if world.is_same_machine_kind(pos) {
        return Err(Rejection::OtherQuarry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    const ORIGIN: BlockPos = BlockPos::new(0, 10, 0);

    #[test]
    fn first_solid_block_is_accepted() {
        let mut world = GridWorld::new(0);
        world.set(BlockPos::new(-2, 9, -2), TestBlock::stone());
        let mut cursor = ExcavationCursor::new();
        let tier = AreaTier::new(2);
        let found = TargetResolver::new(512).find_next_target(&mut cursor, tier, ORIGIN, &world);
        assert_eq!(found, Some(BlockPos::new(-2, 9, -2)));
        assert_eq!(cursor.index(), 1);
    }

    #[test]
    fn skips_air_bedrock_and_quarries() {
        let mut world = GridWorld::new(0);
        world.set(BlockPos::new(-1, 9, -1), TestBlock::Bedrock);
        world.set(BlockPos::new(-1, 9, 0), TestBlock::Quarry);
        world.set(BlockPos::new(-1, 9, 1), TestBlock::stone());
        let mut cursor = ExcavationCursor::new();
        let tier = AreaTier::new(1);
        let found = TargetResolver::new(512).find_next_target(&mut cursor, tier, ORIGIN, &world);
        assert_eq!(found, Some(BlockPos::new(-1, 9, 1)));
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn probe_cap_bounds_work_in_empty_columns() {
        let world = GridWorld::new(-10_000);
        let mut cursor = ExcavationCursor::new();
        let tier = AreaTier::new(2);
        let found = TargetResolver::new(512).find_next_target(&mut cursor, tier, ORIGIN, &world);
        assert_eq!(found, None);
        // 512 probes over 25-entry layers: 20 full layers plus 12 entries.
        assert_eq!(cursor.depth(), 21);
        assert_eq!(cursor.index(), 12);
    }

    #[test]
    fn stops_at_world_floor() {
        let world = GridWorld::new(8);
        let mut cursor = ExcavationCursor::new();
        let tier = AreaTier::new(1);
        let found = TargetResolver::new(512).find_next_target(&mut cursor, tier, ORIGIN, &world);
        assert_eq!(found, None);
        // Layers at y=9 and y=8 are probed, y=7 is below the floor.
        assert_eq!(cursor.depth(), 3);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn finds_blocks_on_deeper_layers() {
        let mut world = GridWorld::new(0);
        world.set(BlockPos::new(0, 7, 0), TestBlock::stone());
        let mut cursor = ExcavationCursor::new();
        let tier = AreaTier::new(1);
        let found = TargetResolver::new(512).find_next_target(&mut cursor, tier, ORIGIN, &world);
        assert_eq!(found, Some(BlockPos::new(0, 7, 0)));
        assert_eq!(cursor.depth(), 3);
        assert_eq!(cursor.index(), 5);
    }
}
