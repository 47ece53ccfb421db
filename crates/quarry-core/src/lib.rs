//! Quarry Core -- the tick-driven simulation of an autonomous mining machine.
//!
//! A quarry sits on the surface, takes a pickaxe and fuel, and digs a square
//! column beneath itself one block at a time, layer after layer, collecting
//! the drops into a bounded output store.
//!
//! # Tick Pipeline
//!
//! Each call to [`engine::Quarry::step`] advances one machine by one tick:
//!
//! 1. **Pre-tick** -- Apply queued slot requests from the control surface.
//! 2. **Tool** -- Validate the tool and derive ticks-per-block from its tier.
//! 3. **Fuel** -- Burn one fuel unit if the block budget is exhausted.
//! 4. **Mine** -- Accumulate progress; on completion find the next target,
//!    break it, route its drops and pay one unit of budget.
//! 5. **Bookkeeping** -- Publish the read-only view and bump the tick.
//!
//! # Key Types
//!
//! - [`engine::Quarry`] -- One placed machine and its state machine.
//! - [`catalog::ItemClassification`] -- Tool tiers, fuel values, remainders.
//!   [`catalog::Catalog`] is the stock, data-driven implementation.
//! - [`world::WorldAccess`] / [`world::DropSink`] -- The host world.
//! - [`cursor::ExcavationCursor`] -- Restartable `(depth, index)` position
//!   in the excavation pattern.
//! - [`store::OutputStore`] -- Fixed-capacity, stack-merging inventory.
//! - [`control::SlotRequest`] -- Validated writes from players.
//! - [`query::QuarryView`] -- The per-tick read-only projection.
//! - [`serialize`] -- Versioned snapshots via bitcode, clamped on load.
//! - [`site::Site`] -- Placement and removal of many machines.

pub mod catalog;
pub mod config;
pub mod control;
pub mod cursor;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod fuel;
pub mod harvest;
pub mod id;
pub mod item;
pub mod machine;
pub mod query;
pub mod serialize;
pub mod sim;
pub mod site;
pub mod store;
pub mod target;
pub mod tool;
pub mod upgrade;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
