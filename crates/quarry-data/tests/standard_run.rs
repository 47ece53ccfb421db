//! Drives a quarry with the built-in catalog and a config read from disk.

use quarry_core::control::SlotRequest;
use quarry_core::engine::Quarry;
use quarry_core::item::ItemStack;
use quarry_core::machine::QuarryStatus;
use quarry_core::test_utils::{GridWorld, TestBlock, fill_layers};
use quarry_core::world::BlockPos;
use quarry_data::{load_config, standard_catalog};
use std::fs;

const ORIGIN: BlockPos = BlockPos::new(0, 64, 0);

#[test]
fn iron_pickaxe_and_lava_bucket_from_the_standard_catalog() {
    let catalog = standard_catalog().unwrap();
    let id = |name: &str| catalog.item_id(name).unwrap();

    let mut world = GridWorld::new(0);
    fill_layers(&mut world, ORIGIN, 2, 1, TestBlock::ore(id("cobblestone"), 1));

    let mut quarry = Quarry::new(ORIGIN, Default::default());
    assert!(quarry
        .request(SlotRequest::InsertTool(ItemStack::new(id("iron_pickaxe"), 1)), &catalog)
        .is_applied());
    assert!(quarry
        .request(SlotRequest::InsertFuel(ItemStack::new(id("lava_bucket"), 1)), &catalog)
        .is_applied());

    // Iron breaks a block every 120 ticks.
    quarry.advance(&mut world, &catalog, 600);
    assert_eq!(quarry.status(), QuarryStatus::Mining);
    assert_eq!(quarry.state().outputs.total(), 5);
    assert_eq!(quarry.state().ledger.remaining(), 95);
    assert_eq!(quarry.state().fuel, Some(ItemStack::new(id("bucket"), 1)));
}

#[test]
fn narrow_config_from_toml_limits_the_store() {
    let dir = std::env::temp_dir().join(format!("quarry_data_run_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("quarry.toml"), "output_slots = 1\nmax_stack_size = 2\n").unwrap();
    let config = load_config(&dir).unwrap();
    let _ = fs::remove_dir_all(&dir);

    let catalog = standard_catalog().unwrap();
    let id = |name: &str| catalog.item_id(name).unwrap();
    let mut world = GridWorld::new(0);
    fill_layers(&mut world, ORIGIN, 2, 1, TestBlock::ore(id("dirt"), 1));

    let mut quarry = Quarry::new(ORIGIN, config);
    let _ = quarry.request(SlotRequest::InsertTool(ItemStack::new(id("golden_pickaxe"), 1)), &catalog);
    let _ = quarry.request(SlotRequest::InsertFuel(ItemStack::new(id("coal"), 1)), &catalog);

    // Gold breaks a block every 20 ticks: four blocks, two kept, two spilled.
    quarry.advance(&mut world, &catalog, 80);
    assert_eq!(quarry.state().outputs.total(), 2);
    assert_eq!(world.spilled_total(), 2);
}

#[test]
fn huge_area_from_toml_runs_without_overflow() {
    let dir = std::env::temp_dir().join(format!("quarry_data_area_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("quarry.toml"),
        "[area]\nbase_half_width = 4294967295\nstep = 4294967295\nmax_upgrades = 4294967295\n",
    )
    .unwrap();
    let config = load_config(&dir).unwrap();
    let _ = fs::remove_dir_all(&dir);

    let catalog = standard_catalog().unwrap();
    let id = |name: &str| catalog.item_id(name).unwrap();
    let mut world = GridWorld::new(0);
    let mut quarry = Quarry::new(ORIGIN, config);
    quarry.set_upgrades(i64::MAX);
    let _ = quarry.request(SlotRequest::InsertTool(ItemStack::new(id("golden_pickaxe"), 1)), &catalog);
    let _ = quarry.request(SlotRequest::InsertFuel(ItemStack::new(id("coal"), 1)), &catalog);

    quarry.advance(&mut world, &catalog, 200);
    assert_eq!(world.removed(), 0);
    assert_eq!(quarry.state().cursor.depth(), 1);
}
