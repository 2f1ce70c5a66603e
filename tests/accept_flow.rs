//! End-to-end flow: stock the inventory, run a trial optimization against a
//! snapshot, accept the resulting plans, and verify consumed boards are gone
//! for good.

use board_optimizer::inventory::{Inventory, InventoryError};
use board_optimizer::solver::Optimizer;
use board_optimizer::types::{CutRequirement, OptimizationConfig};

#[test]
fn trial_runs_leave_inventory_untouched() {
    let inventory = Inventory::new();
    inventory.add(100_000, 50_000, 1_000);
    inventory.add(100_000, 50_000, 1_000);

    let cuts = vec![
        CutRequirement::new(0, 40_000, 30_000),
        CutRequirement::new(1, 60_000, 20_000),
    ];

    let boards = inventory.snapshot(1.0);
    let first = Optimizer::new(boards.clone(), cuts.clone(), OptimizationConfig::default()).run();
    let second = Optimizer::new(boards, cuts, OptimizationConfig::default()).run();

    assert_eq!(inventory.len(), 2, "trial runs must not consume boards");
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap(),
        "identical trials over the same snapshot must agree"
    );
}

#[test]
fn accepted_boards_cannot_be_accepted_twice() {
    let inventory = Inventory::new();
    inventory.add(100_000, 50_000, 1_000);
    inventory.add(100_000, 50_000, 1_000);
    inventory.add(200_000, 60_000, 1_000);

    let cuts = vec![
        CutRequirement::new(0, 90_000, 45_000),
        CutRequirement::new(1, 90_000, 45_000),
    ];

    let result = Optimizer::new(
        inventory.snapshot(1.0),
        cuts,
        OptimizationConfig::default(),
    )
    .run();
    assert!(result.unplaced_cuts.is_empty());

    let used: Vec<u64> = result.board_plans.iter().map(|p| p.board_id).collect();
    inventory.accept(&used).unwrap();
    assert_eq!(inventory.len(), 3 - used.len());

    // A stale plan referencing the same boards must conflict atomically.
    let err = inventory.accept(&used).unwrap_err();
    let InventoryError::Conflict(missing) = err;
    assert_eq!(missing.len(), used.len());
    assert_eq!(inventory.len(), 3 - used.len(), "failed accept removed nothing");
}

#[test]
fn replanning_after_acceptance_uses_remaining_stock() {
    let inventory = Inventory::new();
    let small = inventory.add(50_000, 50_000, 1_000);
    inventory.add(200_000, 100_000, 1_000);

    let cuts = vec![CutRequirement::new(0, 40_000, 40_000)];
    let result = Optimizer::new(
        inventory.snapshot(1.0),
        cuts.clone(),
        OptimizationConfig::default(),
    )
    .run();
    assert_eq!(result.board_plans[0].board_id, small);

    inventory.accept(&[small]).unwrap();

    let replanned = Optimizer::new(
        inventory.snapshot(1.0),
        cuts,
        OptimizationConfig::default(),
    )
    .run();
    assert_ne!(
        replanned.board_plans[0].board_id, small,
        "consumed board must not be offered again"
    );
}
