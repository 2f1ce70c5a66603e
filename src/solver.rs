use std::collections::HashSet;

use crate::packer::{PackStrategy, PendingCut, ShortSideFit};
use crate::types::{
    Board, BoardPlan, CutRequirement, Objective, OptimizationConfig, OptimizationResult,
};

/// Orders candidate boards by the active objective: ascending area when
/// minimizing waste, ascending cost when minimizing spend. The sort is stable,
/// so boards tied on the key keep their inventory order.
pub fn order_boards(boards: &[Board], objective: Objective) -> Vec<Board> {
    let mut ordered = boards.to_vec();
    match objective {
        Objective::Waste => ordered.sort_by_key(|b| b.area()),
        Objective::Cost => ordered.sort_by(|a, b| a.cost.total_cmp(&b.cost)),
    }
    ordered
}

/// Orders cuts largest-area-first; placing big pieces early keeps the free
/// space from fragmenting. Stable, so equal-area cuts keep caller order.
pub fn order_cuts(cuts: &[CutRequirement]) -> Vec<PendingCut> {
    let mut ordered: Vec<PendingCut> = cuts
        .iter()
        .map(|c| PendingCut {
            id: c.id,
            rect: c.rect(),
        })
        .collect();
    ordered.sort_by_key(|c| std::cmp::Reverse(c.rect.area()));
    ordered
}

/// Greedy multi-board allocator. Walks boards in selector order, packs each
/// with the still-pending cuts, and stops once every cut is placed or the
/// inventory snapshot is exhausted. Boards that take zero cuts are skipped
/// and charged nothing.
pub struct Optimizer {
    boards: Vec<Board>,
    cuts: Vec<CutRequirement>,
    config: OptimizationConfig,
}

impl Optimizer {
    pub fn new(boards: Vec<Board>, cuts: Vec<CutRequirement>, config: OptimizationConfig) -> Self {
        Self {
            boards,
            cuts,
            config,
        }
    }

    pub fn run(&self) -> OptimizationResult {
        self.run_with(&ShortSideFit)
    }

    pub fn run_with(&self, strategy: &dyn PackStrategy) -> OptimizationResult {
        let ordered = order_boards(&self.boards, self.config.optimize_for);
        let mut pending = order_cuts(&self.cuts);

        let mut board_plans: Vec<BoardPlan> = Vec::new();
        let mut total_cost = 0.0;
        let mut used_board_area: u64 = 0;
        let mut total_placed_area: u64 = 0;

        for board in &ordered {
            if pending.is_empty() {
                break;
            }

            let outcome = strategy.pack(board.rect(), &pending, self.config.allow_rotation);
            if outcome.placements.is_empty() {
                continue;
            }

            let board_area = board.area();
            let placed_area = board_area - outcome.leftover_area;
            board_plans.push(BoardPlan {
                board_id: board.id,
                board_length: board.length,
                board_width: board.width,
                placements: outcome.placements,
                waste_percentage: waste_percentage(board_area, placed_area),
            });

            total_cost += board.cost;
            used_board_area += board_area;
            total_placed_area += placed_area;
            pending = outcome.pending;
        }

        let total_waste_percentage = if used_board_area > 0 {
            waste_percentage(used_board_area, total_placed_area)
        } else {
            0.0
        };

        OptimizationResult {
            unplaced_cuts: self.unplaced(&board_plans),
            board_plans,
            total_waste_percentage,
            total_cost,
        }
    }

    /// Re-derives the unplaced list from identity, in the caller's original
    /// cut-list order rather than the packing order.
    fn unplaced(&self, board_plans: &[BoardPlan]) -> Vec<CutRequirement> {
        let placed: HashSet<usize> = board_plans
            .iter()
            .flat_map(|plan| plan.placements.iter().map(|p| p.cut_id))
            .collect();
        self.cuts
            .iter()
            .filter(|c| !placed.contains(&c.id))
            .copied()
            .collect()
    }
}

/// Aggregate waste counts only boards that actually contributed a plan;
/// skipped boards never enter the denominator.
fn waste_percentage(board_area: u64, placed_area: u64) -> f64 {
    (board_area - placed_area) as f64 / board_area as f64 * 100.0
}
