use crate::types::{Placement, Rect};

/// An unoccupied axis-aligned region of the board. x runs along the board's
/// length, y along its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRect {
    pub x: u32,
    pub y: u32,
    pub rect: Rect,
}

impl FreeRect {
    fn covers(&self, other: &FreeRect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.x + other.rect.length <= self.x + self.rect.length
            && other.y + other.rect.width <= self.y + self.rect.width
    }
}

/// A cut still waiting for a board, carrying its caller-assigned identity.
#[derive(Debug, Clone, Copy)]
pub struct PendingCut {
    pub id: usize,
    pub rect: Rect,
}

/// Result of packing one board: what landed, what is still pending, and the
/// board area left uncovered (for waste accounting).
#[derive(Debug, Clone)]
pub struct PackOutcome {
    pub placements: Vec<Placement>,
    pub pending: Vec<PendingCut>,
    pub leftover_area: u64,
}

/// A single-board packing strategy. Each call owns its entire working state;
/// nothing is shared between invocations, so concurrent trial runs are safe.
pub trait PackStrategy {
    fn pack(&self, board: Rect, cuts: &[PendingCut], allow_rotation: bool) -> PackOutcome;
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    free_idx: usize,
    rotated: bool,
    // (shortest leftover side, longest leftover side); lower is tighter
    score: (u32, u32),
}

/// Best-fit packing scored by shortest leftover side.
///
/// Free rectangles start as the whole board. Each placed cut consumes its
/// rectangle, which is split along its shorter leftover axis into up to two
/// residuals; free rectangles fully contained in another are then pruned.
/// Ties on score go to the free rectangle encountered first in working-set
/// order, normal orientation before rotated, which keeps results
/// deterministic for identical inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortSideFit;

impl PackStrategy for ShortSideFit {
    fn pack(&self, board: Rect, cuts: &[PendingCut], allow_rotation: bool) -> PackOutcome {
        let mut free: Vec<FreeRect> = vec![FreeRect {
            x: 0,
            y: 0,
            rect: board,
        }];
        let mut placements: Vec<Placement> = Vec::new();
        let mut pending: Vec<PendingCut> = Vec::new();

        for cut in cuts {
            let Some(best) = find_best(&free, cut.rect, allow_rotation) else {
                // Doesn't fit anywhere on this board; a later board may take it.
                pending.push(*cut);
                continue;
            };

            let chosen = free.swap_remove(best.free_idx);
            let placed = if best.rotated {
                cut.rect.rotated()
            } else {
                cut.rect
            };
            split(&mut free, chosen, placed);
            prune_contained(&mut free);

            placements.push(Placement {
                cut_id: cut.id,
                x: chosen.x,
                y: chosen.y,
                length: placed.length,
                width: placed.width,
                rotated: best.rotated,
            });
        }

        let placed_area: u64 = placements.iter().map(|p| p.rect().area()).sum();
        PackOutcome {
            placements,
            pending,
            leftover_area: board.area() - placed_area,
        }
    }
}

fn find_best(free: &[FreeRect], piece: Rect, allow_rotation: bool) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for (idx, fr) in free.iter().enumerate() {
        if piece.fits_in(&fr.rect) {
            let score = fit_score(piece, fr.rect);
            if best.is_none_or(|b| score < b.score) {
                best = Some(Candidate {
                    free_idx: idx,
                    rotated: false,
                    score,
                });
            }
        }
        if allow_rotation && piece.length != piece.width {
            let rotated = piece.rotated();
            if rotated.fits_in(&fr.rect) {
                let score = fit_score(rotated, fr.rect);
                if best.is_none_or(|b| score < b.score) {
                    best = Some(Candidate {
                        free_idx: idx,
                        rotated: true,
                        score,
                    });
                }
            }
        }
    }

    best
}

fn fit_score(piece: Rect, free: Rect) -> (u32, u32) {
    let leftover_l = free.length - piece.length;
    let leftover_w = free.width - piece.width;
    (
        std::cmp::min(leftover_l, leftover_w),
        std::cmp::max(leftover_l, leftover_w),
    )
}

/// Splits the consumed free rectangle along its shorter leftover axis: the
/// narrow remainder hugs the placed cut, the wide one spans the full side.
fn split(free: &mut Vec<FreeRect>, consumed: FreeRect, placed: Rect) {
    let leftover_l = consumed.rect.length - placed.length;
    let leftover_w = consumed.rect.width - placed.width;

    if leftover_l > 0 && leftover_w > 0 {
        if leftover_l < leftover_w {
            free.push(FreeRect {
                x: consumed.x + placed.length,
                y: consumed.y,
                rect: Rect::new(leftover_l, placed.width),
            });
            free.push(FreeRect {
                x: consumed.x,
                y: consumed.y + placed.width,
                rect: Rect::new(consumed.rect.length, leftover_w),
            });
        } else {
            free.push(FreeRect {
                x: consumed.x + placed.length,
                y: consumed.y,
                rect: Rect::new(leftover_l, consumed.rect.width),
            });
            free.push(FreeRect {
                x: consumed.x,
                y: consumed.y + placed.width,
                rect: Rect::new(placed.length, leftover_w),
            });
        }
    } else if leftover_l > 0 {
        free.push(FreeRect {
            x: consumed.x + placed.length,
            y: consumed.y,
            rect: Rect::new(leftover_l, consumed.rect.width),
        });
    } else if leftover_w > 0 {
        free.push(FreeRect {
            x: consumed.x,
            y: consumed.y + placed.width,
            rect: Rect::new(placed.length, leftover_w),
        });
    }
}

/// Drops any free rectangle fully contained in another, keeping the working
/// set minimal. Of two identical rectangles only the later one is dropped.
fn prune_contained(free: &mut Vec<FreeRect>) {
    let mut i = 0;
    while i < free.len() {
        let mut contained = false;
        for j in 0..free.len() {
            if i == j {
                continue;
            }
            if free[j].covers(&free[i]) && !(free[i] == free[j] && i < j) {
                contained = true;
                break;
            }
        }
        if contained {
            free.swap_remove(i);
        } else {
            i += 1;
        }
    }
}
