use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::types::{Board, BoardId, dim};

/// Volume divisor for board-foot pricing: length x width x depth in inches
/// over 144 gives board feet.
const BOARD_FOOT_DIVISOR: f64 = 144.0;

pub const DEFAULT_COST_PER_UNIT: f64 = 1.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// One or more accepted plans reference boards that are no longer in
    /// inventory (consumed by a prior acceptance). Nothing was removed.
    #[error("boards no longer in inventory: {0:?}")]
    Conflict(Vec<BoardId>),
}

#[derive(Debug, Clone, Copy)]
struct StoredBoard {
    length: u32,
    width: u32,
    depth: u32,
}

/// Grouping key for identical stock. Ordered width-first so the grouped
/// listing can be emitted largest-width, then largest-length, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BoardKey {
    width: u32,
    length: u32,
    depth: u32,
}

/// One line of the grouped inventory listing: identical boards collapsed to a
/// dimension row with a quantity and the ids backing it.
#[derive(Debug, Clone, Serialize)]
pub struct BoardGroup {
    #[serde(with = "dim")]
    pub length: u32,
    #[serde(with = "dim")]
    pub width: u32,
    #[serde(with = "dim")]
    pub depth: u32,
    pub cost: f64,
    pub quantity: usize,
    pub ids: Vec<BoardId>,
}

/// In-memory board store. Trial optimizations read a snapshot and never touch
/// the store; acceptance removes boards under the lock, so two acceptances
/// racing for the same board cannot both succeed.
#[derive(Debug, Default)]
pub struct Inventory {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    boards: BTreeMap<BoardId, StoredBoard>,
    next_id: BoardId,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a board with validated milliunit dimensions, returning its id.
    pub fn add(&self, length: u32, width: u32, depth: u32) -> BoardId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.boards.insert(
            id,
            StoredBoard {
                length,
                width,
                depth,
            },
        );
        id
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: BoardId) -> bool {
        self.inner.lock().unwrap().boards.contains_key(&id)
    }

    /// Costed copy of the inventory in id order, for one optimization run.
    pub fn snapshot(&self, cost_per_unit: f64) -> Vec<Board> {
        let inner = self.inner.lock().unwrap();
        inner
            .boards
            .iter()
            .map(|(&id, stored)| Board {
                id,
                length: stored.length,
                width: stored.width,
                depth: stored.depth,
                cost: unit_cost(stored, cost_per_unit),
            })
            .collect()
    }

    /// Removes the accepted boards as one batch. If any id is already gone
    /// the whole batch fails and the inventory is left untouched.
    pub fn accept(&self, board_ids: &[BoardId]) -> Result<(), InventoryError> {
        let mut ids: Vec<BoardId> = board_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut inner = self.inner.lock().unwrap();
        let missing: Vec<BoardId> = ids
            .iter()
            .copied()
            .filter(|id| !inner.boards.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(InventoryError::Conflict(missing));
        }
        for id in &ids {
            inner.boards.remove(id);
        }
        Ok(())
    }

    /// Collapses identical boards into dimension groups, ordered by width
    /// then length, both descending.
    pub fn grouped(&self, cost_per_unit: f64) -> Vec<BoardGroup> {
        let inner = self.inner.lock().unwrap();
        let mut groups: BTreeMap<BoardKey, BoardGroup> = BTreeMap::new();

        for (&id, stored) in &inner.boards {
            let key = BoardKey {
                width: stored.width,
                length: stored.length,
                depth: stored.depth,
            };
            groups
                .entry(key)
                .and_modify(|g| {
                    g.quantity += 1;
                    g.ids.push(id);
                })
                .or_insert_with(|| BoardGroup {
                    length: stored.length,
                    width: stored.width,
                    depth: stored.depth,
                    cost: unit_cost(stored, cost_per_unit),
                    quantity: 1,
                    ids: vec![id],
                });
        }

        groups.into_values().rev().collect()
    }
}

fn unit_cost(board: &StoredBoard, cost_per_unit: f64) -> f64 {
    let volume = crate::types::from_milli(board.length)
        * crate::types::from_milli(board.width)
        * crate::types::from_milli(board.depth);
    volume / BOARD_FOOT_DIVISOR * cost_per_unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_costs_in_board_feet() {
        let inv = Inventory::new();
        // 48 x 6 x 1 inches = 2 board feet
        inv.add(48_000, 6_000, 1_000);
        let boards = inv.snapshot(3.5);
        assert_eq!(boards.len(), 1);
        assert!((boards[0].cost - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_is_id_ordered_and_detached() {
        let inv = Inventory::new();
        let a = inv.add(10_000, 10_000, 1_000);
        let b = inv.add(20_000, 20_000, 1_000);
        let snap = inv.snapshot(1.0);
        assert_eq!(snap.iter().map(|bd| bd.id).collect::<Vec<_>>(), vec![a, b]);

        // Mutating inventory afterwards does not affect the snapshot.
        inv.accept(&[a]).unwrap();
        assert_eq!(snap.len(), 2);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_accept_removes_each_board_once() {
        let inv = Inventory::new();
        let a = inv.add(10_000, 10_000, 1_000);
        let b = inv.add(10_000, 10_000, 1_000);
        inv.accept(&[a, b, a]).unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn test_second_accept_conflicts_and_changes_nothing() {
        let inv = Inventory::new();
        let id = inv.add(10_000, 10_000, 1_000);
        let other = inv.add(20_000, 20_000, 1_000);

        inv.accept(&[id]).unwrap();
        let err = inv.accept(&[id, other]).unwrap_err();
        assert_eq!(err, InventoryError::Conflict(vec![id]));

        // The conflicting batch must not have consumed the valid board.
        assert!(inv.contains(other));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_grouped_collapses_identical_boards() {
        let inv = Inventory::new();
        let a = inv.add(48_000, 6_000, 1_000);
        let b = inv.add(48_000, 6_000, 1_000);
        inv.add(24_000, 4_000, 1_000);

        let groups = inv.grouped(1.0);
        assert_eq!(groups.len(), 2);
        let big = groups.iter().find(|g| g.length == 48_000).unwrap();
        assert_eq!(big.quantity, 2);
        assert_eq!(big.ids, vec![a, b]);
    }

    #[test]
    fn test_grouped_orders_by_width_then_length_descending() {
        let inv = Inventory::new();
        inv.add(24_000, 4_000, 1_000);
        inv.add(48_000, 6_000, 1_000);
        inv.add(36_000, 6_000, 1_000);

        let dims: Vec<(u32, u32)> = inv
            .grouped(1.0)
            .iter()
            .map(|g| (g.width, g.length))
            .collect();
        assert_eq!(
            dims,
            vec![(6_000, 48_000), (6_000, 36_000), (4_000, 24_000)]
        );
    }
}
