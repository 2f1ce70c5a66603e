use crate::types::{Placement, Rect};

const MAX_COLS: f64 = 80.0;
const MAX_ROWS: f64 = 40.0;

/// Character canvas for the ASCII layout view. Box-drawing uses '-', '|' and
/// '+' at crossings.
struct Grid {
    cells: Vec<char>,
    cols: usize,
    rows: usize,
}

impl Grid {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cells: vec![' '; cols * rows],
            cols,
            rows,
        }
    }

    fn put(&mut self, x: usize, y: usize, ch: char) {
        if x < self.cols && y < self.rows {
            let cell = &mut self.cells[y * self.cols + x];
            *cell = match (*cell, ch) {
                ('|', '-') | ('-', '|') | ('+', _) | (_, '+') => '+',
                _ => ch,
            };
        }
    }

    fn put_label(&mut self, x: usize, y: usize, ch: char) {
        if x < self.cols && y < self.rows {
            self.cells[y * self.cols + x] = ch;
        }
    }

    fn outline(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for i in x..=x + w {
            self.put(i, y, '-');
            self.put(i, y + h, '-');
        }
        for j in y..=y + h {
            self.put(x, j, '|');
            self.put(x + w, j, '|');
        }
        for &cx in &[x, x + w] {
            for &cy in &[y, y + h] {
                self.put(cx, cy, '+');
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Draws one board plan to scale: the board outline with every placed cut
/// outlined and labeled with its placed dimensions.
pub fn render_board(board: Rect, placements: &[Placement]) -> String {
    let scale = f64::min(
        MAX_COLS / board.length as f64,
        MAX_ROWS / board.width as f64,
    );
    let cols = (board.length as f64 * scale).round() as usize;
    let rows = (board.width as f64 * scale).round() as usize;
    if cols == 0 || rows == 0 {
        return String::new();
    }

    let mut grid = Grid::new(cols + 1, rows + 1);
    grid.outline(0, 0, cols, rows);

    for p in placements {
        let x = (p.x as f64 * scale).round() as usize;
        let y = (p.y as f64 * scale).round() as usize;
        let w = (p.length as f64 * scale).round() as usize;
        let h = (p.width as f64 * scale).round() as usize;
        if w == 0 || h == 0 {
            continue;
        }
        grid.outline(x, y, w, h);

        let label = p.rect().to_string();
        if w > 2 && h > 0 {
            let chars: Vec<char> = label.chars().collect();
            let cy = y + h / 2;
            let start = (x + w / 2).saturating_sub(chars.len() / 2);
            for (i, &ch) in chars.iter().enumerate() {
                let cx = start + i;
                if cx > x && cx < x + w && cy > y && cy < y + h {
                    grid.put_label(cx, cy, ch);
                }
            }
        }
    }

    grid.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(x: u32, y: u32, length: u32, width: u32) -> Placement {
        Placement {
            cut_id: 0,
            x,
            y,
            length,
            width,
            rotated: false,
        }
    }

    #[test]
    fn test_render_full_board_cut() {
        let out = render_board(Rect::new(100_000, 50_000), &[placement(0, 0, 100_000, 50_000)]);
        assert!(out.contains('+'));
        assert!(out.contains('-'));
        assert!(out.contains('|'));
        assert!(out.contains("100x50"));
    }

    #[test]
    fn test_render_side_by_side_cuts() {
        let out = render_board(
            Rect::new(100_000, 100_000),
            &[
                placement(0, 0, 50_000, 100_000),
                placement(50_000, 0, 50_000, 100_000),
            ],
        );
        assert!(out.contains("50x100"));
    }

    #[test]
    fn test_render_empty_board_keeps_outline() {
        let out = render_board(Rect::new(100_000, 100_000), &[]);
        assert!(out.contains('+'));
    }
}
