//! The board grid: a decorative template plus a mutable overlay.
//!
//! Cells are single characters. The template encodes the drawing of an
//! empty goban — borders, corners, and star points — and never changes
//! after construction. The current grid starts as a copy of the
//! template and gets stamped with `'b'`/`'w'` as stones are placed.
//! Clearing a cell restores its template character, which is how undo
//! puts the decoration back.

use sixstone_protocol::Stone;

use crate::GameError;

/// Standard goban size.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Smallest size the template layout supports.
pub const MIN_BOARD_SIZE: usize = 11;

/// A fixed-size grid with a static template and a mutable overlay.
///
/// Invariant: every cell is either its template character or exactly
/// one of `'b'` / `'w'`. `Board` does no legality checking — whose turn
/// it is and whether a placement is allowed live in
/// [`GameSession`](crate::GameSession), which validates coordinates
/// before calling in here.
#[derive(Debug, Clone)]
pub struct Board {
    size: usize,
    template: Vec<Vec<char>>,
    cells: Vec<Vec<char>>,
}

impl Board {
    /// Builds a board of the given size.
    ///
    /// The template uses the box-drawing digit convention of the
    /// numeric keypad: `'5'` for interior crossings, `'8'`/`'2'`/`'4'`/
    /// `'6'` for the top/bottom/left/right edges, `'7'`/`'9'`/`'1'`/
    /// `'3'` for the corners, and `'+'` for the nine star points at
    /// the cross product of rows/columns `{3, size/2, size-4}`.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidSize`] for even sizes or sizes
    /// below [`MIN_BOARD_SIZE`].
    pub fn new(size: usize) -> Result<Self, GameError> {
        if size < MIN_BOARD_SIZE || size % 2 == 0 {
            return Err(GameError::InvalidSize(size));
        }

        let mut template = vec![vec!['5'; size]; size];
        for i in 0..size {
            template[0][i] = '8';
            template[size - 1][i] = '2';
            template[i][0] = '4';
            template[i][size - 1] = '6';
        }
        template[0][0] = '7';
        template[0][size - 1] = '9';
        template[size - 1][0] = '1';
        template[size - 1][size - 1] = '3';
        for &row in &[3, size / 2, size - 4] {
            for &col in &[3, size / 2, size - 4] {
                template[row][col] = '+';
            }
        }

        let cells = template.clone();
        Ok(Self {
            size,
            template,
            cells,
        })
    }

    /// The board edge length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Renders the current grid as newline-joined rows.
    ///
    /// The result is the canonical, transport-agnostic snapshot string:
    /// no trailing newline, no carriage returns.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter());
        }
        out
    }

    /// The current grid as one `String` per row, for persistence.
    pub fn rows(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }

    /// Returns `true` iff the cell holds a stone.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        Stone::from_char(self.cells[y][x]).is_some()
    }

    /// Stamps a stone into the cell. No legality checking.
    pub fn set_stone(&mut self, x: usize, y: usize, stone: Stone) {
        self.cells[y][x] = stone.as_char();
    }

    /// Restores the cell to its template decoration.
    pub fn clear(&mut self, x: usize, y: usize) {
        self.cells[y][x] = self.template[y][x];
    }

    /// The current character at `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.cells[y][x]
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_even_size() {
        assert!(matches!(Board::new(18), Err(GameError::InvalidSize(18))));
    }

    #[test]
    fn test_new_rejects_too_small_size() {
        assert!(matches!(Board::new(9), Err(GameError::InvalidSize(9))));
        // 10 is both even and too small; either way it must fail.
        assert!(Board::new(10).is_err());
    }

    #[test]
    fn test_new_accepts_minimum_size() {
        let board = Board::new(MIN_BOARD_SIZE).unwrap();
        assert_eq!(board.size(), 11);
    }

    #[test]
    fn test_template_corners() {
        let b = Board::new(19).unwrap();
        assert_eq!(b.cell(0, 0), '7');
        assert_eq!(b.cell(18, 0), '9');
        assert_eq!(b.cell(0, 18), '1');
        assert_eq!(b.cell(18, 18), '3');
    }

    #[test]
    fn test_template_edges_and_interior() {
        let b = Board::new(19).unwrap();
        assert_eq!(b.cell(5, 0), '8'); // top edge
        assert_eq!(b.cell(5, 18), '2'); // bottom edge
        assert_eq!(b.cell(0, 5), '4'); // left edge
        assert_eq!(b.cell(18, 5), '6'); // right edge
        assert_eq!(b.cell(1, 1), '5'); // plain crossing
    }

    #[test]
    fn test_template_star_points() {
        let b = Board::new(19).unwrap();
        // Nine dots at the cross product of {3, 9, 15}.
        for &row in &[3, 9, 15] {
            for &col in &[3, 9, 15] {
                assert_eq!(b.cell(col, row), '+', "dot at ({col}, {row})");
            }
        }
        // And nowhere else on a sampled non-dot crossing.
        assert_eq!(b.cell(4, 4), '5');
    }

    #[test]
    fn test_render_shape() {
        let b = Board::new(19).unwrap();
        let rendered = b.render();
        assert_eq!(rendered.lines().count(), 19);
        assert!(rendered.lines().all(|l| l.chars().count() == 19));
        assert!(!rendered.ends_with('\n'));
        assert!(!rendered.contains('\r'));
    }

    #[test]
    fn test_set_and_clear_restores_template() {
        let mut b = Board::new(19).unwrap();
        // A star point keeps its decoration through a stone cycle.
        assert_eq!(b.cell(9, 9), '+');
        b.set_stone(9, 9, Stone::Black);
        assert!(b.is_occupied(9, 9));
        assert_eq!(b.cell(9, 9), 'b');
        b.clear(9, 9);
        assert!(!b.is_occupied(9, 9));
        assert_eq!(b.cell(9, 9), '+');
    }

    #[test]
    fn test_is_occupied_only_for_stones() {
        let mut b = Board::new(19).unwrap();
        assert!(!b.is_occupied(0, 0)); // corner decoration
        assert!(!b.is_occupied(3, 3)); // star point
        b.set_stone(3, 3, Stone::White);
        assert!(b.is_occupied(3, 3));
    }

    #[test]
    fn test_rows_matches_render() {
        let mut b = Board::new(11).unwrap();
        b.set_stone(5, 5, Stone::Black);
        assert_eq!(b.rows().join("\n"), b.render());
    }
}
