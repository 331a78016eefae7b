//! Fixed board geometry.
//!
//! The board is nine rows of flat-topped hexes with widths
//! `[1, 2, 3, 2, 3, 2, 3, 2, 1]`. Consecutive rows are offset by half a hex
//! vertically, so row `r` and row `r + 2` stack directly on top of each other
//! while row `r + 1` sits in the gaps.
//!
//! This module provides:
//! - `Corner`: an integer lattice point where settlements are built
//! - `RoadEdge`: a canonical pair of adjacent corners where roads are built
//! - `TilePos`: the (row, column) address of a tile
//! - the precomputed corner lattice and the spiral order used for tokens
//!
//! Everything here is pure and stateless.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of tiles in each row, top to bottom.
pub const ROW_WIDTHS: [usize; 9] = [1, 2, 3, 2, 3, 2, 3, 2, 1];

/// Total number of tiles on the board.
pub const TILE_COUNT: usize = 19;

/// Number tokens in the order they are laid down, keyed by their letter.
pub const TOKEN_LETTERS: [(char, u8); 18] = [
    ('a', 5),
    ('b', 2),
    ('c', 6),
    ('d', 3),
    ('e', 8),
    ('f', 10),
    ('g', 9),
    ('h', 12),
    ('i', 11),
    ('j', 4),
    ('k', 8),
    ('l', 10),
    ('m', 9),
    ('n', 4),
    ('o', 5),
    ('p', 6),
    ('q', 3),
    ('r', 11),
];

// Lattice spacing. A hex spans 4 units wide (1 + 2 + 1) and 2 units tall.
const MINOR_HORIZ: i32 = 1;
const MAJOR_HORIZ: i32 = 2;
const MINOR_VERT: i32 = 1;
const ORIGIN: (i32, i32) = (6, 1);

/// Rows whose first tile sits one step left of the previous row's first tile.
const LEFT_SHIFTED_ROWS: [usize; 4] = [1, 2, 4, 6];

/// A tile corner. Settlements and cities are built here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Corner {
    pub x: i32,
    pub y: i32,
}

impl Corner {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A road site between two adjacent corners.
///
/// Always stored lower corner first so that `(a, b)` and `(b, a)` compare
/// and hash identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoadEdge {
    a: Corner,
    b: Corner,
}

impl RoadEdge {
    /// Create a canonical edge from two corners in either order.
    pub fn new(a: Corner, b: Corner) -> Self {
        if a <= b {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }

    /// Both endpoints, lower first.
    pub fn endpoints(&self) -> [Corner; 2] {
        [self.a, self.b]
    }

    /// The endpoint opposite `corner`, if `corner` is on this edge.
    pub fn other(&self, corner: Corner) -> Option<Corner> {
        if corner == self.a {
            Some(self.b)
        } else if corner == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn touches(&self, corner: Corner) -> bool {
        self.a == corner || self.b == corner
    }
}

impl fmt::Display for RoadEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// Grid address of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub row: usize,
    pub col: usize,
}

impl TilePos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether this position exists on the board.
    pub fn is_on_board(&self) -> bool {
        self.row < ROW_WIDTHS.len() && self.col < ROW_WIDTHS[self.row]
    }

    /// Row-major index, `None` when off the board.
    pub fn index(&self) -> Option<usize> {
        if !self.is_on_board() {
            return None;
        }
        Some(ROW_WIDTHS[..self.row].iter().sum::<usize>() + self.col)
    }

    /// Every tile position in row-major order.
    pub fn all() -> impl Iterator<Item = TilePos> {
        ROW_WIDTHS
            .iter()
            .enumerate()
            .flat_map(|(row, &width)| (0..width).map(move |col| TilePos::new(row, col)))
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.row, self.col)
    }
}

/// Corners of one hex in order: left, lower-left, lower-right, right,
/// upper-right, upper-left. Consecutive entries (cyclically) share an edge.
fn hex_corners(x0: i32, y0: i32) -> [Corner; 6] {
    [
        Corner::new(x0, y0),
        Corner::new(x0 + MINOR_HORIZ, y0 + MINOR_VERT),
        Corner::new(x0 + MINOR_HORIZ + MAJOR_HORIZ, y0 + MINOR_VERT),
        Corner::new(x0 + 2 * MINOR_HORIZ + MAJOR_HORIZ, y0),
        Corner::new(x0 + MINOR_HORIZ + MAJOR_HORIZ, y0 - MINOR_VERT),
        Corner::new(x0 + MINOR_HORIZ, y0 - MINOR_VERT),
    ]
}

/// The corner layout of every tile, indexed `[row][col]`.
pub fn corner_lattice() -> Vec<Vec<[Corner; 6]>> {
    let step = MINOR_HORIZ + MAJOR_HORIZ;
    let mut rows: Vec<Vec<[Corner; 6]>> = Vec::with_capacity(ROW_WIDTHS.len());
    let (mut x0, mut y0) = ORIGIN;

    for (row, &width) in ROW_WIDTHS.iter().enumerate() {
        if row > 0 {
            y0 += MINOR_VERT;
            if LEFT_SHIFTED_ROWS.contains(&row) {
                x0 -= step;
            } else {
                x0 += step;
            }
        }

        let mut hexes = Vec::with_capacity(width);
        let mut x = x0;
        for _ in 0..width {
            let corners = hex_corners(x, y0);
            x = corners[3].x + MAJOR_HORIZ;
            hexes.push(corners);
        }
        rows.push(hexes);
    }

    rows
}

/// The order in which number tokens are laid on tiles.
///
/// The walk starts at `[2][0]`, circles the outer ring counter-clockwise,
/// steps into the inner ring at `[3][0]` and finishes on the centre tile.
pub fn spiral_order() -> Vec<TilePos> {
    let mut order = Vec::with_capacity(TILE_COUNT);
    let (mut row, mut col) = (2usize, 0isize);

    loop {
        order.push(resolve(row, col));
        if order.len() == TILE_COUNT {
            break;
        }
        (row, col) = next_in_spiral(row, col);
    }

    order
}

/// Columns in the walk are signed: `-1` names the last tile in a row.
fn resolve(row: usize, col: isize) -> TilePos {
    let width = ROW_WIDTHS[row] as isize;
    let col = if col < 0 { width + col } else { col };
    TilePos::new(row, col as usize)
}

/// Direction table for the token walk.
fn next_in_spiral(row: usize, col: isize) -> (usize, isize) {
    match (row, col) {
        // outer ring finished, enter the inner ring
        (4, 0) => return (3, 0),
        // inner ring finished, only the centre remains
        (5, 0) => return (4, 1),
        _ => {}
    }

    let on_outer_ring = !matches!(row, 3 | 5) && matches!(col, 0 | -1);
    if on_outer_ring {
        let col = match row {
            8 => 0,
            0 => -1,
            _ => col,
        };
        let down = !((col == 0 && row > 0) || row == 8);
        let mut next = if down { row + 1 } else { row - 1 };
        // rows 3 and 5 have no tile on the outer ring's edge
        if matches!(next, 3 | 5) {
            next = if down { next + 1 } else { next - 1 };
        }
        return (next, col);
    }

    match (row, col) {
        (2, _) => (3, -1),
        (3, 0) => (2, 1),
        (3, -1) => (5, -1),
        (5, -1) => (6, 1),
        (6, _) => (5, 0),
        // unreachable from the walk's start; restart on the centre
        _ => (4, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{HashMap, HashSet};

    fn all_corners() -> HashSet<Corner> {
        corner_lattice().into_iter().flatten().flatten().collect()
    }

    fn all_edges() -> HashSet<RoadEdge> {
        let mut edges = HashSet::new();
        for hex in corner_lattice().into_iter().flatten() {
            for i in 0..6 {
                edges.insert(RoadEdge::new(hex[i], hex[(i + 1) % 6]));
            }
        }
        edges
    }

    #[test]
    fn test_lattice_shape() {
        let lattice = corner_lattice();
        let widths: Vec<usize> = lattice.iter().map(|row| row.len()).collect();
        assert_eq!(widths, ROW_WIDTHS.to_vec());
    }

    #[test]
    fn test_standard_board_has_54_corners_and_72_edges() {
        assert_eq!(all_corners().len(), 54);
        assert_eq!(all_edges().len(), 72);
    }

    #[test]
    fn test_corner_sharing_counts() {
        // 24 interior corners touch three tiles, 12 touch two, 18 touch one
        let mut counts: HashMap<Corner, usize> = HashMap::new();
        for hex in corner_lattice().into_iter().flatten() {
            for corner in hex {
                *counts.entry(corner).or_insert(0) += 1;
            }
        }
        let mut histogram: HashMap<usize, usize> = HashMap::new();
        for n in counts.values() {
            *histogram.entry(*n).or_insert(0) += 1;
        }
        assert_eq!(histogram.get(&3), Some(&24));
        assert_eq!(histogram.get(&2), Some(&12));
        assert_eq!(histogram.get(&1), Some(&18));
    }

    #[test]
    fn test_stacked_rows_share_an_edge() {
        let lattice = corner_lattice();
        // [0][0] sits directly above [2][1]
        let top = lattice[0][0];
        let below = lattice[2][1];
        assert_eq!(top[1], below[5]);
        assert_eq!(top[2], below[4]);
    }

    #[test]
    fn test_road_edge_is_canonical() {
        let a = Corner::new(3, 2);
        let b = Corner::new(4, 3);
        assert_eq!(RoadEdge::new(a, b), RoadEdge::new(b, a));
        assert_eq!(RoadEdge::new(b, a).endpoints(), [a, b]);
        assert_eq!(RoadEdge::new(a, b).other(a), Some(b));
        assert_eq!(RoadEdge::new(a, b).other(Corner::new(0, 0)), None);
    }

    #[test]
    fn test_edges_never_share_an_x_coordinate() {
        for edge in all_edges() {
            let [a, b] = edge.endpoints();
            assert!(a.x < b.x, "edge {} is not ordered by x", edge);
        }
    }

    #[test]
    fn test_spiral_order() {
        let expected: Vec<TilePos> = [
            (2, 0),
            (1, 0),
            (0, 0),
            (1, 1),
            (2, 2),
            (4, 2),
            (6, 2),
            (7, 1),
            (8, 0),
            (7, 0),
            (6, 0),
            (4, 0),
            (3, 0),
            (2, 1),
            (3, 1),
            (5, 1),
            (6, 1),
            (5, 0),
            (4, 1),
        ]
        .into_iter()
        .map(|(r, c)| TilePos::new(r, c))
        .collect();
        assert_eq!(spiral_order(), expected);
    }

    #[test]
    fn test_spiral_visits_every_tile_once() {
        let order = spiral_order();
        let unique: HashSet<_> = order.iter().collect();
        assert_eq!(unique.len(), TILE_COUNT);
        assert!(order.iter().all(|p| p.is_on_board()));
    }

    #[test]
    fn test_token_distribution() {
        let mut counts: HashMap<u8, u32> = HashMap::new();
        for (_, n) in TOKEN_LETTERS {
            *counts.entry(n).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&12), Some(&1));
        assert_eq!(counts.get(&7), None);
        for n in [3, 4, 5, 6, 8, 9, 10, 11] {
            assert_eq!(counts.get(&n), Some(&2), "expected two {}s", n);
        }
    }

    #[test]
    fn test_tile_index_is_row_major() {
        let indices: Vec<usize> = TilePos::all().filter_map(|p| p.index()).collect();
        assert_eq!(indices, (0..TILE_COUNT).collect::<Vec<_>>());
        assert_eq!(TilePos::new(9, 0).index(), None);
        assert_eq!(TilePos::new(0, 1).index(), None);
    }
}
