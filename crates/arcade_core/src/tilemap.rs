//! Text tile maps.
//!
//! A map is a block of text, one line per row. Each character classifies a
//! cell: wall, floor, or the floor cell the player spawns on. Anything else
//! is left unclassified. Blank lines are dropped before the grid size is
//! measured, so maps may carry leading or trailing empty lines.
//!
//! Parsing is pure. Turning cells into sprites and bodies is the scene's job.

use std::collections::BTreeSet;

use thiserror::Error;

/// Grid coordinate as `(col, row)`, row 0 at the top.
pub type Cell = (u32, u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSymbols {
    pub wall: char,
    pub floor: char,
    pub spawn: char,
}

impl Default for MapSymbols {
    fn default() -> Self {
        Self {
            wall: '□',
            floor: ' ',
            spawn: 'S',
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MapError {
    #[error("map text has no non-blank lines")]
    Empty,
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("map has no spawn marker '{0}'")]
    MissingSpawn(char),
    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMap {
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,
    pub wall_cells: BTreeSet<Cell>,
    pub floor_cells: BTreeSet<Cell>,
    pub spawn: Cell,
}

impl ParsedMap {
    pub fn spawn_world(&self) -> (f32, f32) {
        cell_center(self.spawn.0, self.spawn.1, self.tile_size)
    }

    /// Pixel extent of the whole grid.
    pub fn world_size(&self) -> (f32, f32) {
        (
            self.width as f32 * self.tile_size,
            self.height as f32 * self.tile_size,
        )
    }
}

/// Center of the square covered by `(col, row)`.
pub fn cell_center(col: u32, row: u32, tile_size: f32) -> (f32, f32) {
    (
        (col as f32 + 0.5) * tile_size,
        (row as f32 + 0.5) * tile_size,
    )
}

pub fn parse(text: &str, tile_size: f32) -> Result<ParsedMap, MapError> {
    parse_with_symbols(text, tile_size, MapSymbols::default())
}

pub fn parse_with_symbols(
    text: &str,
    tile_size: f32,
    symbols: MapSymbols,
) -> Result<ParsedMap, MapError> {
    if !(tile_size.is_finite() && tile_size > 0.0) {
        return Err(MapError::InvalidTileSize(tile_size));
    }

    let rows: Vec<Vec<char>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end_matches('\r').chars().collect())
        .collect();

    let Some(first) = rows.first() else {
        return Err(MapError::Empty);
    };
    let width = first.len();

    let mut wall_cells = BTreeSet::new();
    let mut floor_cells = BTreeSet::new();
    let mut spawn = None;

    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(MapError::RaggedRow {
                row: row_index,
                expected: width,
                found: row.len(),
            });
        }
        let row_u = row_index as u32;
        for (col_index, &symbol) in row.iter().enumerate() {
            let cell = (col_index as u32, row_u);
            if symbol == symbols.wall {
                wall_cells.insert(cell);
            } else if symbol == symbols.floor || symbol == symbols.spawn {
                floor_cells.insert(cell);
                if symbol == symbols.spawn && spawn.is_none() {
                    spawn = Some(cell);
                }
            }
        }
    }

    let spawn = spawn.ok_or(MapError::MissingSpawn(symbols.spawn))?;
    Ok(ParsedMap {
        width: width as u32,
        height: rows.len() as u32,
        tile_size,
        wall_cells,
        floor_cells,
        spawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOXED: &str = "□□□\n□S□\n□□□";

    #[test]
    fn boxed_spawn_example() {
        let map = parse(BOXED, 64.0).expect("boxed map should parse");
        assert_eq!((map.width, map.height), (3, 3));
        assert_eq!(map.wall_cells.len(), 8);
        assert!(!map.wall_cells.contains(&(1, 1)));
        assert_eq!(map.floor_cells, BTreeSet::from([(1, 1)]));
        assert_eq!(map.spawn, (1, 1));
        assert_eq!(cell_center(1, 1, 64.0), (96.0, 96.0));
        assert_eq!(map.spawn_world(), (96.0, 96.0));
        assert_eq!(map.world_size(), (192.0, 192.0));
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "□□□□□\n□ S □\n□  S□\n□□□□□\n";
        assert_eq!(parse(text, 32.0), parse(text, 32.0));
    }

    #[test]
    fn walls_and_floors_are_disjoint() {
        let text = "□□□□□□\n□  □ □\n□ S  □\n□□  x□\n□□□□□□";
        let map = parse(text, 16.0).expect("map should parse");
        assert!(map.wall_cells.is_disjoint(&map.floor_cells));
        // 'x' is neither.
        assert!(!map.wall_cells.contains(&(4, 3)));
        assert!(!map.floor_cells.contains(&(4, 3)));
    }

    #[test]
    fn blank_lines_are_dropped_before_measuring() {
        let text = "\n\n□□□\n   \n□S□\r\n□□□\n\n";
        let map = parse(text, 10.0).expect("map should parse");
        assert_eq!((map.width, map.height), (3, 3));
        assert_eq!(map.spawn, (1, 1));
    }

    #[test]
    fn first_spawn_in_row_major_order_wins() {
        let text = "□□□□\n□ S□\n□S □\n□□□□";
        let map = parse(text, 8.0).expect("map should parse");
        assert_eq!(map.spawn, (2, 1));
        // Both markers are still floor.
        assert!(map.floor_cells.contains(&(1, 2)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse("□□□\n□S\n□□□", 64.0).expect_err("ragged map must fail");
        assert_eq!(
            err,
            MapError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn missing_spawn_is_rejected() {
        let err = parse("□□□\n□ □\n□□□", 64.0).expect_err("map without spawn must fail");
        assert_eq!(err, MapError::MissingSpawn('S'));
        assert!(err.to_string().contains("spawn"));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(parse(" \n\n", 64.0), Err(MapError::Empty));
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        assert_eq!(parse(BOXED, 0.0), Err(MapError::InvalidTileSize(0.0)));
        assert!(parse(BOXED, f32::NAN).is_err());
    }

    #[test]
    fn custom_symbols() {
        let symbols = MapSymbols {
            wall: '#',
            floor: '.',
            spawn: '@',
        };
        let map = parse_with_symbols("###\n#@.\n###", 1.0, symbols).expect("map should parse");
        assert_eq!(map.spawn, (1, 1));
        assert_eq!(map.floor_cells.len(), 2);
        assert_eq!(map.wall_cells.len(), 7);
    }

    #[test]
    fn cell_center_lies_inside_its_square() {
        for &tile in &[1.0f32, 16.0, 33.0, 64.0] {
            for col in 0..20u32 {
                for row in 0..20u32 {
                    let (x, y) = cell_center(col, row, tile);
                    let (left, top) = (col as f32 * tile, row as f32 * tile);
                    assert!(x >= left && x < left + tile, "x {x} outside col {col}");
                    assert!(y >= top && y < top + tile, "y {y} outside row {row}");
                }
            }
        }
    }
}
