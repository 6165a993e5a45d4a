//! Solid geometry for the arcade bodies.
//!
//! Two kinds of solids share one contract: the dungeon's wall grid
//! (`CollisionGrid`, built from the parsed map) and the platformer's list of
//! static rectangles (`StaticBodies`). Both resolve motion with
//! axis-separable move-and-slide: X first, then Y from the corrected X, so
//! bodies slide along walls instead of sticking to them.
//!
//! World space is y-down. "Down" means increasing y.

use std::collections::HashSet;

use arcade_core::tilemap::ParsedMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_center(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            half_w: width * 0.5,
            half_h: height * 0.5,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub collided_x: bool,
    pub collided_y: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_up: bool,
    pub blocked_down: bool,
}

impl CollisionMoveResult {
    fn from_resolution(start: Aabb, dx: f32, dy: f32, resolved_x: f32, resolved_y: f32) -> Self {
        const EPS: f32 = 0.0001;
        let collided_x = (resolved_x - (start.center_x + dx)).abs() > EPS;
        let collided_y = (resolved_y - (start.center_y + dy)).abs() > EPS;

        let mut aabb = start;
        aabb.center_x = resolved_x;
        aabb.center_y = resolved_y;

        Self {
            aabb,
            collided_x,
            collided_y,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            blocked_up: collided_y && dy < 0.0,
            blocked_down: collided_y && dy > 0.0,
        }
    }
}

pub trait Solids {
    fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult;
}

/// Wall cells of a tile map. Cells outside the grid are open.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub cell_size: f32,
    pub width: i32,
    pub height: i32,
    solids: HashSet<(i32, i32)>,
}

impl CollisionGrid {
    pub fn from_map(map: &ParsedMap) -> Self {
        let solids = map
            .wall_cells
            .iter()
            .map(|&(col, row)| (col as i32, row as i32))
            .collect();
        Self {
            cell_size: map.tile_size,
            width: map.width as i32,
            height: map.height as i32,
            solids,
        }
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.solids.contains(&(x, y))
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        let y0 = self.world_to_cell(aabb.top() + EPS);
        let y1 = self.world_to_cell(aabb.bottom() - EPS);

        if dx > 0.0 {
            let x_cell = self.world_to_cell(candidate_x + aabb.half_w - EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.min(self.cell_start(x_cell) - aabb.half_w);
                }
            }
            // Never push against the direction of travel.
            candidate_x = candidate_x.max(aabb.center_x);
        } else {
            let x_cell = self.world_to_cell(candidate_x - aabb.half_w + EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.max(self.cell_end(x_cell) + aabb.half_w);
                }
            }
            candidate_x = candidate_x.min(aabb.center_x);
        }

        candidate_x
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        let x0 = self.world_to_cell(aabb.left() + EPS);
        let x1 = self.world_to_cell(aabb.right() - EPS);

        if dy > 0.0 {
            let y_cell = self.world_to_cell(candidate_y + aabb.half_h - EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.min(self.cell_start(y_cell) - aabb.half_h);
                }
            }
            candidate_y = candidate_y.max(aabb.center_y);
        } else {
            let y_cell = self.world_to_cell(candidate_y - aabb.half_h + EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.max(self.cell_end(y_cell) + aabb.half_h);
                }
            }
            candidate_y = candidate_y.min(aabb.center_y);
        }

        candidate_y
    }

    fn world_to_cell(&self, world: f32) -> i32 {
        (world / self.cell_size).floor() as i32
    }

    /// Left (or top) edge of a cell in world units.
    fn cell_start(&self, cell: i32) -> f32 {
        cell as f32 * self.cell_size
    }

    fn cell_end(&self, cell: i32) -> f32 {
        (cell + 1) as f32 * self.cell_size
    }
}

impl Solids for CollisionGrid {
    fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult {
        let resolved_x = self.resolve_axis_x(aabb, dx);
        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        CollisionMoveResult::from_resolution(aabb, dx, dy, resolved_x, resolved_y)
    }
}

/// Immovable rectangles such as platforms.
#[derive(Debug, Clone, Default)]
pub struct StaticBodies {
    bodies: Vec<Aabb>,
}

impl StaticBodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, aabb: Aabb) {
        self.bodies.push(aabb);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        for solid in &self.bodies {
            let shares_rows =
                aabb.top() < solid.bottom() - EPS && aabb.bottom() > solid.top() + EPS;
            if !shares_rows {
                continue;
            }
            if dx > 0.0 {
                // Only solids ahead of the leading edge can stop us.
                if solid.left() >= aabb.right() - EPS && candidate_x + aabb.half_w > solid.left()
                {
                    candidate_x = candidate_x.min(solid.left() - aabb.half_w);
                }
            } else if solid.right() <= aabb.left() + EPS
                && candidate_x - aabb.half_w < solid.right()
            {
                candidate_x = candidate_x.max(solid.right() + aabb.half_w);
            }
        }

        if dx > 0.0 {
            candidate_x.max(aabb.center_x)
        } else {
            candidate_x.min(aabb.center_x)
        }
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        for solid in &self.bodies {
            let shares_columns =
                aabb.left() < solid.right() - EPS && aabb.right() > solid.left() + EPS;
            if !shares_columns {
                continue;
            }
            if dy > 0.0 {
                if solid.top() >= aabb.bottom() - EPS && candidate_y + aabb.half_h > solid.top() {
                    candidate_y = candidate_y.min(solid.top() - aabb.half_h);
                }
            } else if solid.bottom() <= aabb.top() + EPS
                && candidate_y - aabb.half_h < solid.bottom()
            {
                candidate_y = candidate_y.max(solid.bottom() + aabb.half_h);
            }
        }

        if dy > 0.0 {
            candidate_y.max(aabb.center_y)
        } else {
            candidate_y.min(aabb.center_y)
        }
    }
}

impl Solids for StaticBodies {
    fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult {
        let resolved_x = self.resolve_axis_x(aabb, dx);
        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        CollisionMoveResult::from_resolution(aabb, dx, dy, resolved_x, resolved_y)
    }
}

pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(b)
}
