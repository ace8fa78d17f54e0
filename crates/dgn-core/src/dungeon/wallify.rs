//! Wall junction solver
//!
//! Rooms are stamped with plain horizontal and vertical walls. This pass
//! turns every wall cell into the corner, T-junction or cross piece its
//! neighbourhood calls for, repeating until a pass changes nothing.

use super::cell::CellType;
use super::grid::Grid;
use super::rect::Rect;

const NORTH: usize = 8;
const SOUTH: usize = 4;
const EAST: usize = 2;
const WEST: usize = 1;

/// Wall piece per `N|S|E|W` neighbour mask; `None` keeps the current piece.
const JUNCTIONS: [Option<CellType>; 16] = [
    None,
    Some(CellType::HWall),
    Some(CellType::HWall),
    Some(CellType::HWall),
    Some(CellType::VWall),
    Some(CellType::TRCorner),
    Some(CellType::TLCorner),
    Some(CellType::TDWall),
    Some(CellType::VWall),
    Some(CellType::BRCorner),
    Some(CellType::BLCorner),
    Some(CellType::TUWall),
    Some(CellType::VWall),
    Some(CellType::TLWall),
    Some(CellType::TRWall),
    Some(CellType::CrossWall),
];

/// Terrain a wall joins up with
fn joins_wall(typ: CellType) -> bool {
    typ.is_wall() || matches!(typ, CellType::Door | CellType::SecretDoor | CellType::IronBars)
}

fn neighbour_mask(grid: &Grid, x: i32, y: i32) -> usize {
    let mut mask = 0;
    if joins_wall(grid.typ(x, y - 1)) {
        mask |= NORTH;
    }
    if joins_wall(grid.typ(x, y + 1)) {
        mask |= SOUTH;
    }
    if joins_wall(grid.typ(x + 1, y)) {
        mask |= EAST;
    }
    if joins_wall(grid.typ(x - 1, y)) {
        mask |= WEST;
    }
    mask
}

/// One pass over `region`; returns how many cells changed.
fn wallify_pass(grid: &mut Grid, region: Rect) -> usize {
    let mut changed = 0;
    for x in region.lx..=region.hx {
        for y in region.ly..=region.hy {
            if !grid.typ(x, y).is_wall() {
                continue;
            }
            if let Some(piece) = JUNCTIONS[neighbour_mask(grid, x, y)]
                && grid.typ(x, y) != piece
            {
                grid.set_typ(x, y, piece);
                changed += 1;
            }
        }
    }
    changed
}

/// Fix wall junctions inside `region` (clipped to the grid). Returns the
/// number of passes run.
pub fn wallify_region(grid: &mut Grid, region: Rect) -> usize {
    let Some(region) = region.intersection(&Rect::new(0, 0, grid.width() - 1, grid.height() - 1)) else {
        return 0;
    };
    let cap = 2 * grid.width().max(grid.height()) as usize;
    for pass in 1..=cap {
        if wallify_pass(grid, region) == 0 {
            return pass;
        }
    }
    tracing::debug!(?region, cap, "wallification hit its pass limit");
    cap
}

/// Fix wall junctions across the whole grid.
pub fn wallify(grid: &mut Grid) -> usize {
    let all = Rect::new(0, 0, grid.width() - 1, grid.height() - 1);
    wallify_region(grid, all)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Walled box with plain walls only, floor inside
    fn boxed(grid: &mut Grid, lx: i32, ly: i32, hx: i32, hy: i32) {
        for x in lx..=hx {
            for y in ly..=hy {
                let typ = if y == ly || y == hy {
                    CellType::HWall
                } else if x == lx || x == hx {
                    CellType::VWall
                } else {
                    CellType::Room
                };
                grid.set_typ(x, y, typ);
            }
        }
    }

    #[test]
    fn test_box_gets_corners() {
        let mut grid = Grid::new(20, 10);
        boxed(&mut grid, 2, 2, 8, 6);
        wallify(&mut grid);
        assert_eq!(grid.typ(2, 2), CellType::TLCorner);
        assert_eq!(grid.typ(8, 2), CellType::TRCorner);
        assert_eq!(grid.typ(2, 6), CellType::BLCorner);
        assert_eq!(grid.typ(8, 6), CellType::BRCorner);
        assert_eq!(grid.typ(5, 2), CellType::HWall);
        assert_eq!(grid.typ(2, 4), CellType::VWall);
    }

    #[test]
    fn test_shared_wall_makes_t_junctions() {
        let mut grid = Grid::new(20, 10);
        boxed(&mut grid, 2, 2, 8, 6);
        boxed(&mut grid, 8, 2, 14, 6);
        wallify(&mut grid);
        assert_eq!(grid.typ(8, 2), CellType::TDWall);
        assert_eq!(grid.typ(8, 6), CellType::TUWall);
        assert_eq!(grid.typ(8, 4), CellType::VWall);
    }

    #[test]
    fn test_cross_and_side_tees() {
        let mut grid = Grid::new(20, 12);
        boxed(&mut grid, 2, 2, 8, 6);
        boxed(&mut grid, 8, 2, 14, 6);
        boxed(&mut grid, 2, 6, 8, 10);
        boxed(&mut grid, 8, 6, 14, 10);
        wallify(&mut grid);
        assert_eq!(grid.typ(8, 6), CellType::CrossWall);
        assert_eq!(grid.typ(2, 6), CellType::TRWall);
        assert_eq!(grid.typ(14, 6), CellType::TLWall);
    }

    #[test]
    fn test_doors_count_as_wall_neighbours() {
        let mut grid = Grid::new(20, 10);
        boxed(&mut grid, 2, 2, 8, 6);
        grid.set_typ(3, 2, CellType::Door);
        wallify(&mut grid);
        assert_eq!(grid.typ(2, 2), CellType::TLCorner);
        assert_eq!(grid.typ(4, 2), CellType::HWall);
    }

    #[test]
    fn test_idempotent() {
        let mut grid = Grid::new(30, 12);
        boxed(&mut grid, 1, 1, 9, 7);
        boxed(&mut grid, 9, 3, 20, 10);
        grid.set_typ(5, 7, CellType::SecretDoor);
        wallify(&mut grid);
        let once = grid.clone();
        assert_eq!(wallify(&mut grid), 1, "second run changes nothing");
        assert_eq!(grid, once);
    }

    #[test]
    fn test_region_is_clipped() {
        let mut grid = Grid::new(10, 10);
        boxed(&mut grid, 0, 0, 4, 4);
        wallify_region(&mut grid, Rect::new(-3, -3, 20, 20));
        assert_eq!(grid.typ(0, 0), CellType::TLCorner);
    }
}
