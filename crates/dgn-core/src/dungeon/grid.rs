//! The level grid

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellType};

/// `width x height` cells, stored column-major as `cells[x][y]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// All-stone grid
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Cell::stone(); height.max(0) as usize]; width.max(0) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[x as usize][y as usize])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            Some(&mut self.cells[x as usize][y as usize])
        } else {
            None
        }
    }

    /// Terrain at a position; out-of-bounds reads as stone
    pub fn typ(&self, x: i32, y: i32) -> CellType {
        self.get(x, y).map_or(CellType::Stone, |c| c.typ)
    }

    /// Set terrain; out-of-bounds writes are ignored
    pub fn set_typ(&mut self, x: i32, y: i32, typ: CellType) {
        if let Some(c) = self.get_mut(x, y) {
            c.typ = typ;
        }
    }

    /// Every position, column by column
    pub fn positions(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (w, h) = (self.width, self.height);
        (0..w).flat_map(move |x| (0..h).map(move |y| (x, y)))
    }

    /// Number of cells with the given terrain
    pub fn count_typ(&self, typ: CellType) -> usize {
        self.cells
            .iter()
            .flat_map(|col| col.iter())
            .filter(|c| c.typ == typ)
            .count()
    }

    /// One line per row
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.cells[x as usize][y as usize].symbol());
            }
            out.push('\n');
        }
        out
    }
}

impl core::ops::Index<(i32, i32)> for Grid {
    type Output = Cell;

    fn index(&self, (x, y): (i32, i32)) -> &Cell {
        &self.cells[x as usize][y as usize]
    }
}

impl core::ops::IndexMut<(i32, i32)> for Grid {
    fn index_mut(&mut self, (x, y): (i32, i32)) -> &mut Cell {
        &mut self.cells[x as usize][y as usize]
    }
}
