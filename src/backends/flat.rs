use crate::algorithms::common::{CellCosts, GridView};
use crate::error::{PathfindingError, Result};
use crate::grid::{GridLayout, GridSize, Position};

/// Plain-data cell record of the flat form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatCell {
    pub position: Position,
    pub walkable: bool,
    pub costs: CellCosts,
}

/// Row-major grid of [`FlatCell`]s, indexed `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatGrid {
    size: GridSize,
    cells: Vec<FlatCell>,
}

impl FlatGrid {
    pub fn from_layout(layout: &GridLayout) -> Result<Self> {
        let size = layout.size();
        size.ensure_valid()?;
        let cells = (0..size.cell_count())
            .map(|index| {
                let position = size.position(index);
                FlatCell {
                    position,
                    walkable: layout.is_walkable(position),
                    costs: CellCosts::default(),
                }
            })
            .collect();
        Ok(FlatGrid { size, cells })
    }

    /// Wraps `cells` as a grid of `size`, checking the cell count.
    pub fn try_from_cells(size: GridSize, cells: Vec<FlatCell>) -> Result<Self> {
        size.ensure_valid()?;
        if cells.len() != size.cell_count() {
            return Err(PathfindingError::SnapshotSize {
                expected: size.cell_count(),
                got: cells.len(),
            });
        }
        Ok(FlatGrid { size, cells })
    }

    pub(crate) fn from_cells(size: GridSize, cells: Vec<FlatCell>) -> Self {
        debug_assert_eq!(cells.len(), size.cell_count());
        FlatGrid { size, cells }
    }

    pub fn cells(&self) -> &[FlatCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl GridView for FlatGrid {
    fn size(&self) -> GridSize {
        self.size
    }

    fn is_walkable(&self, pos: Position) -> bool {
        self.size.contains(pos) && self.cells[self.size.index(pos)].walkable
    }

    fn neighbors(&self, pos: Position, buf: &mut Vec<Position>) {
        let Position { x, y } = pos;
        let has_up = y > 0;
        let has_down = y + 1 < self.size.height;

        let mut column = |x: usize| {
            buf.push(Position { x, y });
            if has_up {
                buf.push(Position { x, y: y - 1 });
            }
            if has_down {
                buf.push(Position { x, y: y + 1 });
            }
        };
        if x > 0 {
            column(x - 1);
        }
        if x + 1 < self.size.width {
            column(x + 1);
        }

        if has_up {
            buf.push(Position { x, y: y - 1 });
        }
        if has_down {
            buf.push(Position { x, y: y + 1 });
        }
    }

    fn costs(&self, pos: Position) -> CellCosts {
        self.cells[self.size.index(pos)].costs
    }

    fn costs_mut(&mut self, pos: Position) -> &mut CellCosts {
        let index = self.size.index(pos);
        &mut self.cells[index].costs
    }

    fn reset_costs(&mut self) {
        for cell in &mut self.cells {
            cell.costs = CellCosts::default();
        }
    }
}
