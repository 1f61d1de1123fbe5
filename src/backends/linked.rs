use crate::algorithms::a_star::SearchEngine;
use crate::algorithms::common::{validate_endpoints, CellCosts, GridView, Path};
use crate::backends::flat::{FlatCell, FlatGrid};
use crate::error::Result;
use crate::grid::{GridLayout, GridSize, Position};

/// Arena index of a [`LinkedCell`].
pub type CellId = usize;

/// A cell wired to its four direct neighbors.
#[derive(Debug, Clone)]
pub struct LinkedCell {
    pub position: Position,
    pub walkable: bool,
    pub costs: CellCosts,
    pub left: Option<CellId>,
    pub right: Option<CellId>,
    pub up: Option<CellId>,
    pub down: Option<CellId>,
}

/// Grid of linked cells stored in one arena.
///
/// Diagonal neighbors are reached by composing two direct links, e.g. the
/// left-up neighbor is `cells[left].up`.
#[derive(Debug, Clone)]
pub struct LinkedGrid {
    size: GridSize,
    cells: Vec<LinkedCell>,
}

impl LinkedGrid {
    pub fn from_layout(layout: &GridLayout) -> Result<Self> {
        let size = layout.size();
        size.ensure_valid()?;

        let link = |pos: Option<Position>| pos.map(|pos| size.index(pos));
        let cells = (0..size.cell_count())
            .map(|index| {
                let position = size.position(index);
                let Position { x, y } = position;
                LinkedCell {
                    position,
                    walkable: layout.is_walkable(position),
                    costs: CellCosts::default(),
                    left: link(x.checked_sub(1).map(|x| Position { x, y })),
                    right: link(Some(Position { x: x + 1, y }).filter(|p| size.contains(*p))),
                    up: link(y.checked_sub(1).map(|y| Position { x, y })),
                    down: link(Some(Position { x, y: y + 1 }).filter(|p| size.contains(*p))),
                }
            })
            .collect();

        Ok(LinkedGrid { size, cells })
    }

    pub fn id_of(&self, pos: Position) -> Option<CellId> {
        self.size.contains(pos).then(|| self.size.index(pos))
    }

    pub fn cell(&self, pos: Position) -> Option<&LinkedCell> {
        self.id_of(pos).map(|id| &self.cells[id])
    }

    pub fn cells(&self) -> &[LinkedCell] {
        &self.cells
    }

    pub fn set_walkable(&mut self, pos: Position, walkable: bool) {
        if let Some(id) = self.id_of(pos) {
            self.cells[id].walkable = walkable;
        }
    }

    /// Value copy of positions and walkability in row-major order, costs neutral.
    pub fn snapshot(&self) -> FlatGrid {
        let cells = self
            .cells
            .iter()
            .map(|cell| FlatCell {
                position: cell.position,
                walkable: cell.walkable,
                costs: CellCosts::default(),
            })
            .collect();
        FlatGrid::from_cells(self.size, cells)
    }

    fn at(&self, pos: Position) -> &LinkedCell {
        &self.cells[self.size.index(pos)]
    }
}

impl GridView for LinkedGrid {
    fn size(&self) -> GridSize {
        self.size
    }

    fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| cell.walkable)
    }

    fn neighbors(&self, pos: Position, buf: &mut Vec<Position>) {
        let cell = self.at(pos);
        let mut push = |id: Option<CellId>| {
            if let Some(id) = id {
                buf.push(self.cells[id].position);
            }
        };

        if let Some(left) = cell.left {
            push(Some(left));
            push(self.cells[left].up);
            push(self.cells[left].down);
        }
        if let Some(right) = cell.right {
            push(Some(right));
            push(self.cells[right].up);
            push(self.cells[right].down);
        }
        push(cell.up);
        push(cell.down);
    }

    fn costs(&self, pos: Position) -> CellCosts {
        self.at(pos).costs
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

/// Runs A* on the caller's thread directly against a [`LinkedGrid`].
///
/// The search leaves its scratch costs in the grid's cells, so callers can
/// inspect what was explored after `search` returns.
pub struct SynchronousBackend<'g> {
    grid: &'g mut LinkedGrid,
    engine: SearchEngine,
}

impl<'g> SynchronousBackend<'g> {
    pub fn new(grid: &'g mut LinkedGrid) -> Self {
        let engine = SearchEngine::with_capacity(grid.size.cell_count());
        SynchronousBackend { grid, engine }
    }

    /// Blocks until the search finishes. `Ok(None)` means the target is unreachable.
    pub fn search(&mut self, start: Position, target: Position) -> Result<Option<Path>> {
        validate_endpoints(&*self.grid, start, target)?;
        Ok(self.engine.run(&mut *self.grid, start, target))
    }

    pub fn grid(&self) -> &LinkedGrid {
        &*self.grid
    }
}
