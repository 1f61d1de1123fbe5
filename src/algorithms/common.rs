use crate::algorithms::cost::distance;
use crate::error::{Endpoint, EndpointFault, PathfindingError, Result};
use crate::grid::{GridSize, Position};

/// Per-cell search scratch state. Reset to the default before every search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCosts {
    pub g: u32,
    pub h: u32,
    pub f: u32,
    pub parent: Option<Position>,
}

/// What the search engine needs from a grid representation.
pub trait GridView {
    fn size(&self) -> GridSize;

    /// Out-of-bounds positions must report `false`.
    fn is_walkable(&self, pos: Position) -> bool;

    /// Append the in-bounds 8-connected neighbors of `pos` to `buf`, in the order
    /// left, left-up, left-down, right, right-up, right-down, up, down.
    /// Walkability is not filtered here. The caller clears `buf`.
    fn neighbors(&self, pos: Position, buf: &mut Vec<Position>);

    fn costs(&self, pos: Position) -> CellCosts;

    fn costs_mut(&mut self, pos: Position) -> &mut CellCosts;

    /// Put every cell's scratch state back to `CellCosts::default()`.
    fn reset_costs(&mut self);
}

/// Rejects endpoints that are out of bounds or blocked before any search work starts.
pub fn validate_endpoints<V: GridView + ?Sized>(
    view: &V,
    start: Position,
    target: Position,
) -> Result<()> {
    for (endpoint, position) in [(Endpoint::Start, start), (Endpoint::Target, target)] {
        let fault = if !view.size().contains(position) {
            EndpointFault::OutOfBounds(view.size())
        } else if !view.is_walkable(position) {
            EndpointFault::NotWalkable
        } else {
            continue;
        };
        return Err(PathfindingError::InvalidEndpoint {
            endpoint,
            position,
            fault,
        });
    }
    Ok(())
}

/// One cell of a reconstructed path with the costs it had when the search finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub position: Position,
    pub g: u32,
    pub h: u32,
    pub f: u32,
}

/// A start-to-target path, start first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub(crate) fn new(steps: Vec<PathStep>) -> Self {
        Path { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn positions(&self) -> Vec<Position> {
        self.steps.iter().map(|step| step.position).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> Option<Position> {
        self.steps.first().map(|step| step.position)
    }

    pub fn goal(&self) -> Option<Position> {
        self.steps.last().map(|step| step.position)
    }

    /// Final `g` of the target cell.
    pub fn total_cost(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.g)
    }

    /// Sum of the octile distances between consecutive steps.
    pub fn movement_cost(&self) -> u32 {
        self.steps
            .windows(2)
            .map(|pair| distance(pair[0].position, pair[1].position))
            .sum()
    }
}

impl IntoIterator for Path {
    type Item = PathStep;
    type IntoIter = std::vec::IntoIter<PathStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
