use crate::algorithms::common::GridView;
use crate::grid::Position;
use rustc_hash::FxHashSet;

/// Open set. Entries are positions; their costs are read from the grid view at
/// pop time, so an entry updated in place is always ranked by its current costs.
#[derive(Debug, Default)]
pub struct Frontier {
    order: Vec<Position>,
    members: FxHashSet<Position>,
}

impl Frontier {
    pub fn with_capacity(capacity: usize) -> Self {
        Frontier {
            order: Vec::with_capacity(capacity),
            members: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts `pos` at the back. A position already present keeps its slot.
    pub fn push(&mut self, pos: Position) {
        if self.members.insert(pos) {
            self.order.push(pos);
        }
    }

    /// Removes the entry with the lowest `f`, then lowest `h`, then earliest insertion.
    pub fn pop_best<V: GridView + ?Sized>(&mut self, view: &V) -> Option<Position> {
        let first = *self.order.first()?;
        let mut best_index = 0;
        let mut best = view.costs(first);

        for (index, &pos) in self.order.iter().enumerate().skip(1) {
            let costs = view.costs(pos);
            if costs.f < best.f || (costs.f == best.f && costs.h < best.h) {
                best_index = index;
                best = costs;
            }
        }

        // `remove` keeps the relative order of the survivors, which the tie-break relies on
        let pos = self.order.remove(best_index);
        self.members.remove(&pos);
        Some(pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.members.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Closed set, keyed by position only.
#[derive(Debug, Default)]
pub struct Visited {
    cells: FxHashSet<Position>,
}

impl Visited {
    pub fn with_capacity(capacity: usize) -> Self {
        Visited {
            cells: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    pub fn mark(&mut self, pos: Position) {
        self.cells.insert(pos);
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}
