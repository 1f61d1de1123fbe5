use crate::algorithms::common::{CellCosts, GridView, Path, PathStep};
use crate::algorithms::cost::distance;
use crate::algorithms::frontier::{Frontier, Visited};
use crate::grid::Position;
use log::{debug, trace};
use rustc_hash::FxHashSet;

/// A* over any [`GridView`].
///
/// The engine owns its open set, closed set and neighbor buffer. They are
/// cleared at the start of every run, so one engine can serve many searches.
#[derive(Debug, Default)]
pub struct SearchEngine {
    frontier: Frontier,
    visited: Visited,
    neighbors: Vec<Position>,
}

impl SearchEngine {
    /// Creates an engine whose scratch buffers are sized for `cells` grid cells.
    pub fn with_capacity(cells: usize) -> Self {
        SearchEngine {
            frontier: Frontier::with_capacity(cells),
            visited: Visited::with_capacity(cells),
            neighbors: Vec::with_capacity(8),
        }
    }

    /// Finds a path from start to target.
    ///
    /// # Arguments
    ///
    /// * `view` - The grid to search. Its scratch costs are reset first and
    ///   hold the search state afterwards.
    /// * `start` - The starting position.
    /// * `target` - The goal position.
    ///
    /// Endpoints are expected to be in bounds and walkable; backends check
    /// that with [`validate_endpoints`](crate::algorithms::common::validate_endpoints)
    /// before calling in.
    ///
    /// # Returns
    ///
    /// The path from start to target inclusive, or `None` once the open set
    /// runs dry.
    pub fn run<V: GridView + ?Sized>(
        &mut self,
        view: &mut V,
        start: Position,
        target: Position,
    ) -> Option<Path> {
        self.frontier.clear();
        self.visited.clear();
        view.reset_costs();

        let h = distance(start, target);
        *view.costs_mut(start) = CellCosts {
            g: 0,
            h,
            f: h,
            parent: None,
        };
        self.frontier.push(start);

        let mut expanded = 0usize;
        while let Some(current) = self.frontier.pop_best(&*view) {
            self.visited.mark(current);

            if current == target {
                let path = reconstruct_path(&*view, start, target);
                debug!(
                    "path {} -> {} found: {} steps, cost {}, {} cells expanded",
                    start,
                    target,
                    path.len(),
                    path.total_cost(),
                    expanded
                );
                return Some(path);
            }

            self.expand(view, current, target);
            expanded += 1;
        }

        debug!(
            "no path {} -> {} after expanding {} cells",
            start, target, expanded
        );
        None
    }

    fn expand<V: GridView + ?Sized>(&mut self, view: &mut V, current: Position, target: Position) {
        let current_g = view.costs(current).g;
        self.neighbors.clear();
        view.neighbors(current, &mut self.neighbors);
        trace!("expanding {} (g = {})", current, current_g);

        for &neighbor in &self.neighbors {
            if !view.is_walkable(neighbor) || self.visited.contains(neighbor) {
                continue;
            }

            let tentative_g = current_g + distance(current, neighbor);
            let in_frontier = self.frontier.contains(neighbor);
            if tentative_g < view.costs(neighbor).g || !in_frontier {
                let h = distance(neighbor, target);
                *view.costs_mut(neighbor) = CellCosts {
                    g: tentative_g,
                    h,
                    f: tentative_g + h,
                    parent: Some(current),
                };
                self.frontier.push(neighbor);
            }
        }
    }
}

/// Walks parent links back from `target`, stopping at `start`, at a cell with no
/// parent, or at a position already in the buffer.
pub(crate) fn reconstruct_path<V: GridView + ?Sized>(
    view: &V,
    start: Position,
    target: Position,
) -> Path {
    let mut steps = Vec::new();
    let mut seen = FxHashSet::default();
    let mut current = target;

    while seen.insert(current) {
        let costs = view.costs(current);
        steps.push(PathStep {
            position: current,
            g: costs.g,
            h: costs.h,
            f: costs.f,
        });
        if current == start {
            break;
        }
        match costs.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }

    steps.reverse();
    Path::new(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::flat::FlatGrid;
    use crate::backends::linked::LinkedGrid;
    use crate::grid::{GridLayout, GridSize};

    fn flat(rows: &str) -> FlatGrid {
        FlatGrid::from_layout(&GridLayout::parse(rows).unwrap()).unwrap()
    }

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn open_three_by_three_goes_diagonal() {
        let mut grid = flat("...\n...\n...");
        let path = SearchEngine::default().run(&mut grid, p(0, 0), p(2, 2)).unwrap();
        assert_eq!(path.positions(), vec![p(0, 0), p(1, 1), p(2, 2)]);
        assert_eq!(path.total_cost(), 28);
    }

    #[test]
    fn start_equal_to_target_is_single_step() {
        let mut grid = flat("...\n...");
        let path = SearchEngine::default().run(&mut grid, p(1, 1), p(1, 1)).unwrap();
        assert_eq!(path.positions(), vec![p(1, 1)]);
        assert_eq!(path.total_cost(), 0);
    }

    #[test]
    fn enclosed_target_has_no_path() {
        let mut grid = flat(
            "
            .....
            .###.
            .#.#.
            .###.
            .....
            ",
        );
        assert!(SearchEngine::default().run(&mut grid, p(0, 0), p(2, 2)).is_none());
    }

    #[test]
    fn walls_force_a_detour() {
        let mut grid = flat(
            "
            .#...
            .#.#.
            ...#.
            ",
        );
        let path = SearchEngine::default().run(&mut grid, p(0, 0), p(4, 0)).unwrap();
        assert_eq!(path.start(), Some(p(0, 0)));
        assert_eq!(path.goal(), Some(p(4, 0)));
        for pair in path.steps().windows(2) {
            assert!(pair[0].position.is_adjacent(&pair[1].position));
            assert!(grid.is_walkable(pair[1].position));
        }
        assert_eq!(path.total_cost(), path.movement_cost());
        // through the gap at (1,2), then up through (2,1) to the gap at (3,0)
        assert_eq!(path.total_cost(), 10 + 14 + 14 + 14 + 10);
    }

    #[test]
    fn single_column_walks_every_cell() {
        let mut grid = flat(".\n.\n.\n.\n.");
        let path = SearchEngine::default().run(&mut grid, p(0, 0), p(0, 4)).unwrap();
        assert_eq!(
            path.positions(),
            (0..5).map(|y| p(0, y)).collect::<Vec<_>>()
        );
        assert_eq!(path.total_cost(), 40);
    }

    #[test]
    fn costs_are_reset_between_runs() {
        let mut grid = flat("....\n....\n....");
        let mut engine = SearchEngine::default();
        let first = engine.run(&mut grid, p(0, 0), p(3, 2)).unwrap();
        let second = engine.run(&mut grid, p(0, 0), p(3, 2)).unwrap();
        assert_eq!(first, second);

        let reverse = engine.run(&mut grid, p(3, 2), p(0, 0)).unwrap();
        assert_eq!(reverse.total_cost(), first.total_cost());
    }

    #[test]
    fn steps_carry_final_costs() {
        let mut grid = flat("...\n...\n...");
        let path = SearchEngine::default().run(&mut grid, p(0, 0), p(2, 0)).unwrap();
        let first = path.steps()[0];
        assert_eq!((first.g, first.h, first.f), (0, 20, 20));
        let last = path.steps()[path.len() - 1];
        assert_eq!((last.g, last.h, last.f), (20, 0, 20));
    }

    #[test]
    fn linked_and_flat_agree() {
        let rows = "
            ..#....
            .##.##.
            ....#..
            ##.##..
            .......
        ";
        let layout = GridLayout::parse(rows).unwrap();
        let mut linked = LinkedGrid::from_layout(&layout).unwrap();
        let mut flat = FlatGrid::from_layout(&layout).unwrap();
        let mut engine = SearchEngine::default();

        let a = engine.run(&mut linked, p(0, 0), p(6, 0)).unwrap();
        let b = engine.run(&mut flat, p(0, 0), p(6, 0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn reconstruction_stops_on_parent_cycle() {
        let mut grid = FlatGrid::from_layout(&GridLayout::open(GridSize::new(3, 1)).unwrap()).unwrap();
        grid.costs_mut(p(2, 0)).parent = Some(p(1, 0));
        grid.costs_mut(p(1, 0)).parent = Some(p(2, 0));

        let path = reconstruct_path(&grid, p(0, 0), p(2, 0));
        assert_eq!(path.positions(), vec![p(1, 0), p(2, 0)]);
    }

    #[test]
    fn reconstruction_stops_at_missing_parent() {
        let grid = FlatGrid::from_layout(&GridLayout::open(GridSize::new(3, 1)).unwrap()).unwrap();
        let path = reconstruct_path(&grid, p(0, 0), p(2, 0));
        assert_eq!(path.positions(), vec![p(2, 0)]);
    }
}
