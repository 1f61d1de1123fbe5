use crate::algorithms::cost::distance;
use crate::grid::{GridLayout, Position};
use pathfinding::prelude::astar;

/// Independent A* from the `pathfinding` crate with the same octile costs.
///
/// Used to check that both backends return optimal paths. Returns the path and
/// its cost, or `None` if the goal is unreachable or either endpoint is blocked.
pub fn reference_path(
    layout: &GridLayout,
    start: Position,
    goal: Position,
) -> Option<(Vec<Position>, u32)> {
    if !layout.is_walkable(start) || !layout.is_walkable(goal) {
        return None;
    }

    let size = layout.size();
    astar(
        &start,
        |p| {
            let p = *p;
            let mut successors = Vec::with_capacity(8);
            for dx in -1isize..=1 {
                for dy in -1isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (Some(x), Some(y)) = (p.x.checked_add_signed(dx), p.y.checked_add_signed(dy))
                    else {
                        continue;
                    };
                    let next = Position { x, y };
                    if size.contains(next) && layout.is_walkable(next) {
                        successors.push((next, distance(p, next)));
                    }
                }
            }
            successors
        },
        |p| distance(*p, goal),
        |p| *p == goal,
    )
}
