use crate::error::{PathfindingError, Result};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// True when `other` is one of the eight cells surrounding `self`.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Parses `x,y`, the form used on the command line.
impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
        let x = x.trim().parse().map_err(|e| format!("bad x in `{}`: {}", s, e))?;
        let y = y.trim().parse().map_err(|e| format!("bad y in `{}`: {}", s, e))?;
        Ok(Position { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const fn new(width: usize, height: usize) -> Self {
        GridSize { width, height }
    }

    /// Number of cells, saturating at `usize::MAX` for sizes that cannot exist.
    pub fn cell_count(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Row-major index of `pos`. The caller checks bounds.
    pub fn index(&self, pos: Position) -> usize {
        pos.y * self.width + pos.x
    }

    pub fn position(&self, index: usize) -> Position {
        Position {
            x: index % self.width,
            y: index / self.width,
        }
    }

    pub fn is_corner(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.x == 0 || pos.x == self.width - 1)
            && (pos.y == 0 || pos.y == self.height - 1)
    }

    /// `(0,0)`, `(0,H-1)`, `(W-1,0)`, `(W-1,H-1)`; duplicates collapse on thin
    /// grids and an empty size has none.
    pub fn corners(&self) -> Vec<Position> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let mut corners = vec![
            Position::new(0, 0),
            Position::new(0, self.height - 1),
            Position::new(self.width - 1, 0),
            Position::new(self.width - 1, self.height - 1),
        ];
        corners.sort();
        corners.dedup();
        corners
    }

    /// Rejects empty sizes and sizes whose cell count overflows `usize`.
    pub(crate) fn ensure_valid(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PathfindingError::InvalidGrid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(PathfindingError::InvalidGrid(format!(
                "grid {}x{} has more cells than fit in memory",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Walkability mask handed to both grid forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    size: GridSize,
    walkable: Vec<bool>,
}

impl GridLayout {
    pub fn open(size: GridSize) -> Result<Self> {
        size.ensure_valid()?;
        Ok(GridLayout {
            size,
            walkable: vec![true; size.cell_count()],
        })
    }

    /// Blocks each cell with `obstacle_probability`, keeping the four corners open.
    pub fn random<R: Rng>(size: GridSize, obstacle_probability: f64, rng: &mut R) -> Result<Self> {
        size.ensure_valid()?;
        if !(0.0..=1.0).contains(&obstacle_probability) {
            return Err(PathfindingError::InvalidGrid(format!(
                "obstacle probability must be within [0, 1], got {}",
                obstacle_probability
            )));
        }

        let walkable = (0..size.cell_count())
            .map(|index| {
                rng.gen::<f64>() >= obstacle_probability || size.is_corner(size.position(index))
            })
            .collect();

        Ok(GridLayout { size, walkable })
    }

    /// Builds a layout from rows of `.` (open) and `#` (blocked).
    ///
    /// Blank lines and surrounding whitespace are ignored, which keeps
    /// indented string literals in tests readable.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let size = GridSize::new(width, height);
        size.ensure_valid()?;

        let mut walkable = Vec::with_capacity(size.cell_count());
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(PathfindingError::InvalidGrid(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '.' => walkable.push(true),
                    '#' => walkable.push(false),
                    other => {
                        return Err(PathfindingError::InvalidGrid(format!(
                            "unexpected `{}` at ({}, {})",
                            other, x, y
                        )))
                    }
                }
            }
        }

        Ok(GridLayout { size, walkable })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Out-of-bounds positions are never walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.size.contains(pos) && self.walkable[self.size.index(pos)]
    }

    pub fn set_walkable(&mut self, pos: Position, walkable: bool) {
        if self.size.contains(pos) {
            let index = self.size.index(pos);
            self.walkable[index] = walkable;
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.walkable.iter().filter(|open| !**open).count()
    }
}
