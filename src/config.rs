use crate::grid::{GridSize, Position};
use anyhow::bail;
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChoice {
    Synchronous,
    Offloaded,
    All,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub width: usize,

    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Chance that a non-corner cell is blocked when the grid is shuffled
    #[arg(long, default_value_t = 0.3)]
    pub obstacle_probability: f64,

    /// Seed for obstacle shuffling; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of shuffles to search
    #[arg(long, default_value_t = 1)]
    pub runs: usize,

    #[arg(long, value_enum, default_value_t = BackendChoice::All)]
    pub backend: BackendChoice,

    /// Dedicated worker threads for the offloaded backend; rayon's global pool when omitted
    #[arg(long)]
    pub workers: Option<usize>,

    /// Start as `x,y`; searches both corner diagonals when start and goal are omitted
    #[arg(long, requires = "goal")]
    pub start: Option<Position>,

    /// Goal as `x,y`
    #[arg(long, requires = "start")]
    pub goal: Option<Position>,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    pub fn size(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!(
                "grid must be at least 1x1, got {}x{}",
                self.width,
                self.height
            );
        }
        if !(0.0..=1.0).contains(&self.obstacle_probability) {
            bail!(
                "--obstacle-probability must be within [0, 1], got {}",
                self.obstacle_probability
            );
        }
        if self.runs == 0 {
            bail!("--runs must be at least 1");
        }
        if self.workers == Some(0) {
            bail!("--workers must be at least 1");
        }
        for pos in [self.start, self.goal].into_iter().flatten() {
            if !self.size().contains(pos) {
                bail!("{} is outside the {} grid", pos, self.size());
            }
        }
        Ok(())
    }

    pub fn runs_synchronous(&self) -> bool {
        matches!(self.backend, BackendChoice::Synchronous | BackendChoice::All)
    }

    pub fn runs_offloaded(&self) -> bool {
        matches!(self.backend, BackendChoice::Offloaded | BackendChoice::All)
    }
}
