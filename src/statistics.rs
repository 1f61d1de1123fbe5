use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Synchronous,
    Offloaded,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Synchronous => write!(f, "synchronous"),
            BackendKind::Offloaded => write!(f, "offloaded"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimingData {
    pub find_path_times: Vec<Duration>,
}

impl TimingData {
    pub fn new() -> Self {
        TimingData {
            find_path_times: Vec::new(),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.find_path_times.push(elapsed);
    }

    pub fn average_find_path_time(&self) -> Duration {
        if self.find_path_times.is_empty() {
            Duration::from_nanos(0)
        } else {
            let total: Duration = self.find_path_times.iter().sum();
            total / self.find_path_times.len() as u32
        }
    }

    pub fn fastest(&self) -> Duration {
        self.find_path_times.iter().min().copied().unwrap_or_default()
    }

    pub fn slowest(&self) -> Duration {
        self.find_path_times.iter().max().copied().unwrap_or_default()
    }

    pub fn total_calls(&self) -> usize {
        self.find_path_times.len()
    }
}

/// Per-backend summary of a simulation.
#[derive(Debug, Clone)]
pub struct BackendStats {
    pub backend: BackendKind,
    pub timing: TimingData,
    pub paths_found: usize,
    pub no_path: usize,
    /// Searches whose cost differed from the reference A*.
    pub cost_mismatches: usize,
}

impl BackendStats {
    pub fn new(backend: BackendKind) -> Self {
        BackendStats {
            backend,
            timing: TimingData::new(),
            paths_found: 0,
            no_path: 0,
            cost_mismatches: 0,
        }
    }
}

impl fmt::Display for BackendStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} backend:", self.backend)?;
        writeln!(f, "Total searches: {}", self.timing.total_calls())?;
        writeln!(f, "Paths found: {}", self.paths_found)?;
        writeln!(f, "No path: {}", self.no_path)?;
        writeln!(f, "Average search time: {:.2?}", self.timing.average_find_path_time())?;
        writeln!(
            f,
            "Search time range: {:.2?} to {:.2?}",
            self.timing.fastest(),
            self.timing.slowest()
        )?;
        if self.cost_mismatches > 0 {
            writeln!(
                f,
                "⚠ {} searches disagreed with the reference cost",
                self.cost_mismatches
            )?;
        }
        Ok(())
    }
}
