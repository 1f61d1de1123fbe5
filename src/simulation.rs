use crate::algorithms::common::{GridView, Path};
use crate::algorithms::reference::reference_path;
use crate::backends::linked::{LinkedGrid, SynchronousBackend};
use crate::backends::offloaded::OffloadedBackend;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{GridLayout, Position};
use crate::statistics::{BackendKind, BackendStats};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Outcome of one backend searching one route.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub run: usize,
    pub backend: BackendKind,
    pub start: Position,
    pub goal: Position,
    pub path: Option<Path>,
    pub reference_cost: Option<u32>,
    pub elapsed: Duration,
}

impl SearchRecord {
    pub fn cost(&self) -> Option<u32> {
        self.path.as_ref().map(Path::total_cost)
    }

    pub fn matches_reference(&self) -> bool {
        self.cost() == self.reference_cost
    }
}

#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub seed: u64,
    pub records: Vec<SearchRecord>,
}

impl SimulationReport {
    pub fn stats(&self, backend: BackendKind) -> BackendStats {
        let mut stats = BackendStats::new(backend);
        for record in self.records.iter().filter(|r| r.backend == backend) {
            stats.timing.record(record.elapsed);
            if record.path.is_some() {
                stats.paths_found += 1;
            } else {
                stats.no_path += 1;
            }
            if !record.matches_reference() {
                stats.cost_mismatches += 1;
            }
        }
        stats
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &SearchRecord> {
        self.records.iter().filter(|r| !r.matches_reference())
    }

    /// True when every route searched by both backends got the same cost from each.
    pub fn backends_agree(&self) -> bool {
        self.records
            .iter()
            .filter(|r| r.backend == BackendKind::Synchronous)
            .all(|sync| {
                self.records
                    .iter()
                    .filter(|other| {
                        other.backend == BackendKind::Offloaded
                            && other.run == sync.run
                            && other.start == sync.start
                            && other.goal == sync.goal
                    })
                    .all(|offloaded| offloaded.cost() == sync.cost())
            })
    }

    pub fn print_comparison_results(&self) {
        println!("\n=== BACKEND COMPARISON RESULTS ===");
        println!("Seed: {} (for reproducibility)", self.seed);
        println!();

        println!(
            "{:<5} {:<13} {:<12} {:<12} {:<8} {:<8} {:<10} {:<12}",
            "Run", "Backend", "Start", "Goal", "Steps", "Cost", "Reference", "Time"
        );
        println!("{}", "-".repeat(86));

        for record in &self.records {
            let steps = record
                .path
                .as_ref()
                .map_or_else(|| "-".to_string(), |path| path.len().to_string());
            let cost = record
                .cost()
                .map_or_else(|| "no path".to_string(), |cost| cost.to_string());
            let reference = record
                .reference_cost
                .map_or_else(|| "no path".to_string(), |cost| cost.to_string());
            let marker = if record.matches_reference() { "" } else { " ✗" };

            println!(
                "{:<5} {:<13} {:<12} {:<12} {:<8} {:<8} {:<10} {:<12}",
                record.run,
                record.backend.to_string(),
                record.start.to_string(),
                record.goal.to_string(),
                steps,
                format!("{}{}", cost, marker),
                reference,
                format!("{:.2?}", record.elapsed)
            );
        }
        println!();

        for backend in [BackendKind::Synchronous, BackendKind::Offloaded] {
            let stats = self.stats(backend);
            if stats.timing.total_calls() > 0 {
                println!("{}", stats);
            }
        }

        let sync = self.stats(BackendKind::Synchronous).timing;
        let offloaded = self.stats(BackendKind::Offloaded).timing;
        if sync.total_calls() > 0 && offloaded.total_calls() > 0 {
            println!("=== PERFORMANCE ANALYSIS ===");
            let (fast, slow) = (
                sync.average_find_path_time().min(offloaded.average_find_path_time()),
                sync.average_find_path_time().max(offloaded.average_find_path_time()),
            );
            let faster = if sync.average_find_path_time() <= offloaded.average_find_path_time() {
                BackendKind::Synchronous
            } else {
                BackendKind::Offloaded
            };
            println!("Faster on average: {} ({:.2?} avg)", faster, fast);
            if fast > Duration::ZERO {
                println!(
                    "Slower backend takes {:.1}x as long",
                    slow.as_nanos() as f64 / fast.as_nanos() as f64
                );
            }
            if self.backends_agree() {
                println!("✓ Both backends returned equal path costs on every route");
            } else {
                println!("✗ Backends disagreed on at least one route");
            }
        }
    }
}

/// Shuffles grids and searches them with the configured backends.
pub struct Simulation {
    config: Config,
    seed: u64,
    rng: StdRng,
    offloaded: Option<OffloadedBackend>,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        // no pool is spun up for synchronous-only runs
        let offloaded = match (config.runs_offloaded(), config.workers) {
            (false, _) => None,
            (true, Some(workers)) => Some(OffloadedBackend::with_workers(workers)?),
            (true, None) => Some(OffloadedBackend::new()),
        };

        Ok(Simulation {
            seed,
            rng: StdRng::seed_from_u64(seed),
            offloaded,
            config,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The explicit route if one was configured, otherwise both corner diagonals.
    pub fn routes(&self) -> Vec<(Position, Position)> {
        if let (Some(start), Some(goal)) = (self.config.start, self.config.goal) {
            return vec![(start, goal)];
        }
        let size = self.config.size();
        let (right, bottom) = (size.width - 1, size.height - 1);
        vec![
            (Position::new(0, 0), Position::new(right, bottom)),
            (Position::new(0, bottom), Position::new(right, 0)),
        ]
    }

    pub fn run(&mut self) -> Result<SimulationReport> {
        let mut report = SimulationReport {
            seed: self.seed,
            records: Vec::new(),
        };

        for run in 0..self.config.runs {
            let mut layout = GridLayout::random(
                self.config.size(),
                self.config.obstacle_probability,
                &mut self.rng,
            )?;
            // explicit endpoints get the same guarantee the corners have
            for (start, goal) in self.routes() {
                layout.set_walkable(start, true);
                layout.set_walkable(goal, true);
            }
            info!(
                "run {}: {} grid with {} blocked cells",
                run,
                layout.size(),
                layout.blocked_count()
            );
            self.run_layout(run, &layout, &mut report.records)?;
        }

        Ok(report)
    }

    /// Searches every route on `layout` with each configured backend.
    pub fn run_layout(
        &mut self,
        run: usize,
        layout: &GridLayout,
        records: &mut Vec<SearchRecord>,
    ) -> Result<()> {
        let mut linked = LinkedGrid::from_layout(layout)?;

        for (start, goal) in self.routes() {
            let reference_cost = reference_path(layout, start, goal).map(|(_, cost)| cost);

            if self.config.runs_synchronous() {
                let timer = Instant::now();
                let path = SynchronousBackend::new(&mut linked).search(start, goal)?;
                let elapsed = timer.elapsed();
                records.push(logged(SearchRecord {
                    run,
                    backend: BackendKind::Synchronous,
                    start,
                    goal,
                    path,
                    reference_cost,
                    elapsed,
                }));
            }

            if let Some(offloaded) = self.offloaded.as_mut() {
                let snapshot = linked.snapshot();
                let timer = Instant::now();
                let handle = offloaded.dispatch(snapshot.cells(), snapshot.size(), start, goal)?;
                let path = offloaded.join(handle)?;
                let elapsed = timer.elapsed();
                records.push(logged(SearchRecord {
                    run,
                    backend: BackendKind::Offloaded,
                    start,
                    goal,
                    path,
                    reference_cost,
                    elapsed,
                }));
            }
        }

        Ok(())
    }
}

fn logged(record: SearchRecord) -> SearchRecord {
    let SearchRecord {
        backend,
        start,
        goal,
        elapsed,
        ..
    } = &record;

    match record.cost() {
        Some(cost) => debug!(
            "{}: {} -> {} cost {} in {:.2?}",
            backend, start, goal, cost, elapsed
        ),
        None => debug!("{}: {} -> {} has no path ({:.2?})", backend, start, goal, elapsed),
    }
    if !record.matches_reference() {
        warn!(
            "{}: {} -> {} cost {:?} differs from reference {:?}",
            backend,
            start,
            goal,
            record.cost(),
            record.reference_cost
        );
    }
    record
}
