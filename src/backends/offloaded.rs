//! A* on a worker thread over a copied flat snapshot.
//!
//! [`OffloadedBackend::dispatch`] copies the snapshot, schedules the search on
//! a rayon pool and returns a [`SearchHandle`] right away. The caller gets the
//! path back with [`OffloadedBackend::join`], which is the only call that
//! blocks. A backend runs at most one search at a time.

use crate::algorithms::a_star::SearchEngine;
use crate::algorithms::common::{validate_endpoints, Path};
use crate::backends::flat::{FlatCell, FlatGrid};
use crate::error::{PathfindingError, Result};
use crate::grid::{GridSize, Position};
use crossbeam::channel::{self, Receiver};
use log::{debug, error, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct OffloadedBackend {
    pool: Option<Arc<ThreadPool>>,
    busy: Arc<AtomicBool>,
}

impl Default for OffloadedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadedBackend {
    /// Runs searches on rayon's global pool.
    pub fn new() -> Self {
        OffloadedBackend {
            pool: None,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Runs searches on a dedicated pool of `workers` threads.
    pub fn with_workers(workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("astar-worker-{}", i))
            .build()?;
        Ok(Self::with_pool(Arc::new(pool)))
    }

    pub fn with_pool(pool: Arc<ThreadPool>) -> Self {
        OffloadedBackend {
            pool: Some(pool),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True while a dispatched search has not been joined.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Copies `snapshot` and schedules a search from `start` to `end`.
    ///
    /// Size and endpoint problems are reported here, before anything is
    /// scheduled. Fails with [`PathfindingError::DispatchInFlight`] if the
    /// previous handle has not been joined or dropped.
    pub fn dispatch(
        &mut self,
        snapshot: &[FlatCell],
        size: GridSize,
        start: Position,
        end: Position,
    ) -> Result<SearchHandle> {
        if self.is_busy() {
            return Err(PathfindingError::DispatchInFlight);
        }

        let mut grid = FlatGrid::try_from_cells(size, snapshot.to_vec())?;
        validate_endpoints(&grid, start, end)?;

        let mut engine = SearchEngine::with_capacity(grid.len());
        debug!("dispatching search {} -> {} on a {} grid", start, end, size);
        self.launch(move || {
            let path = engine.run(&mut grid, start, end);
            // scratch buffers go before the result is published, so a joined
            // handle never outlives them
            drop(engine);
            drop(grid);
            path
        })
    }

    /// Claims the backend and runs `job` on the pool.
    ///
    /// A panicking job is caught on the worker. Its sender is dropped without a
    /// result, which `join` reports as [`PathfindingError::WorkerLost`].
    fn launch<F>(&mut self, job: F) -> Result<SearchHandle>
    where
        F: FnOnce() -> Option<Path> + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PathfindingError::DispatchInFlight);
        }

        let (tx, rx) = channel::bounded(1);
        let done = Arc::new(AtomicBool::new(false));
        let worker_done = Arc::clone(&done);
        let task = move || {
            match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(path) => {
                    if tx.send(path).is_err() {
                        warn!("search finished after its handle was dropped");
                    }
                }
                Err(_) => error!("search worker panicked; dropping its result"),
            }
            drop(tx);
            worker_done.store(true, Ordering::Release);
        };

        match &self.pool {
            Some(pool) => pool.spawn(task),
            None => rayon::spawn(task),
        }

        Ok(SearchHandle {
            rx,
            busy: Arc::clone(&self.busy),
            done,
            settled: false,
        })
    }

    /// Blocks until the search behind `handle` finishes and returns its path.
    ///
    /// `Ok(None)` means the target was unreachable. The backend is free for a
    /// new dispatch once this returns, whatever the outcome.
    pub fn join(&mut self, handle: SearchHandle) -> Result<Option<Path>> {
        if !Arc::ptr_eq(&handle.busy, &self.busy) {
            return Err(PathfindingError::ForeignHandle);
        }
        handle.wait()
    }
}

/// Pending result of a dispatched search.
///
/// Dropping a handle without joining blocks until the search finishes and then
/// frees its backend.
#[must_use = "a dispatched search must be joined to obtain its path"]
#[derive(Debug)]
pub struct SearchHandle {
    rx: Receiver<Option<Path>>,
    busy: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
    settled: bool,
}

impl SearchHandle {
    /// True once the worker is done, with or without a result, and `join`
    /// will not block.
    pub fn is_finished(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    fn wait(mut self) -> Result<Option<Path>> {
        let outcome = self.rx.recv().map_err(|_| PathfindingError::WorkerLost);
        self.settle();
        outcome
    }

    fn settle(&mut self) {
        if !self.settled {
            self.settled = true;
            self.busy.store(false, Ordering::Release);
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if !self.settled {
            // recv returns once the worker has sent or dropped its sender
            let _ = self.rx.recv();
            self.settle();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::GridView;
    use crate::backends::linked::{LinkedGrid, SynchronousBackend};
    use crate::error::{Endpoint, EndpointFault};
    use crate::grid::GridLayout;

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    fn snapshot(rows: &str) -> FlatGrid {
        FlatGrid::from_layout(&GridLayout::parse(rows).unwrap()).unwrap()
    }

    #[test]
    fn dispatch_then_join_returns_the_path() {
        let grid = snapshot("...\n...\n...");
        let mut backend = OffloadedBackend::new();

        let handle = backend.dispatch(grid.cells(), GridSize::new(3, 3), p(0, 0), p(2, 2)).unwrap();
        assert!(backend.is_busy());
        let path = backend.join(handle).unwrap().unwrap();

        assert!(!backend.is_busy());
        assert_eq!(path.positions(), vec![p(0, 0), p(1, 1), p(2, 2)]);
        assert_eq!(path.total_cost(), 28);
    }

    #[test]
    fn second_dispatch_before_join_is_rejected() {
        let grid = snapshot("....\n....");
        let size = GridSize::new(4, 2);
        let mut backend = OffloadedBackend::with_workers(1).unwrap();

        let handle = backend.dispatch(grid.cells(), size, p(0, 0), p(3, 1)).unwrap();
        let err = backend.dispatch(grid.cells(), size, p(0, 0), p(3, 1)).unwrap_err();
        assert!(matches!(err, PathfindingError::DispatchInFlight));

        assert!(backend.join(handle).unwrap().is_some());
        let again = backend.dispatch(grid.cells(), size, p(3, 1), p(0, 0)).unwrap();
        assert!(backend.join(again).unwrap().is_some());
    }

    #[test]
    fn unreachable_target_frees_the_backend() {
        let grid = snapshot("..#.\n..#.\n..#.");
        let mut backend = OffloadedBackend::new();
        let handle = backend.dispatch(grid.cells(), GridSize::new(4, 3), p(0, 0), p(3, 2)).unwrap();
        assert_eq!(backend.join(handle).unwrap(), None);
        assert!(!backend.is_busy());
    }

    #[test]
    fn dropping_a_handle_frees_the_backend() {
        let grid = snapshot("...\n...");
        let mut backend = OffloadedBackend::new();
        let handle = backend.dispatch(grid.cells(), GridSize::new(3, 2), p(0, 0), p(2, 1)).unwrap();
        drop(handle);
        assert!(!backend.is_busy());
    }

    #[test]
    fn endpoint_and_size_errors_leave_the_backend_idle() {
        let grid = snapshot("..\n.#");
        let mut backend = OffloadedBackend::new();

        let err = backend
            .dispatch(grid.cells(), GridSize::new(2, 2), p(0, 0), p(1, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            PathfindingError::InvalidEndpoint {
                endpoint: Endpoint::Target,
                fault: EndpointFault::NotWalkable,
                ..
            }
        ));

        let err = backend
            .dispatch(grid.cells(), GridSize::new(3, 2), p(0, 0), p(1, 0))
            .unwrap_err();
        assert!(matches!(err, PathfindingError::SnapshotSize { expected: 6, got: 4 }));
        assert!(!backend.is_busy());
    }

    #[test]
    fn oversized_size_is_an_error_not_a_panic() {
        let mut backend = OffloadedBackend::new();
        let err = backend
            .dispatch(&[], GridSize::new(usize::MAX, 2), p(0, 0), p(0, 0))
            .unwrap_err();
        assert!(matches!(err, PathfindingError::InvalidGrid(_)));
        assert!(!backend.is_busy());
    }

    #[test]
    fn panicking_worker_reports_worker_lost() {
        let mut backend = OffloadedBackend::with_workers(1).unwrap();
        let handle = backend.launch(|| panic!("search blew up")).unwrap();
        while !handle.is_finished() {
            std::thread::yield_now();
        }
        let err = backend.join(handle).unwrap_err();
        assert!(matches!(err, PathfindingError::WorkerLost));
        assert!(!backend.is_busy());

        // the pool survives and the backend takes new work
        let grid = snapshot("..\n..");
        let handle = backend.dispatch(grid.cells(), GridSize::new(2, 2), p(0, 0), p(1, 1)).unwrap();
        assert!(backend.join(handle).unwrap().is_some());
    }

    #[test]
    fn dropping_a_panicked_handle_frees_the_backend() {
        let mut backend = OffloadedBackend::new();
        let handle = backend.launch(|| panic!("search blew up")).unwrap();
        drop(handle);
        assert!(!backend.is_busy());
    }

    #[test]
    fn join_rejects_foreign_handles() {
        let grid = snapshot("...\n...");
        let mut first = OffloadedBackend::new();
        let mut second = OffloadedBackend::new();

        let handle = first.dispatch(grid.cells(), GridSize::new(3, 2), p(0, 0), p(2, 1)).unwrap();
        let err = second.join(handle).unwrap_err();
        assert!(matches!(err, PathfindingError::ForeignHandle));
        // the rejected handle was dropped, which released its own backend
        assert!(!first.is_busy());
    }

    #[test]
    fn snapshot_is_copied_not_aliased() {
        let layout = GridLayout::parse("...\n...\n...").unwrap();
        let mut linked = LinkedGrid::from_layout(&layout).unwrap();
        let snap = linked.snapshot();

        let mut backend = OffloadedBackend::new();
        let handle = backend.dispatch(snap.cells(), snap.size(), p(0, 0), p(2, 2)).unwrap();
        let offloaded = backend.join(handle).unwrap().unwrap();

        // the caller's snapshot and the linked grid are untouched
        assert!(snap.cells().iter().all(|c| c.costs == Default::default()));
        assert!(linked.cells().iter().all(|c| c.costs == Default::default()));

        let synchronous = SynchronousBackend::new(&mut linked)
            .search(p(0, 0), p(2, 2))
            .unwrap()
            .unwrap();
        assert_eq!(offloaded, synchronous);
    }

    #[test]
    fn is_finished_turns_true_eventually() {
        let grid = snapshot("..\n..");
        let mut backend = OffloadedBackend::new();
        let handle = backend.dispatch(grid.cells(), GridSize::new(2, 2), p(0, 0), p(1, 1)).unwrap();
        while !handle.is_finished() {
            std::thread::yield_now();
        }
        assert!(backend.join(handle).unwrap().is_some());
    }
}
