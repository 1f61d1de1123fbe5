//! Grid A* with two interchangeable execution strategies.
//!
//! [`SynchronousBackend`] searches a [`LinkedGrid`] on the calling thread and
//! leaves its scratch costs in the cells. [`OffloadedBackend`] copies a flat
//! snapshot, runs the same engine on a worker thread and hands back a
//! [`SearchHandle`] to join. Both go through one [`SearchEngine`] generic over
//! [`GridView`], so for the same grid and endpoints they return paths of equal
//! cost.

pub mod algorithms;
pub mod backends;
pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod statistics;

pub use algorithms::a_star::SearchEngine;
pub use algorithms::common::{CellCosts, GridView, Path, PathStep};
pub use algorithms::cost::distance;
pub use algorithms::reference::reference_path;
pub use backends::flat::{FlatCell, FlatGrid};
pub use backends::linked::{LinkedCell, LinkedGrid, SynchronousBackend};
pub use backends::offloaded::{OffloadedBackend, SearchHandle};
pub use error::{Endpoint, EndpointFault, PathfindingError, Result};
pub use grid::{GridLayout, GridSize, Position};
