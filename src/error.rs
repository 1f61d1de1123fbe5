//! Error types for grid construction and path searches.

use crate::grid::{GridSize, Position};
use std::fmt;
use thiserror::Error;

/// Which end of a search request an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// Why an endpoint was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFault {
    OutOfBounds(GridSize),
    NotWalkable,
}

impl fmt::Display for EndpointFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointFault::OutOfBounds(size) => write!(f, "is outside the {} grid", size),
            EndpointFault::NotWalkable => write!(f, "is not walkable"),
        }
    }
}

/// Errors raised by grid builders and search backends.
///
/// An unreachable target is not an error: searches report it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum PathfindingError {
    /// Start or target cannot take part in a search.
    #[error("{endpoint} position {position} {fault}")]
    InvalidEndpoint {
        endpoint: Endpoint,
        position: Position,
        fault: EndpointFault,
    },

    /// `dispatch` was called while an earlier dispatch is still unjoined.
    #[error("a search is already in flight on this backend; join it before dispatching again")]
    DispatchInFlight,

    /// The handle passed to `join` was produced by another backend.
    #[error("search handle was dispatched by a different backend")]
    ForeignHandle,

    /// Snapshot length does not match the declared grid size.
    #[error("snapshot holds {got} cells but the grid needs {expected}")]
    SnapshotSize { expected: usize, got: usize },

    /// The worker ended without reporting a result.
    #[error("search worker terminated before producing a result")]
    WorkerLost,

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("failed to build search worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, PathfindingError>;
