//! Error types for the circuit simulation engine.
//!
//! This module provides a unified error type [`LcsimError`] that covers
//! all error conditions that can occur while building a circuit, assembling
//! and factoring the system matrix, and stepping the simulation.

use thiserror::Error;

/// Result type alias using [`LcsimError`].
pub type Result<T> = std::result::Result<T, LcsimError>;

/// Unified error type for all engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LcsimError {
    // ============ Matrix Errors ============
    /// Matrix constructed with a zero dimension, or a non-square matrix
    /// handed to the factorization
    #[error("matrix dimensions must be positive and non-zero (got {rows}x{cols})")]
    InvalidDimension { rows: usize, cols: usize },

    /// Element access outside the matrix extent
    #[error("location ({row}, {col}) is beyond the dimensions of the {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Right-hand-side vector does not match the factored system size
    #[error("right-hand side has length {len} but the system has {size} unknowns")]
    DimensionMismatch { len: usize, size: usize },

    // ============ Factorization Errors ============
    /// No usable pivot was found during elimination
    #[error("matrix is singular - circuit may have a floating or short-circuited node")]
    Singular,

    /// Solve was requested before a successful factorization
    #[error("system has not been factored")]
    NotFactored,

    // ============ Component Errors ============
    /// Non-positive physical parameter (resistance, capacitance, ...)
    #[error("{param} must be greater than 0 (got {value})")]
    InvalidParameter { param: &'static str, value: f64 },

    /// Both terminals of a component connect to the same node
    #[error("component terminals must connect to two different nodes (got node {node} twice)")]
    InvalidNodes { node: usize },

    // ============ Circuit Building Errors ============
    /// Circuit constructed with a zero component capacity
    #[error("circuit must have a positive and non-zero component capacity")]
    InvalidCapacity,

    /// Component count has reached the configured capacity
    #[error("circuit is already full of components (capacity {capacity})")]
    CircuitFull { capacity: usize },

    /// A second grounded source was added
    #[error("circuit already has a ground, cannot add another one")]
    DuplicateGround,

    /// Topology or time parameters changed after initialization
    #[error("circuit cannot be modified after it has been initialized")]
    AlreadyInitialized,

    // ============ Initialization Errors ============
    /// Initialize called on an empty circuit
    #[error("there are no components in the circuit")]
    NoComponents,

    /// Initialize called without a grounded source present
    #[error("there is no ground in the circuit")]
    NoGround,

    /// Stop time shorter than a single time step (or the time step was
    /// never configured)
    #[error("stop time {stop_time} cannot be smaller than time step {time_step}")]
    StopTimeTooSmall { stop_time: f64, time_step: f64 },

    /// Node identifiers leave a gap in {0, 1, ..., maxNode}
    #[error("circuit nodes are not condensed: node {node} is never referenced")]
    NodesNotCondensed { node: usize },

    // ============ Simulation Errors ============
    /// Step called before initialize
    #[error("circuit has not been initialized")]
    NotInitialized,

    /// Voltage or current queried before the first step
    #[error("cannot read results from a circuit that has not been simulated")]
    NotSimulated,

    /// Voltage or current queried with an index the circuit never uses
    #[error("requested {kind} {index} does not exist (the circuit has {count})")]
    OutOfRange {
        kind: &'static str,
        index: usize,
        count: usize,
    },
}
