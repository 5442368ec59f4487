//! # Lcsim
//!
//! A transient linear-circuit simulation engine.
//!
//! Given a topology of two-terminal components (resistors, capacitors,
//! inductors, and one grounded voltage source), the engine computes the
//! voltage at every circuit node and the current through every component at
//! discrete time steps, using Modified Nodal Analysis (MNA) with companion
//! models for the energy-storage elements and a dense LU solver with
//! partial pivoting.
//!
//! ## Architecture
//!
//! - [`circuit`] - the [`LinearCircuit`] orchestrator and its lifecycle
//! - [`components`] - component models and their matrix stamps
//! - [`solver`] - dense matrix storage and the LU factorization
//! - [`error`] - the unified error type
//!
//! ## Simulation method
//!
//! For a fixed time step dt, each reactive element is replaced by its
//! trapezoidal companion model: an equivalent conductance (2C/dt for a
//! capacitor, dt/2L for an inductor) plus a history current source derived
//! from the previous step. The resulting conductance matrix is
//! time-invariant, so it is assembled and LU-factored exactly once at
//! initialization; every step then rebuilds the right-hand side from the
//! source injection and the history terms and re-solves the factored
//! system.
//!
//! ## Usage
//!
//! ```
//! use lcsim::LinearCircuit;
//!
//! // 30 V source with 10 Ohm internal resistance driving a 10 + 10 Ohm
//! // divider; node 2 is ground.
//! let mut circuit = LinearCircuit::new(3)?;
//! circuit.add_grounded_voltage_source(2, 1, 30.0, 10.0)?;
//! circuit.add_resistor(1, 0, 10.0)?;
//! circuit.add_resistor(0, 2, 10.0)?;
//! circuit.set_stop_time(10.0)?;
//! circuit.set_time_step(1.0)?;
//! circuit.initialize()?;
//!
//! while !circuit.step()? {}
//!
//! assert!((circuit.voltage(0)? - 10.0).abs() < 1e-9);
//! assert!((circuit.current(0)? - 1.0).abs() < 1e-9);
//! # Ok::<(), lcsim::LcsimError>(())
//! ```

pub mod circuit;
pub mod components;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::LinearCircuit;
pub use error::{LcsimError, Result};
