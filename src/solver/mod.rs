//! Dense linear-algebra layer for the MNA system.
//!
//! The circuit assembles its conductance matrix into a [`Matrix`] and hands
//! it to [`PluFactorization`] exactly once per initialization; every
//! simulation step afterwards is a cheap triangular re-solve with a fresh
//! right-hand side. The system matrix is time-invariant because companion
//! conductances depend only on the fixed time step, never on the time
//! itself.

mod matrix;
mod plu;

pub use matrix::Matrix;
pub use plu::PluFactorization;

/// Pivot magnitudes at or below this value are treated as zero during
/// elimination.
pub const PIVOT_EPSILON: f64 = 1e-9;
