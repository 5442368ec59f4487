//! Circuit representation and simulation lifecycle.
//!
//! [`LinearCircuit`] owns the component collection, the circuit-wide time
//! parameters, and the factored MNA system, and exposes the
//! build / initialize / step / query lifecycle.

mod linear;
mod types;
mod validate;

pub use linear::LinearCircuit;
pub use types::NodeId;
