//! Initialize-time validation.

use crate::error::{LcsimError, Result};

use super::types::NodeId;
use super::LinearCircuit;

/// Validate a circuit's global preconditions before matrix assembly.
///
/// Checks, in contract order:
/// - at least one component exists
/// - exactly one grounded source exists
/// - the stop time covers at least one time step (which also rejects a
///   never-configured or non-positive time step)
/// - the referenced node identifiers form exactly {0, ..., maxNode}
pub(crate) fn validate_topology(circuit: &LinearCircuit) -> Result<()> {
    if circuit.components.is_empty() {
        return Err(LcsimError::NoComponents);
    }
    if circuit.ground.is_none() {
        return Err(LcsimError::NoGround);
    }
    if circuit.time_step <= 0.0 || circuit.stop_time < circuit.time_step {
        return Err(LcsimError::StopTimeTooSmall {
            stop_time: circuit.stop_time,
            time_step: circuit.time_step,
        });
    }
    for node in 0..=circuit.max_node {
        if !circuit.nodes.contains(&NodeId(node)) {
            return Err(LcsimError::NodesNotCondensed { node });
        }
    }
    Ok(())
}
