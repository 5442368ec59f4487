//! The grounded voltage source.

use crate::circuit::NodeId;
use crate::error::{LcsimError, Result};

/// A voltage source with one terminal tied to the simulation's ground.
///
/// Modeled as its Norton equivalent: a current injection of `V/R` in
/// parallel with a conductance of `1/R`, where R is the internal source
/// resistance. Node S is the ground terminal and defines the circuit's
/// zero-potential reference; node D is the driven terminal. The terminal
/// current after each solve is `i = (V - (v(D) - v(S))) / R`.
#[derive(Debug, Clone)]
pub struct GroundedVoltageSource {
    pub nodes: [NodeId; 2], // [S = ground, D = driven]
    pub voltage: f64,
    pub resistance: f64,
    current: f64,
}

impl GroundedVoltageSource {
    /// Create a new grounded voltage source. Voltage and internal
    /// resistance must both be strictly positive and the terminals must
    /// differ.
    pub fn new(node_s: NodeId, node_d: NodeId, voltage: f64, resistance: f64) -> Result<Self> {
        if node_s == node_d {
            return Err(LcsimError::InvalidNodes { node: node_s.0 });
        }
        if voltage <= 0.0 {
            return Err(LcsimError::InvalidParameter {
                param: "voltage",
                value: voltage,
            });
        }
        if resistance <= 0.0 {
            return Err(LcsimError::InvalidParameter {
                param: "internal resistance",
                value: resistance,
            });
        }
        Ok(Self {
            nodes: [node_s, node_d],
            voltage,
            resistance,
            current: 0.0,
        })
    }

    /// The node this source ties to ground.
    pub fn ground_node(&self) -> NodeId {
        self.nodes[0]
    }

    /// Norton conductance 1/R stamped into the system matrix.
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Norton current injection V/R (positive at node D, negative at
    /// node S).
    pub fn source_current(&self) -> f64 {
        self.voltage / self.resistance
    }

    /// Reset computed state before a (re-)initialization.
    pub(crate) fn initialize(&mut self) {
        self.current = 0.0;
    }

    /// Recover the source current from the solved node voltages.
    pub(crate) fn update_state(&mut self, v_s: f64, v_d: f64) {
        self.current = (self.voltage - (v_d - v_s)) / self.resistance;
    }

    /// Most recently computed terminal current.
    pub fn current(&self) -> f64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validation() {
        assert!(GroundedVoltageSource::new(NodeId(1), NodeId(2), 7.0, 10.0).is_ok());
        assert_eq!(
            GroundedVoltageSource::new(NodeId(1), NodeId(2), -7.0, 10.0).unwrap_err(),
            LcsimError::InvalidParameter {
                param: "voltage",
                value: -7.0
            }
        );
        assert_eq!(
            GroundedVoltageSource::new(NodeId(1), NodeId(2), 7.0, -10.0).unwrap_err(),
            LcsimError::InvalidParameter {
                param: "internal resistance",
                value: -10.0
            }
        );
        assert_eq!(
            GroundedVoltageSource::new(NodeId(3), NodeId(3), 7.0, 10.0).unwrap_err(),
            LcsimError::InvalidNodes { node: 3 }
        );
    }

    #[test]
    fn test_norton_equivalent() {
        let vs = GroundedVoltageSource::new(NodeId(2), NodeId(1), 30.0, 10.0).unwrap();
        assert_eq!(vs.ground_node(), NodeId(2));
        assert_relative_eq!(vs.conductance(), 0.1, max_relative = 1e-12);
        assert_relative_eq!(vs.source_current(), 3.0, max_relative = 1e-12);
    }

    #[test]
    fn test_current_from_voltages() {
        let mut vs = GroundedVoltageSource::new(NodeId(2), NodeId(1), 30.0, 10.0).unwrap();
        // Driven node at 20 V relative to ground: i = (30 - 20) / 10
        vs.update_state(0.0, 20.0);
        assert_relative_eq!(vs.current(), 1.0, max_relative = 1e-12);
    }
}
