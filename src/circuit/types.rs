//! Core types for circuit representation.

use std::fmt;

/// A unique identifier for a node in the circuit.
///
/// Node identifiers are caller-assigned and must form a condensed set
/// {0, 1, ..., maxNode} by the time the circuit is initialized. Which node
/// is ground is determined by the grounded source, not by the identifier
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Position of this node's voltage in the solution vector, with the
    /// ground node eliminated.
    ///
    /// Returns `None` for the ground node itself; nodes above the ground
    /// identifier shift down by one.
    pub fn matrix_index(self, ground: NodeId) -> Option<usize> {
        if self == ground {
            None
        } else if self.0 < ground.0 {
            Some(self.0)
        } else {
            Some(self.0 - 1)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_index_skips_ground() {
        let ground = NodeId(2);
        assert_eq!(NodeId(0).matrix_index(ground), Some(0));
        assert_eq!(NodeId(1).matrix_index(ground), Some(1));
        assert_eq!(NodeId(2).matrix_index(ground), None);
        assert_eq!(NodeId(3).matrix_index(ground), Some(2));
    }

    #[test]
    fn test_matrix_index_with_ground_zero() {
        let ground = NodeId(0);
        assert_eq!(NodeId(0).matrix_index(ground), None);
        assert_eq!(NodeId(1).matrix_index(ground), Some(0));
        assert_eq!(NodeId(4).matrix_index(ground), Some(3));
    }
}
