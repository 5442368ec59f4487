//! Component models for circuit simulation.
//!
//! The engine supports a closed set of two-terminal elements:
//! - Linear: Resistor, Capacitor, Inductor
//! - Sources: GroundedVoltageSource
//!
//! Reactive elements are represented by trapezoidal companion models: an
//! equivalent conductance stamped once into the system matrix plus a
//! history current source re-injected into the right-hand side every step.

mod linear;
mod sources;

pub use linear::{Capacitor, Inductor, Resistor};
pub use sources::GroundedVoltageSource;

use crate::circuit::NodeId;

/// A circuit component.
///
/// The variant set is fixed and exhaustive by domain definition, so the
/// contribution protocol is a closed sum type rather than a trait object.
#[derive(Debug, Clone)]
pub enum Component {
    Resistor(Resistor),
    Capacitor(Capacitor),
    Inductor(Inductor),
    GroundedVoltageSource(GroundedVoltageSource),
}

impl Component {
    /// First terminal (the ground terminal for the grounded source).
    pub fn node_s(&self) -> NodeId {
        match self {
            Component::Resistor(r) => r.nodes[0],
            Component::Capacitor(c) => c.nodes[0],
            Component::Inductor(l) => l.nodes[0],
            Component::GroundedVoltageSource(v) => v.nodes[0],
        }
    }

    /// Second terminal.
    pub fn node_d(&self) -> NodeId {
        match self {
            Component::Resistor(r) => r.nodes[1],
            Component::Capacitor(c) => c.nodes[1],
            Component::Inductor(l) => l.nodes[1],
            Component::GroundedVoltageSource(v) => v.nodes[1],
        }
    }

    /// Whether this component defines the circuit's ground reference.
    pub fn is_ground(&self) -> bool {
        matches!(self, Component::GroundedVoltageSource(_))
    }

    /// Conductance this component stamps into the system matrix for the
    /// given time step.
    pub fn conductance(&self, dt: f64) -> f64 {
        match self {
            Component::Resistor(r) => r.conductance(),
            Component::Capacitor(c) => c.conductance(dt),
            Component::Inductor(l) => l.conductance(dt),
            Component::GroundedVoltageSource(v) => v.conductance(),
        }
    }

    /// Most recently computed terminal current (0.0 before the first step).
    pub fn current(&self) -> f64 {
        match self {
            Component::Resistor(r) => r.current(),
            Component::Capacitor(c) => c.current(),
            Component::Inductor(l) => l.current(),
            Component::GroundedVoltageSource(v) => v.current(),
        }
    }

    /// Reset computed state and bind companion conductances to the
    /// circuit's time step.
    pub(crate) fn initialize(&mut self, dt: f64) {
        match self {
            Component::Resistor(r) => r.initialize(),
            Component::Capacitor(c) => c.initialize(dt),
            Component::Inductor(l) => l.initialize(dt),
            Component::GroundedVoltageSource(v) => v.initialize(),
        }
    }

    /// Fold the solved terminal voltages back into the component.
    pub(crate) fn update_state(&mut self, v_s: f64, v_d: f64) {
        match self {
            Component::Resistor(r) => r.update_state(v_s, v_d),
            Component::Capacitor(c) => c.update_state(v_s, v_d),
            Component::Inductor(l) => l.update_state(v_s, v_d),
            Component::GroundedVoltageSource(v) => v.update_state(v_s, v_d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_source_is_ground() {
        let r = Component::Resistor(Resistor::new(NodeId(0), NodeId(1), 1.0).unwrap());
        let v = Component::GroundedVoltageSource(
            GroundedVoltageSource::new(NodeId(2), NodeId(1), 5.0, 1.0).unwrap(),
        );
        assert!(!r.is_ground());
        assert!(v.is_ground());
    }

    #[test]
    fn test_terminal_accessors() {
        let c = Component::Capacitor(Capacitor::new(NodeId(3), NodeId(1), 1.0).unwrap());
        assert_eq!(c.node_s(), NodeId(3));
        assert_eq!(c.node_d(), NodeId(1));
    }

    #[test]
    fn test_current_defaults_to_zero() {
        let l = Component::Inductor(Inductor::new(NodeId(0), NodeId(1), 2.0).unwrap());
        assert_eq!(l.current(), 0.0);
    }
}
