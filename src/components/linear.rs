//! Linear passive components: Resistor, Capacitor, Inductor.

use crate::circuit::NodeId;
use crate::error::{LcsimError, Result};

fn check_nodes(node_s: NodeId, node_d: NodeId) -> Result<()> {
    if node_s == node_d {
        return Err(LcsimError::InvalidNodes { node: node_s.0 });
    }
    Ok(())
}

fn check_positive(param: &'static str, value: f64) -> Result<()> {
    if value <= 0.0 {
        return Err(LcsimError::InvalidParameter { param, value });
    }
    Ok(())
}

/// A resistor between two nodes.
///
/// Stamps a conductance of 1/R and reports the terminal current
/// `i = (v(S) - v(D)) / R` after each solve.
#[derive(Debug, Clone)]
pub struct Resistor {
    pub nodes: [NodeId; 2], // [S, D]
    pub resistance: f64,
    current: f64,
}

impl Resistor {
    /// Create a new resistor. Resistance must be strictly positive and the
    /// terminals must differ.
    pub fn new(node_s: NodeId, node_d: NodeId, resistance: f64) -> Result<Self> {
        check_nodes(node_s, node_d)?;
        check_positive("resistance", resistance)?;
        Ok(Self {
            nodes: [node_s, node_d],
            resistance,
            current: 0.0,
        })
    }

    /// Conductance stamped into the system matrix.
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Reset computed state before a (re-)initialization.
    pub(crate) fn initialize(&mut self) {
        self.current = 0.0;
    }

    /// Recover the terminal current from the solved node voltages.
    pub(crate) fn update_state(&mut self, v_s: f64, v_d: f64) {
        self.current = (v_s - v_d) / self.resistance;
    }

    /// Most recently computed terminal current.
    pub fn current(&self) -> f64 {
        self.current
    }
}

/// A capacitor between two nodes, discretized with the trapezoidal rule.
///
/// The companion model replaces the capacitor with an equivalent
/// conductance `G = 2C/dt` in parallel with a history current source.
/// Before each solve the history term advances to
/// `I_hist = G * v(t-1) + i(t-1)` and is injected into the right-hand side
/// (positive at node S, negative at node D). After the solve the branch
/// current follows from `i(t) = G * v(t) - I_hist`.
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub nodes: [NodeId; 2],
    pub capacitance: f64,

    /// Equivalent conductance 2C/dt, fixed at initialization
    g_eq: f64,
    /// Voltage across the terminals at the previous step
    v_delta: f64,
    /// History term; between post-steps this equals the branch current
    through: f64,
}

impl Capacitor {
    /// Create a new capacitor. Capacitance must be strictly positive and
    /// the terminals must differ.
    pub fn new(node_s: NodeId, node_d: NodeId, capacitance: f64) -> Result<Self> {
        check_nodes(node_s, node_d)?;
        check_positive("capacitance", capacitance)?;
        Ok(Self {
            nodes: [node_s, node_d],
            capacitance,
            g_eq: 0.0,
            v_delta: 0.0,
            through: 0.0,
        })
    }

    /// Equivalent conductance of the trapezoidal companion model.
    pub fn conductance(&self, dt: f64) -> f64 {
        2.0 * self.capacitance / dt
    }

    /// Reset history state and bind the companion conductance to the
    /// circuit's time step.
    pub(crate) fn initialize(&mut self, dt: f64) {
        self.g_eq = self.conductance(dt);
        self.v_delta = 0.0;
        self.through = 0.0;
    }

    /// Advance the history term for the upcoming solve and return the
    /// current to inject (positive at node S, negative at node D).
    pub(crate) fn step_source(&mut self) -> f64 {
        self.through = self.g_eq * self.v_delta + self.through;
        self.through
    }

    /// Fold the solved voltages back into the companion state.
    pub(crate) fn update_state(&mut self, v_s: f64, v_d: f64) {
        self.v_delta = v_s - v_d;
        // i(t) = G * v(t) - (G * v(t-1) + i(t-1))
        self.through = self.g_eq * self.v_delta - self.through;
    }

    /// Most recently computed terminal current.
    pub fn current(&self) -> f64 {
        self.through
    }
}

/// An inductor between two nodes, discretized with the trapezoidal rule.
///
/// The companion model replaces the inductor with an equivalent conductance
/// `G = dt/(2L)` in parallel with a history current source. Before each
/// solve the accumulated branch current `I_hist = G * v(t-1) + i(t-1)` is
/// injected into the right-hand side; the inductor resists change, so the
/// injection sign is opposite the capacitor's (negative at node S, positive
/// at node D). After the solve `i(t) = G * v(t) + I_hist`.
#[derive(Debug, Clone)]
pub struct Inductor {
    pub nodes: [NodeId; 2],
    pub inductance: f64,

    /// Equivalent conductance dt/(2L), fixed at initialization
    g_eq: f64,
    /// Voltage across the terminals at the previous step
    v_delta: f64,
    /// Accumulated branch current
    current: f64,
}

impl Inductor {
    /// Create a new inductor. Inductance must be strictly positive and the
    /// terminals must differ.
    pub fn new(node_s: NodeId, node_d: NodeId, inductance: f64) -> Result<Self> {
        check_nodes(node_s, node_d)?;
        check_positive("inductance", inductance)?;
        Ok(Self {
            nodes: [node_s, node_d],
            inductance,
            g_eq: 0.0,
            v_delta: 0.0,
            current: 0.0,
        })
    }

    /// Equivalent conductance of the trapezoidal companion model.
    pub fn conductance(&self, dt: f64) -> f64 {
        dt / (2.0 * self.inductance)
    }

    /// Reset history state and bind the companion conductance to the
    /// circuit's time step.
    pub(crate) fn initialize(&mut self, dt: f64) {
        self.g_eq = self.conductance(dt);
        self.v_delta = 0.0;
        self.current = 0.0;
    }

    /// Advance the history term for the upcoming solve and return the
    /// current to inject (negative at node S, positive at node D).
    pub(crate) fn step_source(&mut self) -> f64 {
        self.current = self.g_eq * self.v_delta + self.current;
        self.current
    }

    /// Fold the solved voltages back into the companion state.
    pub(crate) fn update_state(&mut self, v_s: f64, v_d: f64) {
        self.v_delta = v_s - v_d;
        // i(t) = G * v(t) + (G * v(t-1) + i(t-1))
        self.current = self.g_eq * self.v_delta + self.current;
    }

    /// Most recently computed terminal current.
    pub fn current(&self) -> f64 {
        self.current
    }
}
