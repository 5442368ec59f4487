//! The linear circuit orchestrator.

use crate::components::{Capacitor, Component, GroundedVoltageSource, Inductor, Resistor};
use crate::error::{LcsimError, Result};
use crate::solver::{Matrix, PluFactorization};

use super::types::NodeId;
use super::validate::validate_topology;

/// Add to the right-hand side, skipping entries for the eliminated ground.
fn inject(source: &mut [f64], index: Option<usize>, value: f64) {
    if let Some(i) = index {
        source[i] += value;
    }
}

/// Stamp a conductance between two matrix positions.
///
/// For a conductance G between nodes n1 and n2:
///   A[n1,n1] += G, A[n2,n2] += G, A[n1,n2] -= G, A[n2,n1] -= G
/// A `None` position is the eliminated ground node and receives no stamp.
fn stamp_conductance(matrix: &mut Matrix, n1: Option<usize>, n2: Option<usize>, g: f64) -> Result<()> {
    if let Some(i) = n1 {
        matrix.add(i, i, g)?;
    }
    if let Some(j) = n2 {
        matrix.add(j, j, g)?;
    }
    if let (Some(i), Some(j)) = (n1, n2) {
        matrix.add(i, j, -g)?;
        matrix.add(j, i, -g)?;
    }
    Ok(())
}

/// A transient linear circuit simulation.
///
/// Lifecycle: build the topology with the `add_*` methods and configure the
/// time parameters, then call [`initialize`](Self::initialize) once — this
/// validates the circuit, assembles the MNA conductance matrix with the
/// ground node eliminated, and factors it. Afterwards, call
/// [`step`](Self::step) repeatedly until it reports completion; node
/// voltages and component currents are readable once at least one step has
/// executed.
///
/// The system matrix is factored exactly once because companion
/// conductances depend only on the fixed time step; every step re-solves
/// the stored factorization against a freshly built right-hand side.
#[derive(Debug)]
pub struct LinearCircuit {
    /// All components, in insertion order; the add index is stable
    pub(crate) components: Vec<Component>,
    /// Logical component limit, fixed at construction
    capacity: usize,
    /// Distinct node identifiers referenced so far
    pub(crate) nodes: Vec<NodeId>,
    /// Highest node identifier referenced so far
    pub(crate) max_node: usize,
    /// Ground reference, set when the grounded source is added
    pub(crate) ground: Option<NodeId>,
    pub(crate) stop_time: f64,
    pub(crate) time_step: f64,
    time: f64,
    initialized: bool,
    simulated: bool,
    /// Assembled conductance matrix (ground eliminated)
    conductance: Option<Matrix>,
    /// Right-hand side, rebuilt every step
    source: Vec<f64>,
    /// Solved potential per node identifier; the ground entry stays 0.0
    voltages: Vec<f64>,
    plu: PluFactorization,
}

impl LinearCircuit {
    /// Create a new circuit with the given component capacity.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LcsimError::InvalidCapacity);
        }
        Ok(Self {
            components: Vec::new(),
            capacity,
            nodes: Vec::new(),
            max_node: 0,
            ground: None,
            stop_time: 0.0,
            time_step: 0.0,
            time: 0.0,
            initialized: false,
            simulated: false,
            conductance: None,
            source: Vec::new(),
            voltages: Vec::new(),
            plu: PluFactorization::new(),
        })
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.initialized {
            return Err(LcsimError::AlreadyInitialized);
        }
        Ok(())
    }

    fn ensure_room(&self) -> Result<()> {
        if self.components.len() == self.capacity {
            return Err(LcsimError::CircuitFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn register_node(&mut self, node: NodeId) {
        if !self.nodes.contains(&node) {
            self.nodes.push(node);
        }
        if node.0 > self.max_node {
            self.max_node = node.0;
        }
    }

    fn push(&mut self, component: Component) -> usize {
        if component.is_ground() {
            self.ground = Some(component.node_s());
        }
        self.register_node(component.node_s());
        self.register_node(component.node_d());
        self.components.push(component);
        self.components.len() - 1
    }

    /// Add a resistor and return its component index.
    pub fn add_resistor(&mut self, node_s: usize, node_d: usize, resistance: f64) -> Result<usize> {
        self.ensure_mutable()?;
        self.ensure_room()?;
        let r = Resistor::new(NodeId(node_s), NodeId(node_d), resistance)?;
        Ok(self.push(Component::Resistor(r)))
    }

    /// Add a capacitor and return its component index.
    pub fn add_capacitor(&mut self, node_s: usize, node_d: usize, capacitance: f64) -> Result<usize> {
        self.ensure_mutable()?;
        self.ensure_room()?;
        let c = Capacitor::new(NodeId(node_s), NodeId(node_d), capacitance)?;
        Ok(self.push(Component::Capacitor(c)))
    }

    /// Add an inductor and return its component index.
    pub fn add_inductor(&mut self, node_s: usize, node_d: usize, inductance: f64) -> Result<usize> {
        self.ensure_mutable()?;
        self.ensure_room()?;
        let l = Inductor::new(NodeId(node_s), NodeId(node_d), inductance)?;
        Ok(self.push(Component::Inductor(l)))
    }

    /// Add a grounded voltage source and return its component index.
    ///
    /// `node_s` becomes the circuit's zero-potential reference. At most one
    /// grounded source may exist per circuit.
    pub fn add_grounded_voltage_source(
        &mut self,
        node_s: usize,
        node_d: usize,
        voltage: f64,
        resistance: f64,
    ) -> Result<usize> {
        self.ensure_mutable()?;
        self.ensure_room()?;
        if self.ground.is_some() {
            return Err(LcsimError::DuplicateGround);
        }
        let vs = GroundedVoltageSource::new(NodeId(node_s), NodeId(node_d), voltage, resistance)?;
        Ok(self.push(Component::GroundedVoltageSource(vs)))
    }

    /// Set the simulation stop time. Must be strictly positive.
    pub fn set_stop_time(&mut self, stop_time: f64) -> Result<()> {
        self.ensure_mutable()?;
        if stop_time <= 0.0 {
            return Err(LcsimError::InvalidParameter {
                param: "stop time",
                value: stop_time,
            });
        }
        self.stop_time = stop_time;
        Ok(())
    }

    /// Set the simulation time step. Must be strictly positive.
    pub fn set_time_step(&mut self, time_step: f64) -> Result<()> {
        self.ensure_mutable()?;
        if time_step <= 0.0 {
            return Err(LcsimError::InvalidParameter {
                param: "time step",
                value: time_step,
            });
        }
        self.time_step = time_step;
        Ok(())
    }

    /// Validate the circuit, assemble the MNA conductance matrix, and
    /// factor it.
    ///
    /// After a successful call the circuit is sealed: topology and time
    /// parameters can no longer change.
    pub fn initialize(&mut self) -> Result<()> {
        validate_topology(self)?;
        let ground = match self.ground {
            Some(g) => g,
            None => return Err(LcsimError::NoGround),
        };

        // One unknown per non-ground node of the condensed set
        let size = self.max_node;
        let mut conductance = Matrix::new(size, size)?;

        for component in &mut self.components {
            component.initialize(self.time_step);
        }
        for component in &self.components {
            let g = component.conductance(self.time_step);
            stamp_conductance(
                &mut conductance,
                component.node_s().matrix_index(ground),
                component.node_d().matrix_index(ground),
                g,
            )?;
        }

        self.plu.factor(&conductance)?;
        self.conductance = Some(conductance);
        self.source = vec![0.0; size];
        self.voltages = vec![0.0; self.max_node + 1];
        self.time = 0.0;
        self.simulated = false;
        self.initialized = true;
        Ok(())
    }

    /// Advance the simulation by one time step.
    ///
    /// Rebuilds the right-hand side from the source injection and every
    /// reactive component's history term, re-solves the factored system,
    /// folds the solved voltages back into each component, and advances the
    /// clock. Returns `true` exactly when the new time has reached or
    /// passed the stop time.
    pub fn step(&mut self) -> Result<bool> {
        if !self.initialized {
            return Err(LcsimError::NotInitialized);
        }
        let ground = match self.ground {
            Some(g) => g,
            None => return Err(LcsimError::NoGround),
        };

        self.source.fill(0.0);
        for component in &mut self.components {
            match component {
                Component::GroundedVoltageSource(vs) => {
                    let i_src = vs.source_current();
                    inject(&mut self.source, vs.nodes[1].matrix_index(ground), i_src);
                    inject(&mut self.source, vs.nodes[0].matrix_index(ground), -i_src);
                }
                Component::Capacitor(c) => {
                    let i_hist = c.step_source();
                    inject(&mut self.source, c.nodes[0].matrix_index(ground), i_hist);
                    inject(&mut self.source, c.nodes[1].matrix_index(ground), -i_hist);
                }
                Component::Inductor(l) => {
                    // Opposite sign from the capacitor: the accumulated
                    // branch current opposes the applied voltage
                    let i_hist = l.step_source();
                    inject(&mut self.source, l.nodes[0].matrix_index(ground), -i_hist);
                    inject(&mut self.source, l.nodes[1].matrix_index(ground), i_hist);
                }
                Component::Resistor(_) => {}
            }
        }

        let solution = self.plu.solve(&self.source)?;
        for node in 0..=self.max_node {
            self.voltages[node] = match NodeId(node).matrix_index(ground) {
                Some(i) => solution[i],
                None => 0.0,
            };
        }

        for component in &mut self.components {
            let v_s = self.voltages[component.node_s().0];
            let v_d = self.voltages[component.node_d().0];
            component.update_state(v_s, v_d);
        }

        self.time += self.time_step;
        self.simulated = true;
        Ok(self.time >= self.stop_time)
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Most recently solved potential at the given node.
    ///
    /// The ground node reads 0.0 by convention. Fails with `OutOfRange` for
    /// a node the circuit never references and with `NotSimulated` before
    /// the first step.
    pub fn voltage(&self, node: usize) -> Result<f64> {
        if node > self.max_node {
            return Err(LcsimError::OutOfRange {
                kind: "node",
                index: node,
                count: self.max_node + 1,
            });
        }
        if !self.simulated {
            return Err(LcsimError::NotSimulated);
        }
        Ok(self.voltages[node])
    }

    /// Most recently computed current through the given component.
    ///
    /// Fails with `OutOfRange` for an invalid component index and with
    /// `NotSimulated` before the first step.
    pub fn current(&self, component_index: usize) -> Result<f64> {
        if component_index >= self.components.len() {
            return Err(LcsimError::OutOfRange {
                kind: "component",
                index: component_index,
                count: self.components.len(),
            });
        }
        if !self.simulated {
            return Err(LcsimError::NotSimulated);
        }
        Ok(self.components[component_index].current())
    }

    /// The assembled conductance matrix, available once initialized.
    pub fn system_matrix(&self) -> Option<&Matrix> {
        self.conductance.as_ref()
    }

    /// Number of components added so far.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Configured component capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `initialize` has completed successfully.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// GroundedVoltageSource(2 ground, 1, 30 V, 10 Ohm) + Resistor(1, 0,
    /// 10 Ohm), with the third element supplied by the caller.
    fn divider_circuit() -> LinearCircuit {
        let mut circuit = LinearCircuit::new(3).unwrap();
        circuit.add_grounded_voltage_source(2, 1, 30.0, 10.0).unwrap();
        circuit.add_resistor(1, 0, 10.0).unwrap();
        circuit
    }

    fn run_to_completion(circuit: &mut LinearCircuit) -> usize {
        let mut steps = 0;
        loop {
            let done = circuit.step().unwrap();
            steps += 1;
            if done || steps > 1000 {
                return steps;
            }
        }
    }

    #[test]
    fn test_invalid_capacity() {
        assert_eq!(LinearCircuit::new(0).err(), Some(LcsimError::InvalidCapacity));
    }

    #[test]
    fn test_capacity_boundary() {
        let mut circuit = LinearCircuit::new(2).unwrap();
        assert_eq!(circuit.add_resistor(0, 1, 10.0).unwrap(), 0);
        assert_eq!(circuit.add_resistor(1, 2, 10.0).unwrap(), 1);
        assert_eq!(
            circuit.add_resistor(2, 3, 10.0),
            Err(LcsimError::CircuitFull { capacity: 2 })
        );
    }

    #[test]
    fn test_duplicate_ground() {
        let mut circuit = LinearCircuit::new(4).unwrap();
        circuit.add_grounded_voltage_source(1, 2, 30.0, 10.0).unwrap();
        assert_eq!(
            circuit.add_grounded_voltage_source(1, 2, 30.0, 10.0),
            Err(LcsimError::DuplicateGround)
        );
        // Different node values make no difference
        assert_eq!(
            circuit.add_grounded_voltage_source(3, 4, 5.0, 1.0),
            Err(LcsimError::DuplicateGround)
        );
    }

    #[test]
    fn test_component_validation_propagates() {
        let mut circuit = LinearCircuit::new(4).unwrap();
        assert!(matches!(
            circuit.add_resistor(0, 1, -10.0),
            Err(LcsimError::InvalidParameter { .. })
        ));
        assert_eq!(
            circuit.add_capacitor(1, 1, 0.5),
            Err(LcsimError::InvalidNodes { node: 1 })
        );
        assert_eq!(circuit.component_count(), 0);
    }

    #[test]
    fn test_time_parameter_validation() {
        let mut circuit = LinearCircuit::new(1).unwrap();
        assert!(matches!(
            circuit.set_stop_time(0.0),
            Err(LcsimError::InvalidParameter { param: "stop time", .. })
        ));
        assert!(matches!(
            circuit.set_time_step(-1.0),
            Err(LcsimError::InvalidParameter { param: "time step", .. })
        ));
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
    }

    #[test]
    fn test_initialize_precedence_order() {
        // Empty circuit
        let mut circuit = LinearCircuit::new(4).unwrap();
        assert_eq!(circuit.initialize(), Err(LcsimError::NoComponents));

        // Components but no ground
        circuit.add_resistor(0, 1, 10.0).unwrap();
        assert_eq!(circuit.initialize(), Err(LcsimError::NoGround));

        // Ground present, stop time smaller than time step
        circuit.add_grounded_voltage_source(0, 1, 10.0, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(11.0).unwrap();
        assert_eq!(
            circuit.initialize(),
            Err(LcsimError::StopTimeTooSmall {
                stop_time: 10.0,
                time_step: 11.0
            })
        );

        // Non-condensed node identifiers
        circuit.set_time_step(1.0).unwrap();
        circuit.add_resistor(0, 6, 10.0).unwrap();
        assert_eq!(
            circuit.initialize(),
            Err(LcsimError::NodesNotCondensed { node: 2 })
        );
    }

    #[test]
    fn test_unconfigured_time_step_rejected() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        // Neither stop time nor time step were ever set
        assert_eq!(
            circuit.initialize(),
            Err(LcsimError::StopTimeTooSmall {
                stop_time: 0.0,
                time_step: 0.0
            })
        );
    }

    #[test]
    fn test_step_before_initialize() {
        let mut circuit = divider_circuit();
        assert_eq!(circuit.step(), Err(LcsimError::NotInitialized));
    }

    #[test]
    fn test_queries_before_first_step() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();

        assert_eq!(circuit.voltage(0), Err(LcsimError::NotSimulated));
        assert_eq!(circuit.current(0), Err(LcsimError::NotSimulated));

        circuit.initialize().unwrap();
        assert_eq!(circuit.voltage(0), Err(LcsimError::NotSimulated));
        assert_eq!(circuit.current(0), Err(LcsimError::NotSimulated));

        circuit.step().unwrap();
        assert!(circuit.voltage(0).is_ok());
        assert!(circuit.current(0).is_ok());
    }

    #[test]
    fn test_out_of_range_queries() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();

        // Out-of-range beats NotSimulated, independent of simulation state
        assert!(matches!(
            circuit.voltage(7),
            Err(LcsimError::OutOfRange { kind: "node", .. })
        ));
        assert!(matches!(
            circuit.current(8),
            Err(LcsimError::OutOfRange { kind: "component", .. })
        ));

        circuit.initialize().unwrap();
        circuit.step().unwrap();
        assert!(matches!(
            circuit.voltage(7),
            Err(LcsimError::OutOfRange { kind: "node", .. })
        ));
        assert!(matches!(
            circuit.current(8),
            Err(LcsimError::OutOfRange { kind: "component", .. })
        ));
    }

    #[test]
    fn test_current_on_empty_circuit_reports_count() {
        let circuit = LinearCircuit::new(1).unwrap();
        assert_eq!(
            circuit.current(0),
            Err(LcsimError::OutOfRange {
                kind: "component",
                index: 0,
                count: 0
            })
        );
    }

    #[test]
    fn test_floating_island_is_singular() {
        // Nodes 2 and 3 are condensed but form an island with no path to
        // ground, so the assembled matrix cannot be factored
        let mut circuit = LinearCircuit::new(3).unwrap();
        circuit.add_grounded_voltage_source(0, 1, 30.0, 10.0).unwrap();
        circuit.add_resistor(1, 0, 10.0).unwrap();
        circuit.add_resistor(2, 3, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();

        assert_eq!(circuit.initialize(), Err(LcsimError::Singular));
        assert!(!circuit.is_initialized());
    }

    #[test]
    fn test_sealed_after_initialize() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        // Two unknowns: three condensed nodes minus the ground
        let matrix = circuit.system_matrix().unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 2);

        assert_eq!(
            circuit.add_resistor(0, 1, 10.0),
            Err(LcsimError::AlreadyInitialized)
        );
        assert_eq!(
            circuit.add_capacitor(0, 1, 1.0),
            Err(LcsimError::AlreadyInitialized)
        );
        assert_eq!(circuit.set_stop_time(20.0), Err(LcsimError::AlreadyInitialized));
        assert_eq!(circuit.set_time_step(0.5), Err(LcsimError::AlreadyInitialized));
    }

    #[test]
    fn test_step_count_and_done_flag() {
        let mut circuit = LinearCircuit::new(4).unwrap();
        circuit.add_grounded_voltage_source(1, 2, 30.0, 10.0).unwrap();
        circuit.add_capacitor(1, 0, 10.0).unwrap();
        circuit.add_resistor(3, 2, 10.0).unwrap();
        circuit.add_inductor(4, 2, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        assert!(!circuit.step().unwrap(), "not done on the first step");
        let mut steps = 1;
        loop {
            let done = circuit.step().unwrap();
            steps += 1;
            if done {
                break;
            }
            assert!(steps < 20, "done flag never raised");
        }
        assert_eq!(steps, 10);
        assert_relative_eq!(circuit.time(), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_resistive_divider_scenario() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        assert_eq!(run_to_completion(&mut circuit), 10);
        assert_relative_eq!(circuit.time(), 10.0, max_relative = 1e-12);
        assert_relative_eq!(circuit.voltage(0).unwrap(), 10.0, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(1).unwrap(), 20.0, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(2).unwrap(), 0.0, epsilon = 1e-4);
        for index in 0..3 {
            assert_relative_eq!(circuit.current(index).unwrap(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_rc_charging_scenario() {
        let mut circuit = divider_circuit();
        circuit.add_capacitor(0, 2, 0.2).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        assert_eq!(run_to_completion(&mut circuit), 10);
        assert_relative_eq!(circuit.voltage(0).unwrap(), 27.2224, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(1).unwrap(), 28.6112, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(2).unwrap(), 0.0, epsilon = 1e-4);
        for index in 0..3 {
            assert_relative_eq!(circuit.current(index).unwrap(), 0.13888, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rl_scenario() {
        let mut circuit = divider_circuit();
        circuit.add_inductor(0, 2, 50.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        assert_eq!(run_to_completion(&mut circuit), 10);
        assert_relative_eq!(circuit.voltage(0).unwrap(), 0.6503, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(1).unwrap(), 15.3252, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(2).unwrap(), 0.0, epsilon = 1e-4);
        for index in 0..3 {
            assert_relative_eq!(circuit.current(index).unwrap(), 1.46748, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_ground_at_node_zero() {
        // Same divider with the ground on node 0 instead of the top id
        let mut circuit = LinearCircuit::new(3).unwrap();
        circuit.add_grounded_voltage_source(0, 1, 30.0, 10.0).unwrap();
        circuit.add_resistor(1, 2, 10.0).unwrap();
        circuit.add_resistor(2, 0, 10.0).unwrap();
        circuit.set_stop_time(10.0).unwrap();
        circuit.set_time_step(1.0).unwrap();
        circuit.initialize().unwrap();

        run_to_completion(&mut circuit);
        assert_relative_eq!(circuit.voltage(0).unwrap(), 0.0, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(1).unwrap(), 20.0, epsilon = 1e-4);
        assert_relative_eq!(circuit.voltage(2).unwrap(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_time_advances_by_time_step() {
        let mut circuit = divider_circuit();
        circuit.add_resistor(0, 2, 10.0).unwrap();
        circuit.set_stop_time(2.0).unwrap();
        circuit.set_time_step(0.5).unwrap();
        circuit.initialize().unwrap();

        assert_eq!(circuit.time(), 0.0);
        circuit.step().unwrap();
        assert_relative_eq!(circuit.time(), 0.5, max_relative = 1e-12);
        circuit.step().unwrap();
        assert_relative_eq!(circuit.time(), 1.0, max_relative = 1e-12);
    }
}
