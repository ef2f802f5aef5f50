use crate::circuit::{Circuit, GateKind, NetId};
use crate::errors::{Error, Result};
use crate::logic::Logic;

/// Value of every net, as produced by a full forward evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<Logic>,
}

impl Assignment {
    /// Value of a single net
    pub fn value(&self, net: NetId) -> Logic {
        self.values[net]
    }

    /// Values of all nets, indexed by net
    pub fn values(&self) -> &[Logic] {
        &self.values
    }

    /// Values of a selection of nets, e.g. the primary outputs
    pub fn project(&self, nets: &[NetId]) -> Vec<Logic> {
        nets.iter().map(|&n| self.values[n]).collect()
    }
}

/// Forward evaluation engine shared by the simulators and the test generator
///
/// The evaluator walks the gates in topological order and computes every net
/// value with the five-valued algebra. An optional target fault turns the
/// fault site into D or D̅ whenever its fault-free value matches the
/// excitation polarity; this is how the test generator sees the faulty
/// circuit without modifying it.
pub(crate) struct Evaluator<'a> {
    circuit: &'a Circuit,
    fault: Option<(NetId, Logic)>,
    values: Vec<Logic>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(circuit: &'a Circuit) -> Evaluator<'a> {
        Evaluator {
            circuit,
            fault: None,
            values: vec![Logic::X; circuit.nb_nets()],
        }
    }

    /// Evaluator injecting a D/D̅ at the site of the given stuck-at fault
    pub(crate) fn with_fault(circuit: &'a Circuit, site: NetId, stuck_at: Logic) -> Evaluator<'a> {
        debug_assert!(stuck_at.is_binary());
        Evaluator {
            circuit,
            fault: Some((site, stuck_at)),
            values: vec![Logic::X; circuit.nb_nets()],
        }
    }

    /// Run a full forward pass from the given primary input values
    pub(crate) fn run(&mut self, inputs: &[Logic]) {
        debug_assert_eq!(inputs.len(), self.circuit.nb_inputs());
        self.values.fill(Logic::X);
        for (&net, &v) in self.circuit.inputs().iter().zip(inputs) {
            self.assign(net, v);
        }
        for i in 0..self.circuit.nb_gates() {
            let out = self.circuit.gate(i).output;
            let v = self.eval_gate(i);
            self.assign(out, v);
        }
    }

    fn assign(&mut self, net: NetId, value: Logic) {
        let mut v = value;
        if let Some((site, stuck_at)) = self.fault {
            if net == site {
                v = match (value, stuck_at) {
                    (Logic::One, Logic::Zero) => Logic::D,
                    (Logic::Zero, Logic::One) => Logic::Dbar,
                    _ => value,
                };
            }
        }
        self.values[net] = v;
    }

    fn eval_gate(&self, i: usize) -> Logic {
        use GateKind::*;
        let g = self.circuit.gate(i);
        match g.kind {
            Buf => self.values[g.inputs[0]],
            Inv => !self.values[g.inputs[0]],
            And | Nand | Or | Nor => {
                let a = self.values[g.inputs[0]];
                let b = self.values[g.inputs[1]];
                let v = match g.kind {
                    And | Nand => a & b,
                    _ => a | b,
                };
                v.not_if(g.kind.inverts())
            }
        }
    }

    pub(crate) fn values(&self) -> &[Logic] {
        &self.values
    }

    fn into_values(self) -> Vec<Logic> {
        self.values
    }
}

fn check_length(circuit: &Circuit, inputs: &[Logic]) -> Result<()> {
    if inputs.len() != circuit.nb_inputs() {
        return Err(Error::InvalidVector(format!(
            "vector has {} value(s), circuit has {} primary input(s)",
            inputs.len(),
            circuit.nb_inputs()
        )));
    }
    Ok(())
}

/// Evaluate every net of the circuit from a primary-input assignment
///
/// Unassigned (X) inputs are allowed and propagate through the algebra.
/// Returns a fresh total assignment; the circuit is not modified.
pub fn evaluate(circuit: &Circuit, inputs: &[Logic]) -> Result<Assignment> {
    check_length(circuit, inputs)?;
    let mut eval = Evaluator::new(circuit);
    eval.run(inputs);
    Ok(Assignment {
        values: eval.into_values(),
    })
}

/// Fault-free simulation: return the primary output values for a vector
///
/// The vector may not contain D or D̅; X inputs propagate as unknowns.
pub fn simulate(circuit: &Circuit, inputs: &[Logic]) -> Result<Vec<Logic>> {
    if inputs.iter().any(Logic::is_error) {
        return Err(Error::InvalidVector(
            "fault-free simulation does not accept D or D̅ input values".to_string(),
        ));
    }
    let assignment = evaluate(circuit, inputs)?;
    Ok(assignment.project(circuit.outputs()))
}
