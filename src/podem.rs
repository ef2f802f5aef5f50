//! Path-oriented test pattern generation (PODEM)
//!
//! PODEM searches for a primary-input vector that excites a target stuck-at
//! fault and drives the resulting discrepancy to a primary output. The
//! search tree branches only on primary inputs: each decision is implied
//! forward with the shared five-valued evaluator, and a failed subtree is
//! undone by simply restoring the input to X. A fault is reported
//! undetectable once both polarities of every reached decision have been
//! exhausted, which makes the search complete.

use log::debug;

use crate::circuit::{Circuit, NetId};
use crate::errors::{Error, Result};
use crate::logic::Logic;
use crate::sim::{Evaluator, Fault};

/// PODEM test generator for a fixed circuit
///
/// The generator itself is stateless between calls; tests for several
/// faults can be produced from the same instance.
pub struct TestGenerator<'a> {
    circuit: &'a Circuit,
}

impl<'a> TestGenerator<'a> {
    /// Create a test generator for the circuit
    pub fn new(circuit: &'a Circuit) -> TestGenerator<'a> {
        TestGenerator { circuit }
    }

    /// Find a primary-input vector detecting the given fault
    ///
    /// Unassigned inputs are returned as X. `None` means the search space
    /// is exhausted and the fault is undetectable.
    pub fn generate_test(&self, fault: &Fault) -> Result<Option<Vec<Logic>>> {
        let site = self
            .circuit
            .net(&fault.net)
            .ok_or_else(|| Error::UnknownNet(fault.net.to_string()))?;
        debug!("generating test for {}", fault);
        let mut search = Search::new(self.circuit, site, fault.stuck_at);
        search.imply();
        if search.podem() {
            Ok(Some(search.pi_values))
        } else {
            Ok(None)
        }
    }
}

/// State of one PODEM run: the current input assignment and its implications
struct Search<'a> {
    circuit: &'a Circuit,
    site: NetId,
    stuck_at: Logic,
    pi_values: Vec<Logic>,
    values: Vec<Logic>,
    /// Gates with an X output and a D/D̅ input, in topological order
    frontier: Vec<usize>,
    is_output: Vec<bool>,
}

impl<'a> Search<'a> {
    fn new(circuit: &'a Circuit, site: NetId, stuck_at: Logic) -> Search<'a> {
        let mut is_output = vec![false; circuit.nb_nets()];
        for &o in circuit.outputs() {
            is_output[o] = true;
        }
        Search {
            circuit,
            site,
            stuck_at,
            pi_values: vec![Logic::X; circuit.nb_inputs()],
            values: vec![Logic::X; circuit.nb_nets()],
            frontier: Vec::new(),
            is_output,
        }
    }

    /// Recursive decision procedure; true on success
    fn podem(&mut self) -> bool {
        if self.success() {
            return true;
        }
        if self.failure() {
            return false;
        }
        let (net, value) = self.objective();
        let (pi, value) = self.backtrace(net, value);
        self.decide(pi, value);
        if self.podem() {
            return true;
        }
        debug!(
            "backtracking on input {}",
            self.circuit.label(self.circuit.inputs()[pi])
        );
        self.decide(pi, !value);
        if self.podem() {
            return true;
        }
        self.decide(pi, Logic::X);
        false
    }

    /// Assign a primary input and recompute all implications
    fn decide(&mut self, pi: usize, value: Logic) {
        self.pi_values[pi] = value;
        self.imply();
    }

    /// Re-run the evaluator and rebuild the D-frontier
    fn imply(&mut self) {
        let mut eval = Evaluator::with_fault(self.circuit, self.site, self.stuck_at);
        eval.run(&self.pi_values);
        self.values.clear();
        self.values.extend_from_slice(eval.values());
        self.frontier.clear();
        for (i, g) in self.circuit.gates().iter().enumerate() {
            if self.values[g.output] == Logic::X
                && g.inputs.iter().any(|&j| self.values[j].is_error())
            {
                self.frontier.push(i);
            }
        }
    }

    /// The fault effect reached a primary output
    fn success(&self) -> bool {
        self.circuit
            .outputs()
            .iter()
            .any(|&o| self.values[o].is_error())
    }

    /// The current assignment can no longer detect the fault
    fn failure(&self) -> bool {
        let site = self.values[self.site];
        if site == self.stuck_at {
            // The site is forced to its stuck value: excitation is impossible
            return true;
        }
        if site == Logic::X {
            return false;
        }
        // Fault activated: it must still have somewhere to go
        self.frontier.is_empty() || !self.has_x_path()
    }

    /// Next (net, value) goal: excite the fault, then push it forward
    fn objective(&self) -> (NetId, Logic) {
        if self.values[self.site] == Logic::X {
            return (self.site, !self.stuck_at);
        }
        let g = self.circuit.gate(self.frontier[0]);
        let j = g
            .inputs
            .iter()
            .copied()
            .find(|&j| self.values[j] == Logic::X)
            .unwrap();
        (j, !g.kind.controlling().unwrap())
    }

    /// Walk the objective back to an unassigned primary input
    ///
    /// Follows X-valued nets through gate drivers, complementing the desired
    /// value at each inverting gate. Returns the input position and value.
    fn backtrace(&self, mut net: NetId, mut value: Logic) -> (usize, Logic) {
        while let Some(gi) = self.circuit.driver(net) {
            let g = self.circuit.gate(gi);
            if g.kind.inverts() {
                value = !value;
            }
            net = g
                .inputs
                .iter()
                .copied()
                .find(|&j| self.values[j] == Logic::X)
                .unwrap();
        }
        (self.circuit.input_position(net).unwrap(), value)
    }

    /// Reachability over X-valued nets from the D-frontier to an output
    fn has_x_path(&self) -> bool {
        let mut seen = vec![false; self.circuit.nb_nets()];
        let mut stack: Vec<NetId> = self
            .frontier
            .iter()
            .map(|&g| self.circuit.gate(g).output)
            .collect();
        while let Some(net) = stack.pop() {
            if seen[net] {
                continue;
            }
            seen[net] = true;
            if self.is_output[net] {
                return true;
            }
            for &g in self.circuit.fanouts(net) {
                let out = self.circuit.gate(g).output;
                if self.values[out] == Logic::X && !seen[out] {
                    stack.push(out);
                }
            }
        }
        false
    }
}
