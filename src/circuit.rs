//! Circuit representation for fault analysis
//!
//! A [`Circuit`] is a static description of combinational logic: an arena of
//! nets addressed by dense indices, a list of gates kept in topological
//! order, and the ordered primary inputs and outputs. Net names from the
//! netlist are kept as [`NetLabel`] and resolved once at construction, so
//! the simulation and search algorithms only ever touch indices.
//!
//! Circuits are built through [`CircuitBuilder`], which validates the
//! structure (single driver per net, no combinational loop, known nets,
//! gate arity) and fixes the gate order with a deterministic topological
//! sort. After that the circuit is immutable.

use core::fmt;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::errors::{Error, Result};
use crate::logic::Logic;

/// Dense index of a net inside a [`Circuit`]
pub type NetId = usize;

/// Name of a net as written in a netlist
///
/// Integer labels are common in the ISCAS-style benchmarks and compare
/// numerically; any other alphanumeric token is kept as a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetLabel {
    /// Numeric label, ordered numerically
    Num(i64),
    /// Symbolic label, ordered lexicographically after all numeric labels
    Name(String),
}

impl NetLabel {
    /// Interpret a netlist token as a label
    pub fn parse(token: &str) -> NetLabel {
        match token.parse::<i64>() {
            Ok(n) => NetLabel::Num(n),
            Err(_) => NetLabel::Name(token.to_string()),
        }
    }
}

impl From<&str> for NetLabel {
    fn from(s: &str) -> NetLabel {
        NetLabel::parse(s)
    }
}

impl From<i64> for NetLabel {
    fn from(n: i64) -> NetLabel {
        NetLabel::Num(n)
    }
}

impl fmt::Display for NetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetLabel::Num(n) => write!(f, "{}", n),
            NetLabel::Name(s) => write!(f, "{}", s),
        }
    }
}

/// Supported gate kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// 2-input And gate
    And,
    /// 2-input Nand gate
    Nand,
    /// 2-input Or gate
    Or,
    /// 2-input Nor gate
    Nor,
    /// Buffer
    Buf,
    /// Inverter
    Inv,
}

impl GateKind {
    /// Number of inputs for this kind of gate
    pub fn arity(self) -> usize {
        match self {
            GateKind::Buf | GateKind::Inv => 1,
            _ => 2,
        }
    }

    /// Input value that forces the output regardless of the other input
    ///
    /// 0 for And/Nand, 1 for Or/Nor; Buf and Inv have none.
    pub fn controlling(self) -> Option<Logic> {
        match self {
            GateKind::And | GateKind::Nand => Some(Logic::Zero),
            GateKind::Or | GateKind::Nor => Some(Logic::One),
            GateKind::Buf | GateKind::Inv => None,
        }
    }

    /// Returns whether the gate complements its output
    pub fn inverts(self) -> bool {
        matches!(self, GateKind::Nand | GateKind::Nor | GateKind::Inv)
    }

    /// Match a netlist keyword to a gate kind
    pub fn from_keyword(kw: &str) -> Option<GateKind> {
        match kw {
            "AND" => Some(GateKind::And),
            "NAND" => Some(GateKind::Nand),
            "OR" => Some(GateKind::Or),
            "NOR" => Some(GateKind::Nor),
            "BUF" => Some(GateKind::Buf),
            "INV" => Some(GateKind::Inv),
            _ => None,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kw = match self {
            GateKind::And => "AND",
            GateKind::Nand => "NAND",
            GateKind::Or => "OR",
            GateKind::Nor => "NOR",
            GateKind::Buf => "BUF",
            GateKind::Inv => "INV",
        };
        write!(f, "{}", kw)
    }
}

/// A single logic gate: kind, ordered input nets and the driven net
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    /// Gate kind
    pub kind: GateKind,
    /// Input nets, in declaration order
    pub inputs: Vec<NetId>,
    /// Output net
    pub output: NetId,
}

/// An immutable combinational circuit
#[derive(Debug, Clone)]
pub struct Circuit {
    labels: Vec<NetLabel>,
    index: HashMap<NetLabel, NetId>,
    gates: Vec<Gate>,
    driver: Vec<Option<usize>>,
    fanouts: Vec<Vec<usize>>,
    inputs: Vec<NetId>,
    input_pos: Vec<Option<usize>>,
    outputs: Vec<NetId>,
}

impl Circuit {
    /// Start building a new circuit
    pub fn builder() -> CircuitBuilder {
        CircuitBuilder::default()
    }

    /// Return the number of nets
    pub fn nb_nets(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of gates
    pub fn nb_gates(&self) -> usize {
        self.gates.len()
    }

    /// Return the number of primary inputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Return the number of primary outputs
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Get the gate at index i in topological order
    pub fn gate(&self, i: usize) -> &Gate {
        &self.gates[i]
    }

    /// All gates, topologically ordered from inputs to outputs
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Primary input nets, in vector order
    pub fn inputs(&self) -> &[NetId] {
        &self.inputs
    }

    /// Primary output nets, in declaration order
    pub fn outputs(&self) -> &[NetId] {
        &self.outputs
    }

    /// Label of a net
    pub fn label(&self, net: NetId) -> &NetLabel {
        &self.labels[net]
    }

    /// Resolve a label to its net, if present
    pub fn net(&self, label: &NetLabel) -> Option<NetId> {
        self.index.get(label).copied()
    }

    /// Index of the gate driving a net; None for primary inputs
    pub fn driver(&self, net: NetId) -> Option<usize> {
        self.driver[net]
    }

    /// Indices of the gates consuming a net
    pub fn fanouts(&self, net: NetId) -> &[usize] {
        &self.fanouts[net]
    }

    /// Returns whether a net is a primary input
    pub fn is_input(&self, net: NetId) -> bool {
        self.input_pos[net].is_some()
    }

    /// Position of a net in the input vector, if it is a primary input
    pub fn input_position(&self, net: NetId) -> Option<usize> {
        self.input_pos[net]
    }

    /// Returns whether the gate list is a valid topological order
    pub(crate) fn is_topo_sorted(&self) -> bool {
        let mut placed = vec![false; self.nb_nets()];
        for &i in &self.inputs {
            placed[i] = true;
        }
        for g in &self.gates {
            if !g.inputs.iter().all(|&j| placed[j]) {
                return false;
            }
            placed[g.output] = true;
        }
        true
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit with {} inputs, {} outputs, {} gates:",
            self.nb_inputs(),
            self.nb_outputs(),
            self.nb_gates()
        )?;
        for g in &self.gates {
            let ins = g
                .inputs
                .iter()
                .map(|&j| self.label(j).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "\t{} = {}({})", self.label(g.output), g.kind, ins)?;
        }
        Ok(())
    }
}

/// Incremental circuit construction with structural validation
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    labels: Vec<NetLabel>,
    index: HashMap<NetLabel, NetId>,
    gates: Vec<Gate>,
    driver: Vec<Option<usize>>,
    inputs: Vec<NetId>,
    outputs: Vec<NetId>,
}

impl CircuitBuilder {
    /// Create an empty builder
    pub fn new() -> CircuitBuilder {
        CircuitBuilder::default()
    }

    fn intern(&mut self, label: &NetLabel) -> NetId {
        if let Some(&net) = self.index.get(label) {
            return net;
        }
        let net = self.labels.len();
        self.labels.push(label.clone());
        self.index.insert(label.clone(), net);
        self.driver.push(None);
        net
    }

    /// Declare a gate; nets are created on first use
    pub fn add_gate(
        &mut self,
        kind: GateKind,
        inputs: &[NetLabel],
        output: NetLabel,
    ) -> Result<()> {
        if inputs.len() != kind.arity() {
            return Err(Error::CircuitStructure(format!(
                "{} gate expects {} input(s), got {}",
                kind,
                kind.arity(),
                inputs.len()
            )));
        }
        let input_nets: Vec<NetId> = inputs.iter().map(|l| self.intern(l)).collect();
        let out = self.intern(&output);
        if self.driver[out].is_some() {
            return Err(Error::CircuitStructure(format!(
                "net '{}' is driven by more than one gate",
                output
            )));
        }
        if self.inputs.contains(&out) {
            return Err(Error::CircuitStructure(format!(
                "net '{}' is a primary input and cannot be driven by a gate",
                output
            )));
        }
        self.driver[out] = Some(self.gates.len());
        self.gates.push(Gate {
            kind,
            inputs: input_nets,
            output: out,
        });
        Ok(())
    }

    /// Declare the next primary input; the net must already appear in a gate
    pub fn add_input(&mut self, label: &NetLabel) -> Result<()> {
        let net = self
            .index
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownNet(label.to_string()))?;
        if self.driver[net].is_some() {
            return Err(Error::CircuitStructure(format!(
                "primary input '{}' conflicts with a gate output",
                label
            )));
        }
        if self.inputs.contains(&net) {
            return Err(Error::CircuitStructure(format!(
                "primary input '{}' declared twice",
                label
            )));
        }
        self.inputs.push(net);
        Ok(())
    }

    /// Declare a primary output; the net must already appear in a gate
    pub fn add_output(&mut self, label: &NetLabel) -> Result<()> {
        let net = self
            .index
            .get(label)
            .copied()
            .ok_or_else(|| Error::UnknownNet(label.to_string()))?;
        self.outputs.push(net);
        Ok(())
    }

    /// Validate the structure and freeze the circuit
    ///
    /// Gates are reordered topologically from inputs to outputs; ties are
    /// broken by declaration order so the result is deterministic.
    pub fn build(self) -> Result<Circuit> {
        let nb_nets = self.labels.len();
        let mut is_input = vec![false; nb_nets];
        for &i in &self.inputs {
            is_input[i] = true;
        }
        for net in 0..nb_nets {
            if self.driver[net].is_none() && !is_input[net] {
                return Err(Error::CircuitStructure(format!(
                    "net '{}' has no driver and is not a primary input",
                    self.labels[net]
                )));
            }
        }

        // Kahn's algorithm over gates, popping the smallest declaration index
        let mut count_deps = vec![0usize; self.gates.len()];
        let mut consumers = vec![Vec::new(); self.gates.len()];
        for (i, g) in self.gates.iter().enumerate() {
            for &j in &g.inputs {
                if let Some(d) = self.driver[j] {
                    count_deps[i] += 1;
                    consumers[d].push(i);
                }
            }
        }
        let mut ready: BinaryHeap<Reverse<usize>> = (0..self.gates.len())
            .filter(|&i| count_deps[i] == 0)
            .map(Reverse)
            .collect();
        let mut order = Vec::with_capacity(self.gates.len());
        while let Some(Reverse(i)) = ready.pop() {
            order.push(i);
            for &c in &consumers[i] {
                count_deps[c] -= 1;
                if count_deps[c] == 0 {
                    ready.push(Reverse(c));
                }
            }
        }
        if order.len() != self.gates.len() {
            return Err(Error::CircuitStructure(
                "combinational loop detected".to_string(),
            ));
        }

        let gates: Vec<Gate> = order.into_iter().map(|i| self.gates[i].clone()).collect();
        let mut driver = vec![None; nb_nets];
        let mut fanouts = vec![Vec::new(); nb_nets];
        for (i, g) in gates.iter().enumerate() {
            driver[g.output] = Some(i);
            for &j in &g.inputs {
                fanouts[j].push(i);
            }
        }
        let mut input_pos = vec![None; nb_nets];
        for (pos, &net) in self.inputs.iter().enumerate() {
            input_pos[net] = Some(pos);
        }

        let circuit = Circuit {
            labels: self.labels,
            index: self.index,
            gates,
            driver,
            fanouts,
            inputs: self.inputs,
            input_pos,
            outputs: self.outputs,
        };
        debug_assert!(circuit.is_topo_sorted());
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::{Circuit, GateKind, NetLabel};
    use crate::errors::Error;

    fn label(s: &str) -> NetLabel {
        NetLabel::parse(s)
    }

    #[test]
    fn test_build_basic() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::Inv, &[label("1")], label("4")).unwrap();
        b.add_gate(GateKind::Nand, &[label("2"), label("3")], label("5"))
            .unwrap();
        b.add_gate(GateKind::Or, &[label("4"), label("5")], label("6"))
            .unwrap();
        for i in ["1", "2", "3"] {
            b.add_input(&label(i)).unwrap();
        }
        b.add_output(&label("5")).unwrap();
        b.add_output(&label("6")).unwrap();
        let c = b.build().unwrap();

        assert_eq!(c.nb_nets(), 6);
        assert_eq!(c.nb_gates(), 3);
        assert_eq!(c.nb_inputs(), 3);
        assert_eq!(c.nb_outputs(), 2);
        assert!(c.is_topo_sorted());

        let n4 = c.net(&label("4")).unwrap();
        let n1 = c.net(&label("1")).unwrap();
        assert!(c.is_input(n1));
        assert_eq!(c.input_position(n1), Some(0));
        assert!(!c.is_input(n4));
        assert_eq!(c.gate(c.driver(n4).unwrap()).kind, GateKind::Inv);
        assert_eq!(c.fanouts(n4).len(), 1);
        assert_eq!(c.net(&label("99")), None);
    }

    #[test]
    fn test_topo_sort_declaration_order() {
        // Gates declared backwards; the sort must still find a valid order
        // and break ties deterministically
        let mut b = Circuit::builder();
        b.add_gate(GateKind::Or, &[label("c"), label("d")], label("out"))
            .unwrap();
        b.add_gate(GateKind::And, &[label("a"), label("b")], label("c"))
            .unwrap();
        b.add_gate(GateKind::Inv, &[label("a")], label("d")).unwrap();
        b.add_input(&label("a")).unwrap();
        b.add_input(&label("b")).unwrap();
        b.add_output(&label("out")).unwrap();
        let c = b.build().unwrap();
        assert!(c.is_topo_sorted());
        // Both leaf gates precede the Or; the And was declared first
        assert_eq!(c.gate(0).kind, GateKind::And);
        assert_eq!(c.gate(1).kind, GateKind::Inv);
        assert_eq!(c.gate(2).kind, GateKind::Or);
    }

    #[test]
    fn test_duplicate_driver() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::And, &[label("a"), label("b")], label("c"))
            .unwrap();
        let err = b
            .add_gate(GateKind::Or, &[label("a"), label("b")], label("c"))
            .unwrap_err();
        assert!(matches!(err, Error::CircuitStructure(_)));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut b = Circuit::builder();
        let err = b
            .add_gate(GateKind::Inv, &[label("a"), label("b")], label("c"))
            .unwrap_err();
        assert!(matches!(err, Error::CircuitStructure(_)));
        let err = b
            .add_gate(GateKind::And, &[label("a")], label("c"))
            .unwrap_err();
        assert!(matches!(err, Error::CircuitStructure(_)));
    }

    #[test]
    fn test_unknown_net() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::And, &[label("a"), label("b")], label("c"))
            .unwrap();
        assert!(matches!(
            b.add_input(&label("z")).unwrap_err(),
            Error::UnknownNet(_)
        ));
        assert!(matches!(
            b.add_output(&label("z")).unwrap_err(),
            Error::UnknownNet(_)
        ));
    }

    #[test]
    fn test_cycle() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::And, &[label("a"), label("y")], label("x"))
            .unwrap();
        b.add_gate(GateKind::Or, &[label("x"), label("a")], label("y"))
            .unwrap();
        b.add_input(&label("a")).unwrap();
        b.add_output(&label("y")).unwrap();
        let err = b.build().unwrap_err();
        assert!(matches!(err, Error::CircuitStructure(_)));
    }

    #[test]
    fn test_floating_net() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::And, &[label("a"), label("b")], label("c"))
            .unwrap();
        b.add_input(&label("a")).unwrap();
        b.add_output(&label("c")).unwrap();
        // "b" is neither driven nor declared as an input
        let err = b.build().unwrap_err();
        assert!(matches!(err, Error::CircuitStructure(_)));
    }

    #[test]
    fn test_input_conflicts_with_driver() {
        let mut b = Circuit::builder();
        b.add_gate(GateKind::Inv, &[label("a")], label("b")).unwrap();
        b.add_input(&label("a")).unwrap();
        assert!(matches!(
            b.add_input(&label("b")).unwrap_err(),
            Error::CircuitStructure(_)
        ));
    }

    #[test]
    fn test_label_ordering() {
        let mut labels = vec![
            NetLabel::parse("net2"),
            NetLabel::parse("10"),
            NetLabel::parse("2"),
            NetLabel::parse("net10"),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                NetLabel::Num(2),
                NetLabel::Num(10),
                NetLabel::Name("net10".to_string()),
                NetLabel::Name("net2".to_string()),
            ]
        );
    }
}
