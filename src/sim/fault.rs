use core::fmt;
use std::collections::HashSet;
use std::str::FromStr;

use crate::circuit::{Circuit, NetId, NetLabel};
use crate::errors::{Error, Result};
use crate::logic::Logic;
use crate::sim::eval::evaluate;

/// A single stuck-at fault, located on a net
///
/// Written and parsed as `<net>-sa-<0|1>`; the whitespace form `<net> <0|1>`
/// is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fault {
    /// Faulty net
    pub net: NetLabel,
    /// Stuck value (0 or 1)
    pub stuck_at: Logic,
}

impl Fault {
    /// Create a fault; the stuck value must be 0 or 1
    pub fn new(net: impl Into<NetLabel>, stuck_at: Logic) -> Fault {
        debug_assert!(stuck_at.is_binary());
        Fault {
            net: net.into(),
            stuck_at,
        }
    }

    /// Enumerate both polarities on every net of the circuit
    pub fn all(circuit: &Circuit) -> Vec<Fault> {
        let mut ret = Vec::with_capacity(2 * circuit.nb_nets());
        for net in 0..circuit.nb_nets() {
            ret.push(Fault::new(circuit.label(net).clone(), Logic::Zero));
            ret.push(Fault::new(circuit.label(net).clone(), Logic::One));
        }
        ret
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-sa-{}", self.net, self.stuck_at)
    }
}

impl FromStr for Fault {
    type Err = Error;

    fn from_str(s: &str) -> Result<Fault> {
        let s = s.trim();
        let (net, value) = s
            .rsplit_once("-sa-")
            .or_else(|| s.split_once(char::is_whitespace))
            .ok_or_else(|| Error::InvalidFault(s.to_string()))?;
        let stuck_at = match value.trim() {
            "0" => Logic::Zero,
            "1" => Logic::One,
            _ => return Err(Error::InvalidFault(s.to_string())),
        };
        let net = net.trim();
        if net.is_empty() {
            return Err(Error::InvalidFault(s.to_string()));
        }
        Ok(Fault::new(net, stuck_at))
    }
}

/// Deductive fault simulation: all faults detected by a test vector
///
/// The fault list of a primary input is its own opposite-polarity fault.
/// At each gate the input lists are combined with the controlling-value
/// rules: with no controlling input every input fault propagates; otherwise
/// only the faults seen on all controlling inputs and on no non-controlling
/// input make it through. The gate output contributes its own fault, and the
/// result is the union over the primary outputs.
///
/// The vector must be fully specified (no X).
pub fn detect_faults(circuit: &Circuit, vector: &[Logic]) -> Result<HashSet<Fault>> {
    if vector.iter().any(|v| !v.is_binary()) {
        return Err(Error::InvalidVector(
            "deductive fault simulation requires a fully specified binary vector".to_string(),
        ));
    }
    let assignment = evaluate(circuit, vector)?;
    let values = assignment.values();

    let mut lists: Vec<HashSet<(NetId, Logic)>> = vec![HashSet::new(); circuit.nb_nets()];
    for &net in circuit.inputs() {
        lists[net].insert((net, !values[net]));
    }
    for g in circuit.gates() {
        let control = g.kind.controlling();
        let (controlling, others): (Vec<NetId>, Vec<NetId>) = g
            .inputs
            .iter()
            .copied()
            .partition(|&j| control == Some(values[j]));
        let mut list: HashSet<(NetId, Logic)> = if controlling.is_empty() {
            g.inputs
                .iter()
                .flat_map(|&j| lists[j].iter().copied())
                .collect()
        } else {
            let mut common = lists[controlling[0]].clone();
            for &j in &controlling[1..] {
                common.retain(|f| lists[j].contains(f));
            }
            for &j in &others {
                common.retain(|f| !lists[j].contains(f));
            }
            common
        };
        list.insert((g.output, !values[g.output]));
        lists[g.output] = list;
    }

    let mut detected = HashSet::new();
    for &o in circuit.outputs() {
        for &(net, stuck_at) in &lists[o] {
            detected.insert(Fault::new(circuit.label(net).clone(), stuck_at));
        }
    }
    Ok(detected)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{detect_faults, Fault};
    use crate::io::{parse_vector, read_netlist};
    use crate::logic::Logic;

    fn faults(names: &[&str]) -> HashSet<Fault> {
        names.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn detected(circuit: &crate::Circuit, vector: &str) -> HashSet<Fault> {
        detect_faults(circuit, &parse_vector(vector).unwrap()).unwrap()
    }

    #[test]
    fn test_fault_parsing() {
        let f: Fault = "12-sa-0".parse().unwrap();
        assert_eq!(f, Fault::new("12", Logic::Zero));
        assert_eq!(f.to_string(), "12-sa-0");
        let f: Fault = "net3 1".parse().unwrap();
        assert_eq!(f, Fault::new("net3", Logic::One));
        assert_eq!(f.to_string(), "net3-sa-1");
        assert!("12-sa-2".parse::<Fault>().is_err());
        assert!("12".parse::<Fault>().is_err());
        assert!("-sa-1".parse::<Fault>().is_err());
    }

    #[test]
    fn test_and_gate() {
        let c = read_netlist("AND 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        assert_eq!(detected(&c, "00"), faults(&["3-sa-1"]));
        assert_eq!(detected(&c, "01"), faults(&["3-sa-1", "1-sa-1"]));
        assert_eq!(detected(&c, "10"), faults(&["3-sa-1", "2-sa-1"]));
        assert_eq!(detected(&c, "11"), faults(&["1-sa-0", "2-sa-0", "3-sa-0"]));
    }

    #[test]
    fn test_or_gate() {
        let c = read_netlist("OR 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        assert_eq!(detected(&c, "00"), faults(&["1-sa-1", "2-sa-1", "3-sa-1"]));
        assert_eq!(detected(&c, "01"), faults(&["2-sa-0", "3-sa-0"]));
        assert_eq!(detected(&c, "10"), faults(&["1-sa-0", "3-sa-0"]));
        assert_eq!(detected(&c, "11"), faults(&["3-sa-0"]));
    }

    #[test]
    fn test_nand_gate() {
        let c = read_netlist("NAND 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        assert_eq!(detected(&c, "00"), faults(&["3-sa-0"]));
        assert_eq!(detected(&c, "01"), faults(&["3-sa-0", "1-sa-1"]));
        assert_eq!(detected(&c, "10"), faults(&["3-sa-0", "2-sa-1"]));
        assert_eq!(detected(&c, "11"), faults(&["1-sa-0", "2-sa-0", "3-sa-1"]));
    }

    #[test]
    fn test_nor_gate() {
        let c = read_netlist("NOR 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        assert_eq!(detected(&c, "00"), faults(&["1-sa-1", "2-sa-1", "3-sa-0"]));
        assert_eq!(detected(&c, "01"), faults(&["2-sa-0", "3-sa-1"]));
        assert_eq!(detected(&c, "10"), faults(&["1-sa-0", "3-sa-1"]));
        assert_eq!(detected(&c, "11"), faults(&["3-sa-1"]));
    }

    #[test]
    fn test_inverter() {
        let c = read_netlist("INV 1 2\nINPUT 1 -1\nOUTPUT 2 -1\n".as_bytes()).unwrap();
        assert_eq!(detected(&c, "0"), faults(&["1-sa-1", "2-sa-0"]));
        assert_eq!(detected(&c, "1"), faults(&["1-sa-0", "2-sa-1"]));
    }

    #[test]
    fn test_c17() {
        let src = "\
NAND 1 3 10
NAND 3 6 11
NAND 2 11 16
NAND 11 7 19
NAND 10 16 22
NAND 16 19 23
INPUT 1 2 3 6 7 -1
OUTPUT 22 23 -1
";
        let c = read_netlist(src.as_bytes()).unwrap();
        let expected = faults(&[
            "1-sa-0", "3-sa-0", "6-sa-0", "10-sa-1", "11-sa-1", "16-sa-0", "19-sa-0", "22-sa-0",
            "23-sa-1",
        ]);
        assert_eq!(detected(&c, "10111"), expected);
        // Deterministic: the same vector always deduces the same set
        assert_eq!(detected(&c, "10111"), expected);
    }

    #[test]
    fn test_rejects_incomplete_vectors() {
        let c = read_netlist("AND 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        assert!(detect_faults(&c, &parse_vector("X1").unwrap()).is_err());
        assert!(detect_faults(&c, &parse_vector("1").unwrap()).is_err());
    }

    #[test]
    fn test_fault_universe() {
        let c = read_netlist("AND 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n".as_bytes()).unwrap();
        let all = Fault::all(&c);
        assert_eq!(all.len(), 6);
        assert!(all.contains(&Fault::new("3", Logic::One)));
    }
}
