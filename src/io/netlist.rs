//! IO for the line-oriented netlist format

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::circuit::{Circuit, GateKind, NetLabel};
use crate::errors::{Error, Result};

/// Parse a netlist from a reader
///
/// The format describes one gate per line, followed by the primary input
/// and output declarations, both terminated by `-1`:
/// ```text
///     # This is a comment
///     INV 1 4
///     NAND 2 3 5
///     OR 4 5 6
///     INPUT 1 2 3 -1
///     OUTPUT 5 6 -1
/// ```
/// Multiple INPUT or OUTPUT lines concatenate in order. Labels may be any
/// alphanumeric token; integer labels are common in the ISCAS benchmarks.
pub fn read_netlist<R: Read>(r: R) -> Result<Circuit> {
    let mut builder = Circuit::builder();
    for (i, line) in BufReader::new(r).lines().enumerate() {
        let line = line?;
        let text = line.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let keyword = tokens[0].to_uppercase();
        match keyword.as_str() {
            "INPUT" | "OUTPUT" => {
                let Some((&last, labels)) = tokens[1..].split_last() else {
                    return Err(Error::NetlistParse(format!(
                        "line {}: empty {} declaration",
                        i + 1,
                        keyword
                    )));
                };
                if last != "-1" {
                    return Err(Error::NetlistParse(format!(
                        "line {}: {} declaration must be terminated with -1",
                        i + 1,
                        keyword
                    )));
                }
                for t in labels {
                    let label = NetLabel::parse(t);
                    if keyword == "INPUT" {
                        builder.add_input(&label)?;
                    } else {
                        builder.add_output(&label)?;
                    }
                }
            }
            _ => {
                let Some(kind) = GateKind::from_keyword(&keyword) else {
                    return Err(Error::NetlistParse(format!(
                        "line {}: unknown gate kind '{}'",
                        i + 1,
                        tokens[0]
                    )));
                };
                let labels: Vec<NetLabel> =
                    tokens[1..].iter().map(|t| NetLabel::parse(t)).collect();
                let Some((output, inputs)) = labels.split_last() else {
                    return Err(Error::NetlistParse(format!(
                        "line {}: {} gate without nets",
                        i + 1,
                        kind
                    )));
                };
                builder.add_gate(kind, inputs, output.clone())?;
            }
        }
    }
    builder.build()
}

/// Read a netlist from a file
pub fn read_netlist_file(path: &Path) -> Result<Circuit> {
    let f = File::open(path)?;
    read_netlist(f)
}

#[cfg(test)]
mod tests {
    use super::read_netlist;
    use crate::errors::Error;

    #[test]
    fn test_read_basic() {
        let src = "\
# A small example
INV 1 4   # trailing comment
NAND 2 3 5

OR 4 5 6
INPUT 1 2 -1
INPUT 3 -1
OUTPUT 5 6 -1
";
        let c = read_netlist(src.as_bytes()).unwrap();
        assert_eq!(c.nb_inputs(), 3);
        assert_eq!(c.nb_outputs(), 2);
        assert_eq!(c.nb_gates(), 3);
        assert_eq!(c.nb_nets(), 6);
        // Input order follows the concatenated INPUT declarations
        let order: Vec<String> = c
            .inputs()
            .iter()
            .map(|&n| c.label(n).to_string())
            .collect();
        assert_eq!(order, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_named_nets() {
        let src = "\
NAND a b e
NOR b c f
AND d f g
INPUT a b c d -1
OUTPUT e g -1
";
        let c = read_netlist(src.as_bytes()).unwrap();
        assert_eq!(c.nb_nets(), 7);
        assert!(c.net(&"g".into()).is_some());
    }

    #[test]
    fn test_unknown_gate_kind() {
        let src = "XOR 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n";
        let err = read_netlist(src.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::NetlistParse(_)));
    }

    #[test]
    fn test_missing_terminator() {
        let src = "AND 1 2 3\nINPUT 1 2\nOUTPUT 3 -1\n";
        let err = read_netlist(src.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::NetlistParse(_)));
    }

    #[test]
    fn test_structural_errors_bubble() {
        // Duplicate driver
        let src = "AND 1 2 3\nOR 1 2 3\nINPUT 1 2 -1\nOUTPUT 3 -1\n";
        assert!(matches!(
            read_netlist(src.as_bytes()).unwrap_err(),
            Error::CircuitStructure(_)
        ));
        // Arity mismatch
        let src = "AND 1 2 4 3\nINPUT 1 2 4 -1\nOUTPUT 3 -1\n";
        assert!(matches!(
            read_netlist(src.as_bytes()).unwrap_err(),
            Error::CircuitStructure(_)
        ));
        // INPUT references a net that appears in no gate
        let src = "AND 1 2 3\nINPUT 1 2 9 -1\nOUTPUT 3 -1\n";
        assert!(matches!(
            read_netlist(src.as_bytes()).unwrap_err(),
            Error::UnknownNet(_)
        ));
    }
}
