//! Error types shared across the crate

use thiserror::Error;

/// Result type for all fallible operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or exercising a circuit
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed netlist text (bad line, unknown gate kind, missing terminator)
    #[error("netlist parse error: {0}")]
    NetlistParse(String),

    /// Structurally invalid circuit (duplicate driver, cycle, arity mismatch, ...)
    #[error("invalid circuit: {0}")]
    CircuitStructure(String),

    /// Input vector that does not fit the circuit or the operation
    #[error("invalid vector: {0}")]
    InvalidVector(String),

    /// Reference to a net that does not exist in the circuit
    #[error("unknown net '{0}'")]
    UnknownNet(String),

    /// Malformed fault description
    #[error("invalid fault '{0}': expected <net>-sa-<0|1>")]
    InvalidFault(String),

    /// I/O error while reading a netlist or argument file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
