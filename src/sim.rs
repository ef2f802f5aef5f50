//! Simulation of a circuit under the five-valued algebra

mod eval;
mod fault;

pub use eval::{evaluate, simulate, Assignment};
pub use fault::{detect_faults, Fault};

pub(crate) use eval::Evaluator;
