//! Stuck-at fault analysis for combinational logic
//!
//! This crate provides the three classic operations of a test generation
//! flow under the single stuck-at fault model: fault-free simulation,
//! deductive fault simulation, and automatic test pattern generation with
//! the PODEM algorithm.
//!
//! # Usage and features
//!
//! Faultline provides a command line tool. To show available commands:
//! ```bash
//! faultline help
//! ```
//!
//! The `simulate` command computes primary-output values for test vectors:
//! ```bash
//! faultline simulate design.net 1110101
//! ```
//!
//! The `faults` command runs the deductive fault simulator and lists every
//! stuck-at fault detected by a vector:
//! ```bash
//! faultline faults design.net 1110101
//! ```
//!
//! The `generate` command searches for a vector detecting a specific fault,
//! or proves it undetectable:
//! ```bash
//! faultline generate design.net 6-sa-1
//! ```
//!
//! The `coverage` command measures how many faults random patterns detect
//! and completes the set with generated ones.
//!
//! # Development
//!
//! All three operations share a single datastructure, [`Circuit`], and a
//! single evaluation primitive over the five-valued algebra [`Logic`].
//! The circuit is a flat arena of nets and gates kept in topological order;
//! net names only exist at the boundary. Everything is deterministic: the
//! simulators are pure functions, and the PODEM search uses a fixed
//! first-unassigned-input choice rule.
//!
//! ```
//! use faultline::{Circuit, GateKind, Logic};
//! use faultline::sim::simulate;
//!
//! let mut builder = Circuit::builder();
//! builder
//!     .add_gate(GateKind::Nand, &["a".into(), "b".into()], "y".into())
//!     .unwrap();
//! builder.add_input(&"a".into()).unwrap();
//! builder.add_input(&"b".into()).unwrap();
//! builder.add_output(&"y".into()).unwrap();
//! let circuit = builder.build().unwrap();
//!
//! let outputs = simulate(&circuit, &[Logic::One, Logic::One]).unwrap();
//! assert_eq!(outputs, vec![Logic::Zero]);
//! ```

#![warn(missing_docs)]

pub mod atpg;
pub mod circuit;
pub mod cmd;
pub mod errors;
pub mod io;
pub mod logic;
pub mod podem;
pub mod sim;

pub use circuit::{Circuit, CircuitBuilder, Gate, GateKind, NetId, NetLabel};
pub use errors::{Error, Result};
pub use logic::Logic;
pub use sim::Fault;
