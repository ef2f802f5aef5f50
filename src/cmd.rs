//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use itertools::Itertools;

use crate::atpg::compute_fault_coverage;
use crate::errors::{Error, Result};
use crate::io::{parse_vector, read_args_file, read_netlist_file, vector_string};
use crate::podem::TestGenerator;
use crate::sim::{detect_faults, simulate, Fault};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show a circuit and its statistics
    #[clap()]
    Show(ShowArgs),

    /// Fault-free simulation of test vectors
    ///
    /// Each vector has one character per primary input, in the order of the
    /// INPUT declarations: 0, 1 or X.
    #[clap(alias = "sim")]
    Simulate(SimulateArgs),

    /// List the stuck-at faults detected by test vectors
    ///
    /// Runs the deductive fault simulator: a single pass per vector yields
    /// every fault observable at a primary output. Vectors must be fully
    /// specified (no X).
    #[clap()]
    Faults(FaultsArgs),

    /// Generate a test vector for given stuck-at faults
    ///
    /// Runs the PODEM branch-and-bound search for each fault, written as
    /// <net>-sa-<0|1>. Prints UNDETECTABLE when the search proves that no
    /// vector can detect the fault.
    #[clap(alias = "gen")]
    Generate(GenerateArgs),

    /// Fault coverage of random patterns completed by targeted ones
    #[clap()]
    Coverage(CoverageArgs),
}

impl Commands {
    /// Run the selected command
    pub fn run(&self) -> Result<()> {
        match self {
            Commands::Show(a) => a.run(),
            Commands::Simulate(a) => a.run(),
            Commands::Faults(a) => a.run(),
            Commands::Generate(a) => a.run(),
            Commands::Coverage(a) => a.run(),
        }
    }
}

fn gather_args(inline: &[String], file: &Option<PathBuf>) -> Result<Vec<String>> {
    let mut ret = inline.to_vec();
    if let Some(path) = file {
        ret.extend(read_args_file(path)?);
    }
    Ok(ret)
}

fn column_width(items: &[String], header: &str) -> usize {
    items
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

/// Command arguments for circuit display
#[derive(Args)]
pub struct ShowArgs {
    /// Netlist file of the circuit
    network: PathBuf,
}

impl ShowArgs {
    /// Run the command
    pub fn run(&self) -> Result<()> {
        let circuit = read_netlist_file(&self.network)?;
        print!("{}", circuit);
        println!(
            "\tinputs: {}",
            circuit
                .inputs()
                .iter()
                .map(|&n| circuit.label(n).to_string())
                .join(" ")
        );
        println!(
            "\toutputs: {}",
            circuit
                .outputs()
                .iter()
                .map(|&n| circuit.label(n).to_string())
                .join(" ")
        );
        Ok(())
    }
}

/// Command arguments for fault-free simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Netlist file of the circuit
    network: PathBuf,

    /// Input vectors to simulate
    vectors: Vec<String>,

    /// File with additional input vectors, one per line
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,
}

impl SimulateArgs {
    /// Run the command
    pub fn run(&self) -> Result<()> {
        let circuit = read_netlist_file(&self.network)?;
        let vectors = gather_args(&self.vectors, &self.file)?;
        println!("Circuit: {}", self.network.display());
        let width = column_width(&vectors, "Inputs");
        println!("{:<width$} | Outputs", "Inputs");
        for v in &vectors {
            let outputs = simulate(&circuit, &parse_vector(v)?)?;
            println!("{:<width$} | {}", v, vector_string(&outputs));
        }
        Ok(())
    }
}

/// Command arguments for deductive fault simulation
#[derive(Args)]
pub struct FaultsArgs {
    /// Netlist file of the circuit
    network: PathBuf,

    /// Test vectors to apply
    vectors: Vec<String>,

    /// File with additional test vectors, one per line
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,
}

impl FaultsArgs {
    /// Run the command
    pub fn run(&self) -> Result<()> {
        let circuit = read_netlist_file(&self.network)?;
        let vectors = gather_args(&self.vectors, &self.file)?;
        println!("Circuit: {}", self.network.display());
        for v in &vectors {
            let faults = detect_faults(&circuit, &parse_vector(v)?)?;
            println!("Input vector: {}", v);
            println!("------ Detected faults ({}) ------", faults.len());
            for fault in faults.into_iter().sorted() {
                println!("{}", fault);
            }
            println!();
        }
        Ok(())
    }
}

/// Command arguments for test generation
#[derive(Args)]
pub struct GenerateArgs {
    /// Netlist file of the circuit
    network: PathBuf,

    /// Faults to generate tests for (e.g. 5-sa-0)
    faults: Vec<String>,

    /// File with additional faults, one per line
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,
}

impl GenerateArgs {
    /// Run the command
    pub fn run(&self) -> Result<()> {
        let circuit = read_netlist_file(&self.network)?;
        let args = gather_args(&self.faults, &self.file)?;
        let faults: Vec<Fault> = args
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Fault>>>()?;
        let gen = TestGenerator::new(&circuit);
        println!("Circuit: {}", self.network.display());
        let names: Vec<String> = faults.iter().map(|f| f.to_string()).collect();
        let width = column_width(&names, "Fault");
        println!("{:<width$} | Test", "Fault");
        for fault in faults.into_iter().sorted() {
            let result = match gen.generate_test(&fault) {
                Ok(Some(test)) => vector_string(&test),
                Ok(None) => "UNDETECTABLE".to_string(),
                Err(Error::UnknownNet(_)) => "NON-EXISTENT".to_string(),
                Err(err) => return Err(err),
            };
            println!("{:<width$} | {}", fault.to_string(), result);
        }
        Ok(())
    }
}

/// Command arguments for fault coverage
#[derive(Args)]
pub struct CoverageArgs {
    /// Netlist file of the circuit
    network: PathBuf,

    /// Random seed for pattern generation
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl CoverageArgs {
    /// Run the command
    pub fn run(&self) -> Result<()> {
        let circuit = read_netlist_file(&self.network)?;
        let report = compute_fault_coverage(&circuit, self.seed)?;
        println!(
            "Applied {} patterns: {}/{} faults detected ({:.2}% coverage), {} undetectable",
            report.patterns.len(),
            report.nb_detected,
            report.nb_faults,
            report.coverage(),
            report.nb_undetectable
        );
        Ok(())
    }
}
