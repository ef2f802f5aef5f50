//! Fault coverage analysis
//!
//! Random vectors detect most faults of a typical circuit quickly; the
//! remaining ones are handed to the PODEM generator, which either
//! contributes a targeted vector or proves the fault undetectable.

use kdam::{tqdm, BarExt};
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::circuit::Circuit;
use crate::errors::Result;
use crate::logic::Logic;
use crate::podem::TestGenerator;
use crate::sim::{detect_faults, Fault};

/// Generate random fully-specified test vectors
pub fn generate_random_patterns(
    nb_inputs: usize,
    nb_patterns: usize,
    seed: u64,
) -> Vec<Vec<Logic>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut ret = Vec::new();
    for _ in 0..nb_patterns {
        ret.push((0..nb_inputs).map(|_| Logic::from(rng.gen::<bool>())).collect());
    }
    ret
}

/// Outcome of a coverage run
#[derive(Debug, Clone)]
pub struct CoverageReport {
    /// Number of faults considered (two per net)
    pub nb_faults: usize,
    /// Faults detected by at least one pattern
    pub nb_detected: usize,
    /// Faults proven undetectable by the test generator
    pub nb_undetectable: usize,
    /// The patterns that were applied
    pub patterns: Vec<Vec<Logic>>,
}

impl CoverageReport {
    /// Detected faults as a percentage of all faults
    pub fn coverage(&self) -> f64 {
        100.0 * (self.nb_detected as f64) / (self.nb_faults as f64)
    }
}

/// Handling of the actual coverage computation
struct FaultCoverage<'a> {
    circuit: &'a Circuit,
    faults: Vec<Fault>,
    detection: Vec<bool>,
    patterns: Vec<Vec<Logic>>,
    nb_undetectable: usize,
    rng: SmallRng,
}

impl<'a> FaultCoverage<'a> {
    fn from(circuit: &'a Circuit, faults: Vec<Fault>, seed: u64) -> FaultCoverage<'a> {
        let nb_faults = faults.len();
        FaultCoverage {
            circuit,
            faults,
            detection: vec![false; nb_faults],
            patterns: Vec::new(),
            nb_undetectable: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn nb_faults(&self) -> usize {
        self.faults.len()
    }

    fn nb_detected(&self) -> usize {
        self.detection.iter().filter(|b| **b).count()
    }

    /// Apply a single pattern and record every fault it detects
    fn add_pattern(&mut self, pattern: Vec<Logic>) -> Result<()> {
        let detected = detect_faults(self.circuit, &pattern)?;
        for (i, f) in self.faults.iter().enumerate() {
            if !self.detection[i] && detected.contains(f) {
                self.detection[i] = true;
            }
        }
        self.patterns.push(pattern);
        Ok(())
    }

    /// Apply rounds of random patterns until the detection rate stalls
    fn random_phase(&mut self) -> Result<()> {
        const ROUND: usize = 64;
        loop {
            let nb_detected_before = self.nb_detected();
            for _ in 0..ROUND {
                let pattern = (0..self.circuit.nb_inputs())
                    .map(|_| Logic::from(self.rng.gen::<bool>()))
                    .collect();
                self.add_pattern(pattern)?;
            }
            let nb_detected_after = self.nb_detected();
            if nb_detected_after == self.nb_faults() {
                break;
            }
            if ((nb_detected_after - nb_detected_before) as f64)
                < 0.01 * self.nb_faults() as f64
            {
                break;
            }
        }
        info!(
            "random phase: {} patterns detect {}/{} faults",
            self.patterns.len(),
            self.nb_detected(),
            self.nb_faults()
        );
        Ok(())
    }

    /// Run the test generator on every fault the random phase missed
    fn targeted_phase(&mut self) -> Result<()> {
        let gen = TestGenerator::new(self.circuit);
        let mut progress = tqdm!(total = self.nb_faults());
        progress.set_description("Detection progress");
        progress.update_to(self.nb_detected()).unwrap();
        for i in 0..self.nb_faults() {
            if self.detection[i] {
                continue;
            }
            match gen.generate_test(&self.faults[i])? {
                Some(test) => {
                    // Bind the unassigned inputs; the detection is
                    // independent of their value
                    let pattern = test
                        .iter()
                        .map(|&v| if v == Logic::X { Logic::Zero } else { v })
                        .collect();
                    self.add_pattern(pattern)?;
                }
                None => {
                    self.nb_undetectable += 1;
                }
            }
            progress
                .update_to(self.nb_detected() + self.nb_undetectable)
                .unwrap();
        }
        info!(
            "targeted phase: {} patterns detect {}/{} faults, {} undetectable",
            self.patterns.len(),
            self.nb_detected(),
            self.nb_faults(),
            self.nb_undetectable
        );
        Ok(())
    }

    fn into_report(self) -> CoverageReport {
        CoverageReport {
            nb_faults: self.faults.len(),
            nb_detected: self.detection.iter().filter(|b| **b).count(),
            nb_undetectable: self.nb_undetectable,
            patterns: self.patterns,
        }
    }
}

/// Measure the stuck-at fault coverage achievable on a circuit
///
/// Every fault ends up either detected by a pattern or proven
/// undetectable, so `nb_detected + nb_undetectable == nb_faults`.
pub fn compute_fault_coverage(circuit: &Circuit, seed: u64) -> Result<CoverageReport> {
    let faults = Fault::all(circuit);
    info!(
        "analyzing circuit with {} inputs, {} outputs, {} faults",
        circuit.nb_inputs(),
        circuit.nb_outputs(),
        faults.len()
    );
    let mut cov = FaultCoverage::from(circuit, faults, seed);
    cov.random_phase()?;
    cov.targeted_phase()?;
    Ok(cov.into_report())
}

#[cfg(test)]
mod tests {
    use super::{compute_fault_coverage, generate_random_patterns};
    use crate::io::read_netlist;
    use crate::logic::Logic;

    #[test]
    fn test_random_patterns_are_reproducible() {
        let a = generate_random_patterns(8, 16, 42);
        let b = generate_random_patterns(8, 16, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.iter().all(|p| p.len() == 8 && p.iter().all(Logic::is_binary)));
        let c = generate_random_patterns(8, 16, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_full_coverage_c17() {
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
        let report = compute_fault_coverage(&c, 1).unwrap();
        assert_eq!(report.nb_faults, 22);
        assert_eq!(report.nb_detected + report.nb_undetectable, 22);
        assert_eq!(report.nb_undetectable, 0);
        assert_eq!(report.coverage(), 100.0);
    }

    #[test]
    fn test_redundant_fault_reported() {
        let src = "\
AND a b x1
INV a na
AND na c x2
AND b c x3
OR x1 x2 y1
OR y1 x3 f
INPUT a b c -1
OUTPUT f -1
";
        let c = read_netlist(src.as_bytes()).unwrap();
        let report = compute_fault_coverage(&c, 1).unwrap();
        assert_eq!(report.nb_detected + report.nb_undetectable, report.nb_faults);
        assert!(report.nb_undetectable >= 1);
    }
}
