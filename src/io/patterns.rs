use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{Error, Result};
use crate::logic::Logic;

/// Parse a test vector string over {0, 1, X}
pub fn parse_vector(s: &str) -> Result<Vec<Logic>> {
    s.trim()
        .chars()
        .map(|c| {
            Logic::from_char(c).ok_or_else(|| {
                Error::InvalidVector(format!("illegal character '{}' in vector '{}'", c, s.trim()))
            })
        })
        .collect()
}

/// Render logic values as a vector string
pub fn vector_string(values: &[Logic]) -> String {
    values.iter().map(|v| v.to_string()).collect()
}

/// Read arguments from a file, one per line, skipping blanks and comments
pub fn read_args_file(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path)?;
    let mut ret = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        ret.push(text.to_string());
    }
    Ok(ret)
}
