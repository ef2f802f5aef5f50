//! Reading netlists, test vectors and fault descriptions

mod netlist;
mod patterns;

pub use netlist::{read_netlist, read_netlist_file};
pub use patterns::{parse_vector, read_args_file, vector_string};
