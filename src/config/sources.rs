//! Configuration sources, in the order the loader layers them.

pub mod environment;
pub mod explicit_file;
pub mod global_file;
