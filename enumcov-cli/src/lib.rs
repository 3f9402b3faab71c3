//! Library half of the `enumcov` binary: config file handling and rule explanations.

pub mod config;
pub mod explain;
