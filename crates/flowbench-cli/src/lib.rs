//! Library side of the Flowbench CLI: config loading, input and artifact
//! files, and logging setup.

pub mod config;
pub mod files;
pub mod logging;
