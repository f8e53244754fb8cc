//! `storekeep` command-line driver: runs a JSON script of store operations and
//! prints the resulting inventory and ledgers.

pub mod config;
pub mod script;

pub use config::CliConfig;
pub use script::{Report, Script};
