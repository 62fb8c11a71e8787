//! Cubane CLI library - command implementation for the `dbmigrate` binary.

pub mod cli;
pub mod error;
pub mod fixtures;
pub mod migrate;
pub mod output;
