//! Generic utility primitives with zero tool knowledge.
//!
//! - `args` - CLI argument normalization before clap parsing
//! - `command` - Child process execution with error handling
//! - `io` - Input acquisition and output with consistent error handling
//! - `parser` - Integer, duration, size and field-list grammars
//! - `shell` - Shell escaping, quoting and word splitting
//! - `tty` - Terminal detection and prompting

pub mod args;
pub mod command;
pub mod io;
pub mod parser;
pub mod shell;
pub mod tty;
