//! # lway-cli — LibriumWay Routing Command-Line Interface
//!
//! Drives the in-process routing engine from the terminal: loads a board
//! snapshot, replays command scripts against it, and prints pools and
//! contract histories.
//!
//! ## Subcommands
//!
//! - `board`: Pool summary and per-section contract listing
//! - `run`: Replay a YAML script of routing commands
//! - `show`: One contract with its audit history and comments, as JSON
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `lway-routing`; no routing rules here.
//! - Handlers return `anyhow::Result<u8>`: `0` success, `2` when a script
//!   step was refused, errors map to `1` in `main`.

pub mod board;
pub mod load;
pub mod script;
pub mod show;
