//! # Weave Core
//!
//! Core types and errors shared by the weave crates.
//!
//! A weave run reads several per-repository activity logs, each made of
//! `timestamp|actor|kind|path` lines, and merges them into one log for a
//! visualizer. This crate holds the pieces every other crate agrees on:
//!
//! - [`EventRecord`]: one parsed input line
//! - [`OutputRecord`]: one line of the merged log, carrying a logical time
//! - [`Roster`]: canonical handles and where their avatar images come from
//! - [`ParseError`]: why an input line was rejected

pub mod error;
pub mod record;
pub mod roster;

// Re-export main types
pub use error::*;
pub use record::*;
pub use roster::*;
