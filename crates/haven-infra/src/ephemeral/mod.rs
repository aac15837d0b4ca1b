//! Per-client ephemeral state.
//!
//! Guest transcripts, the guest's selected counselor and anonymity
//! preferences live here rather than in SQLite. Contents vanish on restart.

pub mod memory;
