//! Dialogue Engine — a branching dialogue-script interpreter for games.
//!
//! Parses a small line-oriented script language into blocks of dialogue
//! and inline commands, then walks them as an event-driven state machine.
//! Rendering, audio, timing and scene changes are left to the host, which
//! the engine drives through the traits in [`core::host`].

pub mod core;
pub mod schema;
