//! `rollcall-engine`: attendance-to-roster identity resolution engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns typed results.
//! No CLI or filesystem dependencies; CSV codecs operate on strings.

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod resolve;
pub mod score;
pub mod tables;

pub use config::MatchConfig;
pub use engine::{apply, propose};
pub use error::EngineError;
pub use model::{ApplyResult, AttendanceRecord, ProposeResult, RosterEntry};
