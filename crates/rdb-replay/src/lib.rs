//! Replays recorded execution traces through the rdb breakpoint engine.

#![forbid(unsafe_code)]

pub mod cli;
pub mod replay;
pub mod trace;

pub use replay::{replay, RecordedValues, ReplayReport, ScriptedResume};
pub use trace::TraceFile;
