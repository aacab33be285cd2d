//! `rdb-core` - decision core of a source-level debugger.
//!
//! Tracks breakpoints and watchpoints with stable numbering, and turns a
//! stream of trace events into stop/continue decisions.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

/// Debugger configuration.
pub mod config;
/// Breakpoints, frames and dispatch.
pub mod debug;
/// Core errors.
pub mod error;
/// Path canonicalization.
pub mod paths;
mod session;

pub use config::DebuggerConfig;
pub use error::{DebugError, EvalError};
pub use session::DebugSession;
