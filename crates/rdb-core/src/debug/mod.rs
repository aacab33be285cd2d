//! Breakpoints, frames and trace-event dispatch.

mod control;
mod dispatch;
mod frames;
mod hook;
mod matching;
mod table;
mod types;

pub use control::SuspendControl;
pub use dispatch::{TraceDispatcher, NOT_STEPPING};
pub use frames::{Frame, FrameStack};
pub use hook::{ConditionEvaluator, FrontEnd, NoopFrontEnd, Truthy};
pub use table::{BreakpointTable, Breakpoints, CLEAR_COMMAND};
pub use types::{
    BreakpointDescriptor, BreakpointEntry, BreakpointHit, BreakpointKind, BreakpointListing,
    BreakpointTarget, ConditionFailure, ConditionTag, DebugStop, Decision, EnabledState,
    EventKind, MatchOutcome, Position, ResumeAction, StopReason, TraceEvent,
};
