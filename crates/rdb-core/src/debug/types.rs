//! Debug data types.

use std::fmt;

use smol_str::SmolStr;

use crate::error::EvalError;

/// Whether a breakpoint fires, and under what condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnabledState {
    /// Fires unconditionally.
    Active,
    /// Fires when the expression evaluates truthy in the current frame.
    Conditional(SmolStr),
    /// Never fires. Removed breakpoints and placeholders are disabled.
    Disabled,
}

impl EnabledState {
    /// Build the state for an optional condition; `None` or blank means unconditional.
    #[must_use]
    pub fn from_condition(condition: Option<&str>) -> Self {
        match condition.map(str::trim) {
            Some(expr) if !expr.is_empty() => Self::Conditional(SmolStr::new(expr)),
            _ => Self::Active,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Condition text: `""` when unconditional, the expression when
    /// conditional, `None` when disabled.
    #[must_use]
    pub fn condition_text(&self) -> Option<&str> {
        match self {
            Self::Active => Some(""),
            Self::Conditional(expr) => Some(expr.as_str()),
            Self::Disabled => None,
        }
    }
}

/// Entry discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointKind {
    Breakpoint,
    Watchpoint,
}

/// Where in a file a breakpoint sits.
///
/// Line breakpoints hold a line number. Method breakpoints hold the method
/// name in the same slot and match `call` events by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Line(u32),
    Method(SmolStr),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "{line}"),
            Position::Method(name) => f.write_str(name),
        }
    }
}

/// What a table slot points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointTarget {
    /// Content-free slot.
    Empty,
    /// Breakpoint location. `file` is a canonical path, or an owning type
    /// name for method breakpoints.
    Location { file: SmolStr, position: Position },
    /// Watch expression.
    Watch(SmolStr),
}

/// One slot of the breakpoint table. The breakpoint number is the slot
/// index plus one and is not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointEntry {
    pub state: EnabledState,
    pub target: BreakpointTarget,
    /// Expression run in the stopped frame before handing off to the user.
    pub command: Option<SmolStr>,
}

impl BreakpointEntry {
    /// Disabled, content-free slot used to make higher numbers addressable.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            state: EnabledState::Disabled,
            target: BreakpointTarget::Empty,
            command: None,
        }
    }

    #[must_use]
    pub fn at_line(file: SmolStr, line: u32, state: EnabledState) -> Self {
        Self {
            state,
            target: BreakpointTarget::Location {
                file,
                position: Position::Line(line),
            },
            command: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> BreakpointKind {
        match self.target {
            BreakpointTarget::Watch(_) => BreakpointKind::Watchpoint,
            _ => BreakpointKind::Breakpoint,
        }
    }

    /// True only for slots that were never populated.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self.target, BreakpointTarget::Empty)
            && self.command.is_none()
            && self.state == EnabledState::Disabled
    }
}

/// Condition column of a breakpoint listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionTag {
    None,
    Disabled,
    Condition(SmolStr),
}

impl fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionTag::None => Ok(()),
            ConditionTag::Disabled => f.write_str("disabled"),
            ConditionTag::Condition(expr) => write!(f, "if {expr}"),
        }
    }
}

/// One listed breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointDescriptor {
    pub number: usize,
    pub file: SmolStr,
    pub position: Position,
    pub tag: ConditionTag,
    pub command: Option<SmolStr>,
}

impl fmt::Display for BreakpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}\t{}:{}", self.number, self.file, self.position)?;
        if self.tag != ConditionTag::None {
            write!(f, "\t{}", self.tag)?;
        }
        if let Some(command) = &self.command {
            write!(f, "\n  Runs:\t{command}")?;
        }
        Ok(())
    }
}

/// Result of listing the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointListing {
    pub entries: Vec<BreakpointDescriptor>,
    /// Active or conditional breakpoints, independent of what was listed.
    pub active: usize,
}

/// Kind of trace event delivered by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Line,
    Call,
    /// Entry into a foreign call that cannot be debugged.
    CCall,
    Class,
    Return,
    End,
    Raise,
}

impl EventKind {
    /// Parse the engine's event name (`"line"`, `"c-call"`, ...).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "line" => Some(Self::Line),
            "call" => Some(Self::Call),
            "c-call" => Some(Self::CCall),
            "class" => Some(Self::Class),
            "return" => Some(Self::Return),
            "end" => Some(Self::End),
            "raise" => Some(Self::Raise),
            _ => None,
        }
    }
}

/// One execution event.
#[derive(Debug, Clone)]
pub struct TraceEvent<B> {
    pub kind: EventKind,
    pub file: SmolStr,
    pub line: u32,
    /// Method or function name, if any.
    pub id: Option<SmolStr>,
    /// Opaque execution context handle.
    pub binding: B,
    /// Owning type of the called method (`call` events).
    pub owner: Option<SmolStr>,
}

/// Why execution stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Step countdown reached zero.
    Step,
    /// Breakpoint with the given number matched.
    Breakpoint(usize),
    /// Watchpoint with the given number became truthy.
    Watchpoint(usize),
    /// Exception collaborator requested a stop.
    Exception,
}

/// Notification handed to the front end when execution stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugStop {
    pub reason: StopReason,
    pub thread_id: u32,
    pub file: SmolStr,
    pub line: u32,
    pub id: Option<SmolStr>,
    /// Breakpoint command that ran before the hand-off.
    pub command: Option<SmolStr>,
    pub command_error: Option<EvalError>,
}

/// First breakpoint that matched an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointHit {
    pub number: usize,
    pub kind: BreakpointKind,
    pub command: Option<SmolStr>,
}

/// A condition or watch expression that failed to evaluate during matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionFailure {
    pub number: usize,
    pub error: EvalError,
}

/// Result of running the match rule over the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub hit: Option<BreakpointHit>,
    pub failures: Vec<ConditionFailure>,
}

/// What the dispatcher decided for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    pub stop: Option<DebugStop>,
    pub failures: Vec<ConditionFailure>,
}

impl Decision {
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.stop.is_some()
    }
}

/// How the front end wants execution to resume after a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// Run until the next breakpoint.
    Continue,
    /// Stop after `n` line events at any depth.
    Step(u32),
    /// Stop after `n` line events at the current depth or shallower.
    Next(u32),
    /// Stop after the current frame returns.
    Finish,
}
