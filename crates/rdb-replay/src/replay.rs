//! Feeds a recorded trace through a debug session.

use std::collections::VecDeque;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use rdb_core::debug::{
    BreakpointListing, ConditionEvaluator, ConditionFailure, DebugStop, Frame, FrameStack,
    FrontEnd, ResumeAction, StopReason, TraceEvent,
};
use rdb_core::{DebugSession, EvalError};

use crate::trace::{TraceFile, Values};

/// Answers expressions from the values recorded with each event.
#[derive(Debug, Default)]
pub struct RecordedValues;

impl ConditionEvaluator<Values> for RecordedValues {
    type Value = Value;

    fn evaluate(&mut self, expression: &str, frame: &Frame<Values>) -> Result<Value, EvalError> {
        frame
            .binding
            .get(expression)
            .cloned()
            .ok_or_else(|| EvalError::new(expression, "no recorded value"))
    }
}

/// Front end that answers stops from the trace's resume script.
#[derive(Debug, Default)]
pub struct ScriptedResume {
    actions: VecDeque<ResumeAction>,
    stop_on_raise: bool,
    lines: Vec<String>,
    stops: Vec<DebugStop>,
}

impl ScriptedResume {
    pub fn new(actions: Vec<ResumeAction>, stop_on_raise: bool) -> Self {
        Self {
            actions: actions.into(),
            stop_on_raise,
            ..Self::default()
        }
    }
}

impl FrontEnd<Values> for ScriptedResume {
    fn on_stop(&mut self, stop: &DebugStop, frames: &FrameStack<Values>) -> ResumeAction {
        self.lines.push(stop_header(stop));
        let frame = frames.format_frame(0).unwrap_or_else(|| match &stop.id {
            Some(id) => format!("#1 {}:{}:in `{id}'", stop.file, stop.line),
            None => format!("#1 {}:{}", stop.file, stop.line),
        });
        self.lines.push(format!("  {frame}"));
        match (&stop.command, &stop.command_error) {
            (_, Some(err)) => self.lines.push(format!("  Command failed: {err}")),
            (Some(command), None) => self.lines.push(format!("  Ran: {command}")),
            (None, None) => {}
        }
        self.stops.push(stop.clone());
        let action = self.actions.pop_front().unwrap_or(ResumeAction::Continue);
        debug!("answering stop with {action:?}");
        action
    }

    fn on_raise(&mut self, _event: &TraceEvent<Values>, _frames: &FrameStack<Values>) -> bool {
        self.stop_on_raise
    }
}

fn stop_header(stop: &DebugStop) -> String {
    let label = match stop.reason {
        StopReason::Step => "Step".to_string(),
        StopReason::Breakpoint(number) => format!("Breakpoint {number}"),
        StopReason::Watchpoint(number) => format!("Watchpoint {number}"),
        StopReason::Exception => "Exception".to_string(),
    };
    let function = stop.id.as_deref().unwrap_or("main");
    format!("{label}, {function} at {}:{}", stop.file, stop.line)
}

fn failure_line(failure: &ConditionFailure) -> String {
    format!(
        "Condition on breakpoint {} failed: {}",
        failure.number, failure.error
    )
}

/// Everything a replay produced.
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub stops: Vec<DebugStop>,
    pub failures: Vec<ConditionFailure>,
    /// Stop and failure lines in event order.
    pub lines: Vec<String>,
    pub listing: BreakpointListing,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "Breakpoints:")?;
        for descriptor in &self.listing.entries {
            writeln!(f, "{descriptor}")?;
        }
        write!(f, "{} active", self.listing.active)
    }
}

/// Install the trace's breakpoints and dispatch every event on one thread.
pub fn replay(
    session: &DebugSession,
    trace: &TraceFile,
    show_disabled: bool,
) -> anyhow::Result<ReplayReport> {
    trace.install(session.breakpoints())?;
    let events = trace
        .events
        .iter()
        .map(|spec| spec.to_event())
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut dispatcher = session.dispatcher::<Values>();
    let mut evaluator = RecordedValues;
    let mut front_end = ScriptedResume::new(trace.resume_actions()?, trace.stop_on_raise);
    let mut failures = Vec::new();
    for event in events {
        let decision = dispatcher.on_event(event, &mut evaluator, &mut front_end);
        for failure in &decision.failures {
            front_end.lines.push(failure_line(failure));
        }
        failures.extend(decision.failures);
    }

    let listing = session
        .breakpoints()
        .list(show_disabled || session.config().show_disabled);
    info!(
        "replayed {} events: {} stops",
        trace.events.len(),
        front_end.stops.len()
    );
    Ok(ReplayReport {
        stops: front_end.stops,
        failures,
        lines: front_end.lines,
        listing,
    })
}
