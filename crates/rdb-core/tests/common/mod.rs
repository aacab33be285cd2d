#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;

use rdb_core::debug::{
    ConditionEvaluator, DebugStop, EventKind, Frame, FrameStack, FrontEnd, ResumeAction,
    TraceEvent,
};
use rdb_core::{DebugSession, DebuggerConfig, EvalError};

pub const ROOT: &str = "/work";

/// Recorded answers for the expressions a frame may be asked about.
pub type Answers = Vec<(&'static str, bool)>;

pub fn session(stop_on_entry: bool) -> DebugSession {
    DebugSession::new(DebuggerConfig {
        root: Some(PathBuf::from(ROOT)),
        stop_on_entry,
        ..DebuggerConfig::default()
    })
    .unwrap()
}

pub fn event(kind: EventKind, file: &str, line: u32, answers: Answers) -> TraceEvent<Answers> {
    TraceEvent {
        kind,
        file: file.into(),
        line,
        id: None,
        binding: answers,
        owner: None,
    }
}

pub fn line(file: &str, line_no: u32) -> TraceEvent<Answers> {
    event(EventKind::Line, file, line_no, Vec::new())
}

pub fn call(file: &str, line_no: u32, id: &str) -> TraceEvent<Answers> {
    TraceEvent {
        id: Some(id.into()),
        ..event(EventKind::Call, file, line_no, Vec::new())
    }
}

pub fn ret(file: &str, line_no: u32) -> TraceEvent<Answers> {
    event(EventKind::Return, file, line_no, Vec::new())
}

/// Answers expressions from the frame's binding and records every request.
#[derive(Debug, Default)]
pub struct AnswerEvaluator {
    pub evaluated: Vec<String>,
}

impl ConditionEvaluator<Answers> for AnswerEvaluator {
    type Value = bool;

    fn evaluate(&mut self, expression: &str, frame: &Frame<Answers>) -> Result<bool, EvalError> {
        self.evaluated.push(expression.to_string());
        frame
            .binding
            .iter()
            .find(|(expr, _)| *expr == expression)
            .map(|(_, value)| *value)
            .ok_or_else(|| EvalError::new(expression, "undefined expression"))
    }
}

/// Front end that answers stops from a script and records them.
#[derive(Debug, Default)]
pub struct ScriptedFrontEnd {
    pub actions: VecDeque<ResumeAction>,
    pub stops: Vec<DebugStop>,
    pub depths: Vec<usize>,
    pub stop_on_raise: bool,
}

impl ScriptedFrontEnd {
    pub fn with_actions(actions: impl IntoIterator<Item = ResumeAction>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl FrontEnd<Answers> for ScriptedFrontEnd {
    fn on_stop(&mut self, stop: &DebugStop, frames: &FrameStack<Answers>) -> ResumeAction {
        self.stops.push(stop.clone());
        self.depths.push(frames.depth());
        self.actions.pop_front().unwrap_or(ResumeAction::Continue)
    }

    fn on_raise(&mut self, _event: &TraceEvent<Answers>, _frames: &FrameStack<Answers>) -> bool {
        self.stop_on_raise
    }
}
