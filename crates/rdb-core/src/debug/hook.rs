//! Collaborator traits the dispatcher calls out to.

use crate::error::EvalError;

use super::{DebugStop, Frame, FrameStack, ResumeAction, TraceEvent};

/// Truthiness of an evaluated expression.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

/// Only `null` and `false` are falsy.
impl Truthy for serde_json::Value {
    fn is_truthy(&self) -> bool {
        !matches!(
            self,
            serde_json::Value::Null | serde_json::Value::Bool(false)
        )
    }
}

/// Evaluates source-level expressions in a frame.
///
/// Evaluation runs on the thread that delivered the event and may itself
/// produce trace events; implementations must not call back into the
/// breakpoint table while holding its lock.
pub trait ConditionEvaluator<B> {
    type Value: Truthy;

    fn evaluate(&mut self, expression: &str, frame: &Frame<B>) -> Result<Self::Value, EvalError>;
}

/// Interactive side of the debugger, invoked whenever execution stops.
pub trait FrontEnd<B> {
    /// Interact with the user; the returned action decides how to resume.
    fn on_stop(&mut self, stop: &DebugStop, frames: &FrameStack<B>) -> ResumeAction;

    /// Decide whether a raised exception stops execution.
    fn on_raise(&mut self, _event: &TraceEvent<B>, _frames: &FrameStack<B>) -> bool {
        false
    }
}

/// Front end that resumes immediately and ignores exceptions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFrontEnd;

impl<B> FrontEnd<B> for NoopFrontEnd {
    fn on_stop(&mut self, _stop: &DebugStop, _frames: &FrameStack<B>) -> ResumeAction {
        ResumeAction::Continue
    }
}
