//! Breakpoint and watchpoint evaluation.

use tracing::warn;

use super::hook::{ConditionEvaluator, Truthy};
use super::{
    BreakpointEntry, BreakpointHit, BreakpointKind, BreakpointTarget, ConditionFailure,
    EnabledState, Frame, MatchOutcome, Position,
};

/// Where an event happened, as seen by the match rule.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatchSite<'a> {
    pub file: &'a str,
    /// Owning type of the called method, for `call` events only.
    pub owner: Option<&'a str>,
    pub position: &'a Position,
}

/// Find the first entry that fires at `site`.
///
/// Entries are evaluated in number order. A condition or watch expression
/// that fails to evaluate is recorded in the outcome and treated as not
/// matching, so later entries are still considered.
pub(crate) fn match_breakpoints<B, E>(
    entries: &[BreakpointEntry],
    site: MatchSite<'_>,
    frame: &Frame<B>,
    evaluator: &mut E,
) -> MatchOutcome
where
    E: ConditionEvaluator<B>,
{
    let mut outcome = MatchOutcome::default();
    for (index, entry) in entries.iter().enumerate() {
        let number = index + 1;
        match &entry.state {
            EnabledState::Disabled => continue,
            EnabledState::Active => {}
            EnabledState::Conditional(condition) => {
                match check(evaluator, condition, frame, number, &mut outcome) {
                    Some(true) => {}
                    Some(false) | None => continue,
                }
            }
        }
        match &entry.target {
            BreakpointTarget::Empty => {}
            BreakpointTarget::Location { file, position } => {
                let at_location = file.as_str() == site.file && position == site.position;
                let on_owner = site.owner.is_some_and(|owner| owner == file.as_str())
                    && position == site.position;
                if at_location || on_owner {
                    outcome.hit = Some(BreakpointHit {
                        number,
                        kind: BreakpointKind::Breakpoint,
                        command: entry.command.clone(),
                    });
                    return outcome;
                }
            }
            BreakpointTarget::Watch(expression) => {
                if check(evaluator, expression, frame, number, &mut outcome) == Some(true) {
                    outcome.hit = Some(BreakpointHit {
                        number,
                        kind: BreakpointKind::Watchpoint,
                        command: None,
                    });
                    return outcome;
                }
            }
        }
    }
    outcome
}

fn check<B, E>(
    evaluator: &mut E,
    expression: &str,
    frame: &Frame<B>,
    number: usize,
    outcome: &mut MatchOutcome,
) -> Option<bool>
where
    E: ConditionEvaluator<B>,
{
    match evaluator.evaluate(expression, frame) {
        Ok(value) => Some(value.is_truthy()),
        Err(error) => {
            warn!("breakpoint {number}: {error}");
            outcome.failures.push(ConditionFailure { number, error });
            None
        }
    }
}
