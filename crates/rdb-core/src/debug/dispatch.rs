//! Trace event dispatch: frame upkeep, step counting and stop decisions.

use std::path::PathBuf;

use smol_str::SmolStr;
use tracing::{debug, info, trace, warn};

use crate::paths::expand_path;

use super::control::SuspendControl;
use super::hook::{ConditionEvaluator, FrontEnd};
use super::matching::{match_breakpoints, MatchSite};
use super::table::Breakpoints;
use super::{
    BreakpointHit, BreakpointKind, DebugStop, Decision, EventKind, Frame, FrameStack, MatchOutcome,
    Position, ResumeAction, StopReason, TraceEvent,
};

/// Countdown value meaning "not stepping".
pub const NOT_STEPPING: i64 = -1;

/// Per-thread dispatcher state.
///
/// The breakpoint table and suspend barrier are shared with every other
/// dispatcher of the session; the frame stack and step state are not.
#[derive(Debug)]
pub struct TraceDispatcher<B> {
    thread_id: u32,
    breakpoints: Breakpoints,
    suspend: SuspendControl,
    root: PathBuf,
    frames: FrameStack<B>,
    file: SmolStr,
    line: u32,
    /// Line events left before a step stop; 0 means stop now.
    stop_next: i64,
    /// Depth a `next` is stepping at; deeper line events are skipped.
    no_step: Option<usize>,
    /// Depth whose return arms a stop.
    finish_pos: Option<usize>,
}

impl<B: Clone> TraceDispatcher<B> {
    /// Create a dispatcher; with `stop_on_entry` the first line event stops.
    #[must_use]
    pub fn new(
        thread_id: u32,
        breakpoints: Breakpoints,
        suspend: SuspendControl,
        stop_on_entry: bool,
    ) -> Self {
        let root = breakpoints.root();
        Self {
            thread_id,
            breakpoints,
            suspend,
            root,
            frames: FrameStack::new(),
            file: SmolStr::default(),
            line: 0,
            stop_next: if stop_on_entry { 1 } else { NOT_STEPPING },
            no_step: None,
            finish_pos: None,
        }
    }

    #[must_use]
    pub fn thread_id(&self) -> u32 {
        self.thread_id
    }

    #[must_use]
    pub fn frames(&self) -> &FrameStack<B> {
        &self.frames
    }

    /// File and line of the last event.
    #[must_use]
    pub fn position(&self) -> (&str, u32) {
        (&self.file, self.line)
    }

    #[must_use]
    pub fn stop_next(&self) -> i64 {
        self.stop_next
    }

    #[must_use]
    pub fn no_step(&self) -> Option<usize> {
        self.no_step
    }

    #[must_use]
    pub fn finish_pos(&self) -> Option<usize> {
        self.finish_pos
    }

    /// Stop after `count` line events at any depth.
    pub fn step(&mut self, count: u32) {
        self.stop_next = i64::from(count.max(1));
        self.no_step = None;
        debug!(thread = self.thread_id, "step {}", self.stop_next);
    }

    /// Stop after `count` line events at the current depth, or as soon as
    /// execution returns to a shallower frame.
    pub fn step_over(&mut self, count: u32) {
        self.stop_next = i64::from(count.max(1));
        self.no_step = Some(self.frames.depth());
        debug!(
            thread = self.thread_id,
            "next {} at depth {}",
            self.stop_next,
            self.frames.depth()
        );
    }

    /// Stop once the current frame returns.
    pub fn finish(&mut self) {
        let depth = self.frames.depth();
        if depth == 0 {
            warn!("\"finish\" not meaningful in the outermost frame.");
            return;
        }
        self.finish_pos = Some(depth);
        debug!(thread = self.thread_id, "finish at depth {depth}");
    }

    /// Apply the front end's resume choice.
    pub fn apply(&mut self, action: ResumeAction) {
        match action {
            ResumeAction::Continue => self.stop_next = NOT_STEPPING,
            ResumeAction::Step(count) => self.step(count),
            ResumeAction::Next(count) => self.step_over(count),
            ResumeAction::Finish => {
                self.stop_next = NOT_STEPPING;
                self.finish();
            }
        }
    }

    /// Handle one execution event and decide whether to stop.
    ///
    /// Relative event paths are expanded the same way breakpoint paths are.
    /// Blocks first while another thread is stopped. On a stop, every other
    /// thread is suspended, the breakpoint command (if any) runs in the
    /// event's frame, and `front_end` takes over until it returns a
    /// [`ResumeAction`].
    pub fn on_event<E, F>(
        &mut self,
        mut event: TraceEvent<B>,
        evaluator: &mut E,
        front_end: &mut F,
    ) -> Decision
    where
        E: ConditionEvaluator<B>,
        F: FrontEnd<B>,
    {
        self.suspend.check_suspend(self.thread_id);
        event.file = expand_path(&event.file, &self.root);
        trace!(
            thread = self.thread_id,
            "{:?} {}:{}",
            event.kind,
            event.file,
            event.line
        );
        self.file = event.file.clone();
        self.line = event.line;

        match event.kind {
            EventKind::Line => self.on_line(event, evaluator, front_end),
            EventKind::Call => self.on_call(event, evaluator, front_end),
            EventKind::CCall => {
                self.frames.set_position(&event.file, event.line);
                Decision::default()
            }
            EventKind::Class => {
                self.frames.push(frame_of(&event));
                Decision::default()
            }
            EventKind::Return | EventKind::End => {
                if self.finish_pos == Some(self.frames.depth()) {
                    // The caller's next line event stops.
                    self.stop_next = 1;
                    self.finish_pos = None;
                }
                self.frames.pop();
                Decision::default()
            }
            EventKind::Raise => {
                if front_end.on_raise(&event, &self.frames) {
                    let frame = frame_of(&event);
                    let stop = self.stop(StopReason::Exception, &frame, None, evaluator, front_end);
                    Decision {
                        stop: Some(stop),
                        failures: Vec::new(),
                    }
                } else {
                    Decision::default()
                }
            }
        }
    }

    fn on_line<E, F>(&mut self, event: TraceEvent<B>, evaluator: &mut E, front_end: &mut F) -> Decision
    where
        E: ConditionEvaluator<B>,
        F: FrontEnd<B>,
    {
        self.frames.set_position(&event.file, event.line);
        let depth = self.frames.depth();
        match self.no_step {
            Some(target) if depth < target => {
                // Stepped over a return into a shallower frame.
                self.stop_next = 0;
            }
            Some(target) if depth != target => {}
            _ => {
                self.stop_next -= 1;
                if self.stop_next < 0 {
                    self.stop_next = NOT_STEPPING;
                }
            }
        }

        let frame = frame_of(&event);
        if self.stop_next == 0 {
            let stop = self.stop(StopReason::Step, &frame, None, evaluator, front_end);
            return Decision {
                stop: Some(stop),
                failures: Vec::new(),
            };
        }
        let position = Position::Line(event.line);
        let site = MatchSite {
            file: &event.file,
            owner: None,
            position: &position,
        };
        let outcome = self.check_breakpoints(site, &frame, evaluator);
        self.finish_match(outcome, &frame, evaluator, front_end)
    }

    fn on_call<E, F>(&mut self, event: TraceEvent<B>, evaluator: &mut E, front_end: &mut F) -> Decision
    where
        E: ConditionEvaluator<B>,
        F: FrontEnd<B>,
    {
        let frame = frame_of(&event);
        self.frames.push(frame.clone());
        let Some(id) = event.id.as_ref() else {
            return Decision::default();
        };
        let position = Position::Method(id.clone());
        let site = MatchSite {
            file: &event.file,
            owner: event.owner.as_deref(),
            position: &position,
        };
        let outcome = self.check_breakpoints(site, &frame, evaluator);
        self.finish_match(outcome, &frame, evaluator, front_end)
    }

    fn check_breakpoints<E>(
        &self,
        site: MatchSite<'_>,
        frame: &Frame<B>,
        evaluator: &mut E,
    ) -> MatchOutcome
    where
        E: ConditionEvaluator<B>,
    {
        // Evaluate against a copy so evaluators can re-enter the table.
        let entries = self.breakpoints.snapshot();
        if entries.is_empty() {
            return MatchOutcome::default();
        }
        match_breakpoints(&entries, site, frame, evaluator)
    }

    fn finish_match<E, F>(
        &mut self,
        outcome: MatchOutcome,
        frame: &Frame<B>,
        evaluator: &mut E,
        front_end: &mut F,
    ) -> Decision
    where
        E: ConditionEvaluator<B>,
        F: FrontEnd<B>,
    {
        let MatchOutcome { hit, failures } = outcome;
        let stop = hit.map(|hit| {
            log_hit(&hit, frame);
            let reason = match hit.kind {
                BreakpointKind::Breakpoint => StopReason::Breakpoint(hit.number),
                BreakpointKind::Watchpoint => StopReason::Watchpoint(hit.number),
            };
            self.stop(reason, frame, hit.command, evaluator, front_end)
        });
        Decision { stop, failures }
    }

    fn stop<E, F>(
        &mut self,
        reason: StopReason,
        frame: &Frame<B>,
        command: Option<SmolStr>,
        evaluator: &mut E,
        front_end: &mut F,
    ) -> DebugStop
    where
        E: ConditionEvaluator<B>,
        F: FrontEnd<B>,
    {
        self.no_step = None;
        self.suspend.suspend_all(self.thread_id);
        let command_error = command.as_ref().and_then(|command| {
            evaluator
                .evaluate(command, frame)
                .err()
                .inspect(|err| warn!("breakpoint command failed: {err}"))
        });
        let stop = DebugStop {
            reason,
            thread_id: self.thread_id,
            file: frame.file.clone(),
            line: frame.line,
            id: frame.id.clone(),
            command,
            command_error,
        };
        let action = front_end.on_stop(&stop, &self.frames);
        debug!(thread = self.thread_id, "resume {action:?}");
        self.apply(action);
        self.suspend.resume_all(self.thread_id);
        stop
    }
}

fn frame_of<B: Clone>(event: &TraceEvent<B>) -> Frame<B> {
    Frame::new(
        event.binding.clone(),
        event.file.clone(),
        event.line,
        event.id.clone(),
    )
}

fn log_hit<B>(hit: &BreakpointHit, frame: &Frame<B>) {
    let label = match hit.kind {
        BreakpointKind::Breakpoint => "Breakpoint",
        BreakpointKind::Watchpoint => "Watchpoint",
    };
    let function = frame.id.as_deref().unwrap_or("main");
    info!(
        "{label} {}, {function} at {}:{}",
        hit.number, frame.file, frame.line
    );
}
