#![cfg(unix)]

mod common;

use rdb_core::debug::{EventKind, ResumeAction, StopReason, TraceEvent, NOT_STEPPING};

use common::{
    call, event, line, ret, session, AnswerEvaluator, Answers, ScriptedFrontEnd,
};

#[test]
fn stops_at_unconditional_breakpoint() {
    let session = session(false);
    session.breakpoints().find_or_create("foo.rb", 42, true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();
    assert_eq!(dispatcher.stop_next(), NOT_STEPPING);

    let decision = dispatcher.on_event(line("foo.rb", 41), &mut eval, &mut ui);
    assert!(!decision.stopped());

    let decision = dispatcher.on_event(line("foo.rb", 42), &mut eval, &mut ui);
    let stop = decision.stop.unwrap();
    assert_eq!(stop.reason, StopReason::Breakpoint(1));
    assert_eq!(stop.file, "/work/foo.rb");
    assert_eq!(stop.line, 42);
    assert_eq!(stop.command, None);
    assert!(eval.evaluated.is_empty());
    assert_eq!(ui.stops.len(), 1);
}

#[test]
fn conditional_breakpoint_follows_evaluator() {
    let session = session(false);
    let number = session
        .breakpoints()
        .find_or_create("foo.rb", 42, true)
        .unwrap();
    session
        .breakpoints()
        .set_condition(number, Some("n == 3"))
        .unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    let first = dispatcher.on_event(
        event(EventKind::Line, "foo.rb", 42, vec![("n == 3", false)]),
        &mut eval,
        &mut ui,
    );
    assert!(!first.stopped());
    let second = dispatcher.on_event(
        event(EventKind::Line, "foo.rb", 42, vec![("n == 3", true)]),
        &mut eval,
        &mut ui,
    );
    assert!(second.stopped());
    assert_eq!(eval.evaluated, vec!["n == 3", "n == 3"]);
}

#[test]
fn breakpoint_command_runs_before_hand_off() {
    let session = session(false);
    let table = session.breakpoints();
    let number = table.find_or_create("foo.rb", 3, true).unwrap();
    table.set_command(number, Some("log n")).unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    let decision = dispatcher.on_event(
        event(EventKind::Line, "foo.rb", 3, vec![("log n", true)]),
        &mut eval,
        &mut ui,
    );
    let stop = decision.stop.unwrap();
    assert_eq!(stop.command.as_deref(), Some("log n"));
    assert_eq!(stop.command_error, None);
    assert_eq!(eval.evaluated, vec!["log n"]);
}

#[test]
fn failing_command_is_reported_on_the_stop() {
    let session = session(false);
    let table = session.breakpoints();
    table.find_or_create("foo.rb", 3, true);
    table.set_command(1, Some("explode")).unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut ui = ScriptedFrontEnd::default();

    let decision = dispatcher.on_event(line("foo.rb", 3), &mut AnswerEvaluator::default(), &mut ui);
    let stop = decision.stop.unwrap();
    assert_eq!(
        stop.command_error.map(|err| err.expression),
        Some("explode".into())
    );
    assert_eq!(ui.stops.len(), 1);
}

#[test]
fn failing_condition_surfaces_and_matching_continues() {
    let session = session(false);
    let table = session.breakpoints();
    table.find_or_create("foo.rb", 9, true);
    table.set_condition(1, Some("undefined_thing")).unwrap();
    table.reposition(2, "foo.rb", 9, None, None).unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut ui = ScriptedFrontEnd::default();

    let decision = dispatcher.on_event(line("foo.rb", 9), &mut AnswerEvaluator::default(), &mut ui);
    assert_eq!(decision.failures.len(), 1);
    assert_eq!(decision.failures[0].number, 1);
    assert_eq!(decision.stop.map(|s| s.reason), Some(StopReason::Breakpoint(2)));
}

#[test]
fn failing_condition_alone_does_not_stop() {
    let session = session(false);
    session.breakpoints().find_or_create("foo.rb", 9, true);
    session.breakpoints().set_condition(1, Some("missing")).unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut ui = ScriptedFrontEnd::default();

    let decision = dispatcher.on_event(line("foo.rb", 9), &mut AnswerEvaluator::default(), &mut ui);
    assert!(!decision.stopped());
    assert_eq!(decision.failures.len(), 1);
    assert!(ui.stops.is_empty());
}

#[test]
fn stop_on_entry_stops_at_first_line() {
    let session = session(true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    let decision = dispatcher.on_event(line("main.rb", 1), &mut eval, &mut ui);
    assert_eq!(decision.stop.map(|s| s.reason), Some(StopReason::Step));
    assert_eq!(dispatcher.stop_next(), NOT_STEPPING);
    assert!(!dispatcher.on_event(line("main.rb", 2), &mut eval, &mut ui).stopped());
}

#[test]
fn step_counts_line_events_at_any_depth() {
    let session = session(true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::with_actions([ResumeAction::Step(2)]);

    assert!(dispatcher.on_event(line("main.rb", 1), &mut eval, &mut ui).stopped());
    assert!(!dispatcher.on_event(call("main.rb", 5, "helper"), &mut eval, &mut ui).stopped());
    assert!(!dispatcher.on_event(line("main.rb", 6), &mut eval, &mut ui).stopped());
    let decision = dispatcher.on_event(line("main.rb", 7), &mut eval, &mut ui);
    assert!(decision.stopped());
    assert_eq!(ui.depths, vec![0, 1]);
}

#[test]
fn next_skips_deeper_frames() {
    let session = session(true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::with_actions([ResumeAction::Next(1)]);

    dispatcher.on_event(call("main.rb", 1, "run"), &mut eval, &mut ui);
    assert!(dispatcher.on_event(line("main.rb", 2), &mut eval, &mut ui).stopped());
    assert_eq!(dispatcher.no_step(), Some(1));

    dispatcher.on_event(call("lib.rb", 10, "helper"), &mut eval, &mut ui);
    assert!(!dispatcher.on_event(line("lib.rb", 11), &mut eval, &mut ui).stopped());
    assert!(!dispatcher.on_event(line("lib.rb", 12), &mut eval, &mut ui).stopped());
    dispatcher.on_event(ret("lib.rb", 12), &mut eval, &mut ui);

    let decision = dispatcher.on_event(line("main.rb", 3), &mut eval, &mut ui);
    let stop = decision.stop.unwrap();
    assert_eq!(stop.reason, StopReason::Step);
    assert_eq!(stop.line, 3);
    assert_eq!(dispatcher.no_step(), None);
}

#[test]
fn next_stops_when_returning_to_shallower_frame() {
    let session = session(true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::with_actions([ResumeAction::Next(5)]);

    dispatcher.on_event(call("main.rb", 1, "outer"), &mut eval, &mut ui);
    dispatcher.on_event(call("main.rb", 4, "inner"), &mut eval, &mut ui);
    assert!(dispatcher.on_event(line("main.rb", 5), &mut eval, &mut ui).stopped());
    assert_eq!(dispatcher.no_step(), Some(2));

    dispatcher.on_event(ret("main.rb", 5), &mut eval, &mut ui);
    let decision = dispatcher.on_event(line("main.rb", 2), &mut eval, &mut ui);
    assert_eq!(decision.stop.map(|s| s.line), Some(2));
}

#[test]
fn finish_stops_in_caller_after_return() {
    let session = session(true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::with_actions([ResumeAction::Finish]);

    dispatcher.on_event(call("main.rb", 1, "outer"), &mut eval, &mut ui);
    dispatcher.on_event(line("main.rb", 2), &mut eval, &mut ui);
    dispatcher.on_event(call("lib.rb", 10, "inner"), &mut eval, &mut ui);
    assert_eq!(ui.stops.len(), 1);
    assert_eq!(dispatcher.finish_pos(), Some(1));

    // Deeper return leaves the finish target armed.
    dispatcher.on_event(call("lib.rb", 20, "leaf"), &mut eval, &mut ui);
    dispatcher.on_event(ret("lib.rb", 21), &mut eval, &mut ui);
    assert!(!dispatcher.on_event(line("lib.rb", 11), &mut eval, &mut ui).stopped());
    dispatcher.on_event(ret("lib.rb", 11), &mut eval, &mut ui);
    assert_eq!(dispatcher.finish_pos(), Some(1));

    dispatcher.on_event(ret("main.rb", 3), &mut eval, &mut ui);
    assert_eq!(dispatcher.finish_pos(), None);
    assert_eq!(dispatcher.stop_next(), 1);
    let decision = dispatcher.on_event(line("top.rb", 8), &mut eval, &mut ui);
    assert_eq!(decision.stop.map(|s| s.reason), Some(StopReason::Step));
}

#[test]
fn call_matches_method_breakpoint_by_owner() {
    let session = session(false);
    session.breakpoints().add_method_breakpoint("Parser", "parse");
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    let unowned = call("parser.rb", 3, "parse");
    assert!(!dispatcher.on_event(unowned, &mut eval, &mut ui).stopped());

    let owned = TraceEvent {
        owner: Some("Parser".into()),
        ..call("parser.rb", 3, "parse")
    };
    let decision = dispatcher.on_event(owned, &mut eval, &mut ui);
    let stop = decision.stop.unwrap();
    assert_eq!(stop.reason, StopReason::Breakpoint(1));
    assert_eq!(stop.id.as_deref(), Some("parse"));
    assert_eq!(dispatcher.frames().depth(), 2);
}

#[test]
fn call_matches_method_breakpoint_by_defining_file() {
    let session = session(false);
    session.breakpoints().add_method_breakpoint("lib/parser.rb", "parse");
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    assert!(!dispatcher.on_event(call("lib/other.rb", 3, "parse"), &mut eval, &mut ui).stopped());
    assert!(!dispatcher.on_event(call("lib/parser.rb", 3, "build"), &mut eval, &mut ui).stopped());

    let decision = dispatcher.on_event(call("lib/parser.rb", 7, "parse"), &mut eval, &mut ui);
    let stop = decision.stop.unwrap();
    assert_eq!(stop.reason, StopReason::Breakpoint(1));
    assert_eq!(stop.file, "/work/lib/parser.rb");
    assert_eq!(ui.stops.len(), 1);
}

#[test]
fn line_breakpoints_ignore_call_events() {
    let session = session(false);
    session.breakpoints().find_or_create("lib.rb", 10, true);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    assert!(!dispatcher.on_event(call("lib.rb", 10, "helper"), &mut eval, &mut ui).stopped());
    assert!(dispatcher.on_event(line("lib.rb", 10), &mut eval, &mut ui).stopped());
}

#[test]
fn frame_bookkeeping_per_event_kind() {
    let session = session(false);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    dispatcher.on_event(event(EventKind::Class, "a.rb", 1, Vec::new()), &mut eval, &mut ui);
    assert_eq!(dispatcher.frames().depth(), 1);
    dispatcher.on_event(call("a.rb", 2, "build"), &mut eval, &mut ui);
    assert_eq!(dispatcher.frames().depth(), 2);
    dispatcher.on_event(event(EventKind::CCall, "a.rb", 3, Vec::new()), &mut eval, &mut ui);
    assert_eq!(dispatcher.frames().depth(), 2);
    assert_eq!(dispatcher.frames().newest().map(|f| f.line), Some(3));
    assert_eq!(
        dispatcher.frames().format_frame(0).as_deref(),
        Some("#1 /work/a.rb:3:in `build'")
    );
    dispatcher.on_event(ret("a.rb", 3), &mut eval, &mut ui);
    dispatcher.on_event(event(EventKind::End, "a.rb", 4, Vec::new()), &mut eval, &mut ui);
    assert!(dispatcher.frames().is_empty());
    assert_eq!(dispatcher.position(), ("/work/a.rb", 4));
}

#[test]
fn raise_defers_to_front_end() {
    let session = session(false);
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();

    let mut quiet = ScriptedFrontEnd::default();
    let raise = || event(EventKind::Raise, "a.rb", 7, Vec::new());
    assert!(!dispatcher.on_event(raise(), &mut eval, &mut quiet).stopped());

    let mut catching = ScriptedFrontEnd {
        stop_on_raise: true,
        ..ScriptedFrontEnd::default()
    };
    let decision = dispatcher.on_event(raise(), &mut eval, &mut catching);
    assert_eq!(decision.stop.map(|s| s.reason), Some(StopReason::Exception));
    assert!(!session.suspend_control().is_suspended());
}

#[test]
fn watchpoint_fires_when_expression_turns_truthy() {
    let session = session(false);
    session.breakpoints().add_watchpoint("count > 2");
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut eval = AnswerEvaluator::default();
    let mut ui = ScriptedFrontEnd::default();

    let quiet = event(EventKind::Line, "a.rb", 1, vec![("count > 2", false)]);
    assert!(!dispatcher.on_event(quiet, &mut eval, &mut ui).stopped());
    let hot = event(EventKind::Line, "b.rb", 30, vec![("count > 2", true)]);
    let stop = dispatcher.on_event(hot, &mut eval, &mut ui).stop.unwrap();
    assert_eq!(stop.reason, StopReason::Watchpoint(1));
}

#[test]
fn removed_breakpoint_no_longer_stops() {
    let session = session(false);
    session.breakpoints().find_or_create("foo.rb", 1, true);
    session.breakpoints().remove(1).unwrap();
    let mut dispatcher = session.dispatcher::<Answers>();
    let mut ui = ScriptedFrontEnd::default();
    let decision = dispatcher.on_event(line("foo.rb", 1), &mut AnswerEvaluator::default(), &mut ui);
    assert!(!decision.stopped());
}
