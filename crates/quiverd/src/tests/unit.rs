//! Unit tests for control mapping, channels, runners and exit statuses.

use std::sync::mpsc;
use std::time::Duration;

use nix::sys::signal::Signal;
use rstest::rstest;
use signal_hook::consts::signal::{SIGCHLD, SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2};

use crate::{
    ChildExit, CommandRunner, ControlAction, ControlChannel, ManualChannel, RunOutcome, Runner,
    SignalChannel, exit_status,
};

#[rstest]
#[case(SIGTERM, ControlAction::StopGraceful)]
#[case(SIGINT, ControlAction::Detach)]
#[case(SIGQUIT, ControlAction::StopImmediate)]
#[case(SIGUSR1, ControlAction::RestartGraceful)]
#[case(SIGHUP, ControlAction::RestartImmediate)]
#[case(SIGUSR2, ControlAction::LogRotate)]
fn supervisor_signals_map_to_actions(#[case] signal: i32, #[case] expected: ControlAction) {
    assert_eq!(ControlAction::from_signal(signal), Some(expected));
}

#[rstest]
fn unrelated_signals_are_ignored() {
    assert_eq!(ControlAction::from_signal(SIGCHLD), None);
}

#[rstest]
#[case(ControlAction::StopGraceful, Signal::SIGTERM)]
#[case(ControlAction::StopImmediate, Signal::SIGQUIT)]
#[case(ControlAction::RestartGraceful, Signal::SIGUSR1)]
#[case(ControlAction::RestartImmediate, Signal::SIGHUP)]
#[case(ControlAction::LogRotate, Signal::SIGUSR2)]
#[case(ControlAction::Detach, Signal::SIGINT)]
fn actions_forward_the_matching_child_signal(
    #[case] action: ControlAction,
    #[case] expected: Signal,
) {
    assert_eq!(action.child_signal(), expected);
}

#[rstest]
fn action_names_are_distinct() {
    let mut names: Vec<&str> = ControlAction::ALL.iter().map(|action| action.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), ControlAction::ALL.len());
    assert_eq!(ControlAction::Detach.to_string(), "detach");
}

#[rstest]
#[case(RunOutcome::Exited(ChildExit::Code(0)), 0)]
#[case(RunOutcome::Exited(ChildExit::Code(42)), 42)]
#[case(RunOutcome::Exited(ChildExit::Signaled(Signal::SIGKILL)), 137)]
#[case(RunOutcome::Exited(ChildExit::Signaled(Signal::SIGTERM)), 143)]
#[case(RunOutcome::Detached { exit: None }, 0)]
#[case(RunOutcome::Detached { exit: Some(ChildExit::Code(9)) }, 0)]
#[case(RunOutcome::Lost, 1)]
fn outcomes_map_to_exit_statuses(#[case] outcome: RunOutcome, #[case] expected: u8) {
    assert_eq!(exit_status(outcome), expected);
}

#[rstest]
fn child_exit_describes_itself() {
    assert!(ChildExit::Code(0).success());
    assert!(!ChildExit::Signaled(Signal::SIGTERM).success());
    assert_eq!(ChildExit::Code(2).to_string(), "exit code 2");
    assert_eq!(ChildExit::Signaled(Signal::SIGHUP).to_string(), "signal SIGHUP");
}

#[rstest]
fn command_runner_builds_from_argv() {
    let runner = CommandRunner::from_argv(["worker", "--queue", "default"]).expect("non-empty argv");
    assert_eq!(runner.program(), "worker");
    assert_eq!(runner.describe(), "worker --queue default");
    let command = runner.command();
    let args: Vec<_> = command.get_args().collect();
    assert_eq!(args, ["--queue", "default"]);
}

#[rstest]
fn command_runner_rejects_empty_argv() {
    assert!(CommandRunner::from_argv(Vec::<String>::new()).is_none());
}

#[rstest]
fn manual_channel_drops_actions_until_installed() {
    let channel = ManualChannel::new();
    assert!(!channel.is_installed());
    assert!(!channel.send(ControlAction::LogRotate));
}

#[rstest]
fn manual_channel_forwards_while_guard_is_held() {
    let channel = ManualChannel::new();
    let (sender, receiver) = mpsc::channel();
    let guard = channel.install(sender).expect("manual install never fails");

    assert!(channel.clone().send(ControlAction::RestartGraceful));
    assert_eq!(receiver.recv().expect("action"), ControlAction::RestartGraceful);

    guard.close();
    assert!(!channel.is_installed());
    assert!(!channel.send(ControlAction::StopGraceful));
    assert!(receiver.recv().is_err(), "closing releases the sender");
}

#[rstest]
fn dropping_the_guard_closes_the_channel() {
    let channel = ManualChannel::new();
    let (sender, _receiver) = mpsc::channel();
    drop(channel.install(sender).expect("install"));
    assert!(!channel.is_installed());
}

#[rstest]
fn signal_channel_translates_delivered_signals() {
    let (sender, receiver) = mpsc::channel();
    let guard = SignalChannel::new().install(sender).expect("install handlers");

    signal_hook::low_level::raise(SIGUSR2).expect("raise SIGUSR2");
    let action = receiver
        .recv_timeout(Duration::from_secs(5))
        .expect("forwarded action");
    assert_eq!(action, ControlAction::LogRotate);

    guard.close();
    assert!(
        receiver.recv_timeout(Duration::from_secs(1)).is_err(),
        "forwarding thread must release the sender"
    );
}

#[rstest]
fn usage_errors_are_reported_on_stderr() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let _ = crate::run(["quiverd", "--log-format", "compact"], &mut stdout, &mut stderr);
    let rendered = String::from_utf8(stderr).expect("utf-8 output");
    assert!(rendered.contains("COMMAND"), "unexpected output: {rendered}");
    assert!(stdout.is_empty());
}

#[rstest]
fn help_is_written_to_stdout() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let _ = crate::run(["quiverd", "--help"], &mut stdout, &mut stderr);
    let rendered = String::from_utf8(stdout).expect("utf-8 output");
    assert!(rendered.contains("--detach-wait"), "unexpected help: {rendered}");
    assert!(stderr.is_empty());
}

#[rstest]
fn invalid_configuration_fails_before_spawning() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let _ = crate::run(
        ["quiverd", "--detach-wait=-1", "--", "true"],
        &mut stdout,
        &mut stderr,
    );
    let rendered = String::from_utf8(stderr).expect("utf-8 output");
    assert!(rendered.starts_with("quiverd: failed to load configuration"), "{rendered}");
}
