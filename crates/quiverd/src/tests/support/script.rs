//! Shell children that record the signals they receive.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use tempfile::TempDir;

use crate::{CommandRunner, WorkerController};

const POLL: Duration = Duration::from_millis(20);

/// Traps every control signal, appending its name to `$1`. Touches `$2` once
/// the traps are in place. `$3` decides whether `SIGINT` ends the script.
const TRAPPING_SCRIPT: &str = r#"
log="$1"
ready="$2"
for sig in TERM USR1 HUP USR2; do
    trap "echo $sig >> \"$log\"" "$sig"
done
trap 'echo QUIT >> "$log"; exit 3' QUIT
if [ "$3" = exit ]; then
    trap 'echo INT >> "$log"; exit 0' INT
else
    trap 'echo INT >> "$log"' INT
fi
: > "$ready"
while :; do
    sleep 0.05
done
"#;

/// How the scripted child reacts to `SIGINT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntBehaviour {
    Exit,
    Stay,
}

/// A long-running child whose received signals can be inspected.
pub(crate) struct ScriptedChild {
    dir: TempDir,
    on_int: IntBehaviour,
}

impl ScriptedChild {
    pub(crate) fn new(on_int: IntBehaviour) -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
            on_int,
        }
    }

    pub(crate) fn runner(&self) -> CommandRunner {
        let int_mode = match self.on_int {
            IntBehaviour::Exit => "exit",
            IntBehaviour::Stay => "stay",
        };
        CommandRunner::new("sh")
            .args(["-c", TRAPPING_SCRIPT, "quiver-test-child"])
            .arg(self.log_path())
            .arg(self.ready_path())
            .arg(int_mode)
    }

    fn log_path(&self) -> PathBuf {
        self.dir.path().join("signals.log")
    }

    fn ready_path(&self) -> PathBuf {
        self.dir.path().join("ready")
    }

    /// Blocks until the child has installed its traps.
    pub(crate) fn wait_until_ready(&self, controller: &WorkerController) {
        wait_for(|| controller.pid().is_some() && self.ready_path().exists())
            .expect("scripted child should become ready");
    }

    /// Blocks until the child has recorded `signal`.
    pub(crate) fn wait_for_signal(&self, signal: &str) {
        wait_for(|| self.received().iter().any(|seen| seen == signal))
            .unwrap_or_else(|()| panic!("child never recorded {signal}: {:?}", self.received()));
    }

    /// Signal names in the order the child handled them.
    pub(crate) fn received(&self) -> Vec<String> {
        read_lines(&self.log_path())
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn wait_for(mut condition: impl FnMut() -> bool) -> Result<(), ()> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition() {
            return Ok(());
        }
        thread::sleep(POLL);
    }
    Err(())
}

/// Kills and reaps a child left running by a detached worker.
pub(crate) fn reap_leftover(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    let pid = Pid::from_raw(pid);
    if kill(pid, Signal::SIGKILL).is_ok() {
        waitpid(pid, None).ok();
    }
}
