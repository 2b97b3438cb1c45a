//! Behavioural coverage of configuration layering.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ortho_config::OrthoConfig;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use quiver_config::{Config, LogSink};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _env_guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let env_guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self {
            temp_dir,
            cli_args: RefCell::new(vec![OsString::from("quiverd")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _env_guard: env_guard,
        }
    }

    fn write_config(&self, body: &str) {
        let path = self.temp_dir.path().join("quiver.toml");
        if let Err(error) = fs::write(&path, body) {
            panic!("failed to write configuration: {error}");
        }
        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn set_env(&self, key: &str, value: &str) {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` in edition 2024. The harness holds
        // `ENV_MUTEX` and restores overrides in `Drop`.
        unsafe { std::env::set_var(key, value) };
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }
        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error.to_string()),
        }
    }

    fn config(&self) -> Config {
        self.load();
        match self.loaded.borrow().as_ref() {
            Some(config) => config.clone(),
            None => panic!(
                "configuration failed to load: {}",
                self.error.borrow().as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting detach_wait to {seconds}")]
fn given_file_detach_wait(harness: &Harness, seconds: f64) {
    harness.write_config(&format!("detach_wait = {seconds:?}\nlogger = \"stdout\"\n"));
}

#[given("the environment sets detach_wait to {seconds}")]
fn given_env_detach_wait(harness: &Harness, seconds: String) {
    harness.set_env("QUIVER_DETACH_WAIT", &seconds);
}

#[given("the command line sets detach_wait to {seconds}")]
fn given_cli_detach_wait(harness: &Harness, seconds: String) {
    harness.push_cli_arg("--detach-wait");
    harness.push_cli_arg(seconds);
}

#[when("the configuration is loaded")]
fn when_loaded(harness: &Harness) {
    harness.load();
}

#[then("the detach window is {millis} milliseconds")]
fn then_detach_window(harness: &Harness, millis: u64) {
    assert_eq!(harness.config().detach_wait(), Duration::from_millis(millis));
}

#[then("logs go to standard output")]
fn then_logs_to_stdout(harness: &Harness) {
    assert_eq!(harness.config().logger(), &LogSink::Stdout);
}

#[then("logs go to standard error")]
fn then_logs_to_stderr(harness: &Harness) {
    assert_eq!(harness.config().logger(), &LogSink::Stderr);
}

#[scenario(path = "tests/features/configuration_precedence.feature")]
fn configuration_precedence(#[from(harness)] harness: Harness) {
    let _ = harness;
}
