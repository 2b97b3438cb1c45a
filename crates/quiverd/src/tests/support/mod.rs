//! Shared fixtures for the supervisor test suites.

mod logs;
mod script;

pub(crate) use logs::CapturedLogs;
pub(crate) use script::{IntBehaviour, ScriptedChild, reap_leftover};
