//! Test suites for the worker supervisor.

mod support;
mod unit;
