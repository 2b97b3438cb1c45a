//! Unit tests for configuration parsing and layering.
