//! Splits supervisor configuration flags from the supervised command.
//!
//! Configuration flags lead the command line and are handed to
//! `ortho_config`; everything from the first other token onwards is parsed as
//! the invocation proper.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use quiver_config::{Config, ConfigError};

/// Flags consumed by the configuration loader.
///
/// MAINTENANCE: keep in step with the fields of [`Config`] plus
/// `--config-path`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--logger",
    "--detach-wait",
    "--log-filter",
    "--log-format",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Skip;
    }
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Skip
    }
}

/// Arguments for the configuration loader and for the invocation. Both start
/// with the binary name.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((binary, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };
    let mut config_arguments = vec![binary.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![binary.clone()];
    while let Some(argument) = remaining.next() {
        match process_config_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value && let Some(value) = remaining.next() {
                    config_arguments.push(value.clone());
                }
            }
            FlagAction::Skip => {
                command_arguments.push(argument.clone());
                break;
            }
        }
    }
    command_arguments.extend(remaining.cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

/// Loads configuration from the leading configuration flags.
pub(crate) fn load_config(config_arguments: &[OsString]) -> Result<Config, ConfigError> {
    Config::load_from_iter(config_arguments.iter().cloned()).map_err(ConfigError::from)
}
