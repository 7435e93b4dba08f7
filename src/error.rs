use std::time::Duration;

use thiserror::Error;

use crate::command::CommandResult;
use crate::input::Param;

/// Fatal problems detected before the menu is shown.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("package manager `{program}` could not be started: {source}")]
    ManagerMissing {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("package manager `{program}` is not usable (exit {status}): {stderr}")]
    ManagerUnusable {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("package manager `{program}` did not answer within {after:?}")]
    CheckTimedOut { program: String, after: Duration },
    #[error("invalid `{command}` command template: {reason}")]
    InvalidTemplate {
        command: &'static str,
        reason: String,
    },
}

/// Recoverable failures of a single package-manager invocation.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to start `{program}`: {source}")]
    Execution {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command exited with {}", describe_exit(.result.exit_code))]
    NonZeroExit { result: CommandResult },
    #[error("`{program}` timed out after {after:?} and was stopped")]
    TimedOut { program: String, after: Duration },
}

/// Rejected prompt input. The same field is asked again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must not be empty")]
    Empty { field: Param },
    #[error("invalid {field} `{value}`: {reason}")]
    Invalid {
        field: Param,
        value: String,
        reason: &'static str,
    },
}

pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_zero_exit_message_names_the_status() {
        let err = DispatchError::NonZeroExit {
            result: CommandResult {
                exit_code: Some(2),
                stdout: String::new(),
                stderr: "boom".to_string(),
                elapsed: Duration::from_millis(5),
            },
        };
        assert_eq!(err.to_string(), "command exited with status 2");
    }

    #[test]
    fn input_error_uses_field_label() {
        let err = InputError::Empty {
            field: Param::Package,
        };
        assert_eq!(err.to_string(), "package name must not be empty");
    }
}
