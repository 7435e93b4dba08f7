use std::time::Duration;

use crate::command::Invocation;
use crate::config::ManagerConfig;
use crate::error::{DispatchError, StartupError, describe_exit};
use crate::system::executor::Executor;

/// Checks that the package manager can be started before the menu opens.
///
/// Returns the first line the version check printed (usually a version banner).
pub async fn check_manager(
    manager: &ManagerConfig,
    timeout: Duration,
) -> Result<String, StartupError> {
    let args = manager
        .base_args
        .iter()
        .chain(manager.version_args.iter())
        .cloned()
        .collect();
    let invocation = Invocation::new(manager.program.clone(), args);

    match Executor::new(Some(timeout)).run(&invocation).await {
        Ok(result) => {
            let banner = first_line(&result.stdout)
                .or_else(|| first_line(&result.stderr))
                .unwrap_or_else(|| manager.program.clone());
            tracing::info!(%banner, "package manager available");
            Ok(banner)
        }
        Err(DispatchError::Execution { program, source }) => {
            Err(StartupError::ManagerMissing { program, source })
        }
        Err(DispatchError::NonZeroExit { result }) => Err(StartupError::ManagerUnusable {
            program: manager.program.clone(),
            status: describe_exit(result.exit_code),
            stderr: first_line(&result.stderr).unwrap_or_default(),
        }),
        Err(DispatchError::TimedOut { program, after }) => {
            Err(StartupError::CheckTimedOut { program, after })
        }
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_skips_blank_lines() {
        assert_eq!(
            first_line("\n  \npip 24.0 from /usr/lib\nmore"),
            Some("pip 24.0 from /usr/lib".to_string())
        );
        assert_eq!(first_line("   \n"), None);
    }

    #[tokio::test]
    async fn absent_manager_is_startup_error() {
        let manager = ManagerConfig {
            program: "pkgmenu-no-such-manager".to_string(),
            ..ManagerConfig::default()
        };
        let err = check_manager(&manager, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::ManagerMissing { .. }));
    }
}
