use insta::assert_debug_snapshot;
use pkgmenu::command::{CommandTable, Request};
use pkgmenu::config::{CommandsConfig, ManagerConfig};
use pkgmenu::error::StartupError;

fn every_request() -> Vec<Request> {
    vec![
        Request::List,
        Request::Upgrade {
            package: "requests".to_string(),
        },
        Request::Downgrade {
            package: "requests".to_string(),
            version: "2.31.0".to_string(),
        },
        Request::Uninstall {
            package: "requests".to_string(),
        },
        Request::Search {
            query: "requests".to_string(),
        },
    ]
}

fn command_lines(table: &CommandTable) -> Vec<String> {
    every_request()
        .iter()
        .map(|request| table.invocation(request).to_string())
        .collect()
}

#[test]
fn default_pip_command_lines() {
    let table =
        CommandTable::from_config(&ManagerConfig::default(), &CommandsConfig::default()).unwrap();
    assert_debug_snapshot!("default_pip_command_lines", command_lines(&table));
}

#[test]
fn custom_manager_command_lines() {
    let manager = ManagerConfig {
        program: "uv".to_string(),
        base_args: vec!["pip".to_string()],
        version_args: vec!["--version".to_string()],
    };
    let commands = CommandsConfig {
        downgrade: vec![
            "install".to_string(),
            "{package}=={version}".to_string(),
            "--reinstall".to_string(),
        ],
        ..CommandsConfig::default()
    };
    let table = CommandTable::from_config(&manager, &commands).unwrap();
    assert_debug_snapshot!("custom_manager_command_lines", command_lines(&table));
}

#[test]
fn package_values_stay_single_arguments() {
    let table =
        CommandTable::from_config(&ManagerConfig::default(), &CommandsConfig::default()).unwrap();
    let invocation = table.invocation(&Request::Search {
        query: "requests; rm -rf ~".to_string(),
    });
    assert_eq!(invocation.args.last().unwrap(), "requests; rm -rf ~");
    assert_eq!(invocation.args.len(), 5);
}

#[test]
fn placeholder_lookalike_package_is_passed_literally() {
    let table =
        CommandTable::from_config(&ManagerConfig::default(), &CommandsConfig::default()).unwrap();
    let invocation = table.invocation(&Request::Downgrade {
        package: "{version}".to_string(),
        version: "2.25.0".to_string(),
    });
    assert_eq!(
        invocation.argv(),
        vec!["python3", "-m", "pip", "install", "{version}==2.25.0"]
    );

    let invocation = table.invocation(&Request::Upgrade {
        package: "{package}".to_string(),
    });
    assert_eq!(invocation.args.last().unwrap(), "{package}");
}

#[test]
fn template_missing_version_is_rejected() {
    let commands = CommandsConfig {
        downgrade: vec!["install".to_string(), "{package}".to_string()],
        ..CommandsConfig::default()
    };
    let err = CommandTable::from_config(&ManagerConfig::default(), &commands).unwrap_err();
    match err {
        StartupError::InvalidTemplate { command, reason } => {
            assert_eq!(command, "downgrade");
            assert!(reason.contains("{version}"), "{reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
