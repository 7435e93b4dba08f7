//! Mapping from requests to package-manager command lines.

use std::fmt;
use std::time::Duration;

use crate::config::{CommandsConfig, ManagerConfig};
use crate::error::StartupError;
use crate::input::Param;
use crate::menu::MenuAction;

/// A fully parameterized package-manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Upgrade { package: String },
    Downgrade { package: String, version: String },
    Uninstall { package: String },
    Search { query: String },
}

impl Request {
    /// Builds the request for `action` from prompt answers.
    ///
    /// Returns `None` for `Quit` or when a required value is missing.
    pub fn from_params(action: MenuAction, values: &[(Param, String)]) -> Option<Request> {
        let get = |param: Param| {
            values
                .iter()
                .find(|(p, _)| *p == param)
                .map(|(_, v)| v.clone())
        };
        match action {
            MenuAction::List => Some(Request::List),
            MenuAction::Upgrade => Some(Request::Upgrade {
                package: get(Param::Package)?,
            }),
            MenuAction::Downgrade => Some(Request::Downgrade {
                package: get(Param::Package)?,
                version: get(Param::Version)?,
            }),
            MenuAction::Uninstall => Some(Request::Uninstall {
                package: get(Param::Package)?,
            }),
            MenuAction::Search => Some(Request::Search {
                query: get(Param::Query)?,
            }),
            MenuAction::Quit => None,
        }
    }

    pub fn action(&self) -> MenuAction {
        match self {
            Request::List => MenuAction::List,
            Request::Upgrade { .. } => MenuAction::Upgrade,
            Request::Downgrade { .. } => MenuAction::Downgrade,
            Request::Uninstall { .. } => MenuAction::Uninstall,
            Request::Search { .. } => MenuAction::Search,
        }
    }

    /// Whether a successful run changes installed packages.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Request::Upgrade { .. } | Request::Downgrade { .. } | Request::Uninstall { .. }
        )
    }

    fn values(&self) -> Vec<(Param, &str)> {
        match self {
            Request::List => vec![],
            Request::Upgrade { package } | Request::Uninstall { package } => {
                vec![(Param::Package, package.as_str())]
            }
            Request::Downgrade { package, version } => vec![
                (Param::Package, package.as_str()),
                (Param::Version, version.as_str()),
            ],
            Request::Search { query } => vec![(Param::Query, query.as_str())],
        }
    }

    /// Past-tense summary used for status messages and the log.
    pub fn success_message(&self) -> String {
        match self {
            Request::List => "Listed installed packages".to_string(),
            Request::Upgrade { package } => format!("Successfully upgraded {package}"),
            Request::Downgrade { package, version } => {
                format!("Successfully installed {package} version {version}")
            }
            Request::Uninstall { package } => format!("Successfully uninstalled {package}"),
            Request::Search { query } => format!("Searched for {query}"),
        }
    }

    pub fn failure_message(&self) -> String {
        match self {
            Request::List => "Failed to list packages".to_string(),
            Request::Upgrade { package } => format!("Failed to upgrade {package}"),
            Request::Downgrade { package, version } => {
                format!("Failed to install {package} version {version}")
            }
            Request::Uninstall { package } => format!("Failed to uninstall {package}"),
            Request::Search { query } => format!("Search for {query} failed"),
        }
    }
}

/// Read-only queries run to fill the package and version pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Installed,
    Outdated,
    Versions { package: String },
}

/// The exact argv that gets spawned. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Program followed by arguments, for assertions and display.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.argv().into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if part.is_empty() || part.chars().any(char::is_whitespace) {
                write!(f, "'{part}'")?;
            } else {
                f.write_str(part)?;
            }
        }
        Ok(())
    }
}

/// Captured outcome of one invocation. stdout and stderr are kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Validated argv templates, one per request kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    program: String,
    base_args: Vec<String>,
    list: Vec<String>,
    outdated: Vec<String>,
    upgrade: Vec<String>,
    downgrade: Vec<String>,
    uninstall: Vec<String>,
    search: Vec<String>,
}

impl CommandTable {
    pub fn from_config(
        manager: &ManagerConfig,
        commands: &CommandsConfig,
    ) -> Result<Self, StartupError> {
        if manager.program.trim().is_empty() {
            return Err(StartupError::InvalidTemplate {
                command: "manager.program",
                reason: "program is empty".to_string(),
            });
        }
        let checks: [(&'static str, &[Param], &[String]); 6] = [
            ("list", MenuAction::List.params(), commands.list.as_slice()),
            ("outdated", &[], commands.outdated.as_slice()),
            ("upgrade", MenuAction::Upgrade.params(), commands.upgrade.as_slice()),
            ("downgrade", MenuAction::Downgrade.params(), commands.downgrade.as_slice()),
            ("uninstall", MenuAction::Uninstall.params(), commands.uninstall.as_slice()),
            ("search", MenuAction::Search.params(), commands.search.as_slice()),
        ];
        for (name, params, template) in checks {
            check_template(name, params, template)?;
        }
        Ok(Self {
            program: manager.program.clone(),
            base_args: manager.base_args.clone(),
            list: commands.list.clone(),
            outdated: commands.outdated.clone(),
            upgrade: commands.upgrade.clone(),
            downgrade: commands.downgrade.clone(),
            uninstall: commands.uninstall.clone(),
            search: commands.search.clone(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn template(&self, request: &Request) -> &[String] {
        match request {
            Request::List => &self.list,
            Request::Upgrade { .. } => &self.upgrade,
            Request::Downgrade { .. } => &self.downgrade,
            Request::Uninstall { .. } => &self.uninstall,
            Request::Search { .. } => &self.search,
        }
    }

    pub fn invocation(&self, request: &Request) -> Invocation {
        self.render(self.template(request), &request.values())
    }

    /// The search template doubles as the version lookup, with the package as query.
    pub fn lookup_invocation(&self, lookup: &Lookup) -> Invocation {
        match lookup {
            Lookup::Installed => self.render(&self.list, &[]),
            Lookup::Outdated => self.render(&self.outdated, &[]),
            Lookup::Versions { package } => {
                self.render(&self.search, &[(Param::Query, package.as_str())])
            }
        }
    }

    fn render(&self, template: &[String], values: &[(Param, &str)]) -> Invocation {
        let args = self
            .base_args
            .iter()
            .cloned()
            .chain(template.iter().map(|token| substitute(token, values)))
            .collect();
        Invocation::new(self.program.clone(), args)
    }
}

/// Replaces `{name}` placeholders in a single left-to-right pass. Inserted
/// values are never scanned again, so a value that looks like a placeholder
/// stays literal.
fn substitute(token: &str, values: &[(Param, &str)]) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(param, _)| param.placeholder() == name)
                .map(|(_, value)| (*value, end))
        });
        match hit {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Names between `{` and `}` in a template token.
fn placeholders(token: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = token;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            found.push(name);
        }
        rest = &after[end + 1..];
    }
    found
}

fn check_template(
    command: &'static str,
    params: &[Param],
    template: &[String],
) -> Result<(), StartupError> {
    let fail = |reason: String| StartupError::InvalidTemplate { command, reason };
    if template.is_empty() {
        return Err(fail("template is empty".to_string()));
    }
    let used: Vec<&str> = template.iter().flat_map(|t| placeholders(t)).collect();
    if let Some(unknown) = used
        .iter()
        .find(|name| !params.iter().any(|p| p.placeholder() == **name))
    {
        return Err(fail(format!("unknown placeholder {{{unknown}}}")));
    }
    if let Some(missing) = params.iter().find(|p| !used.contains(&p.placeholder())) {
        return Err(fail(format!(
            "missing placeholder {{{}}}",
            missing.placeholder()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CommandTable {
        CommandTable::from_config(&ManagerConfig::default(), &CommandsConfig::default()).unwrap()
    }

    #[test]
    fn list_has_no_parameters() {
        let inv = table().invocation(&Request::List);
        assert_eq!(inv.argv(), vec!["python3", "-m", "pip", "list"]);
    }

    #[test]
    fn upgrade_carries_package_literally() {
        let inv = table().invocation(&Request::Upgrade {
            package: "requests".to_string(),
        });
        assert!(inv.args.contains(&"install".to_string()));
        assert!(inv.args.contains(&"--upgrade".to_string()));
        assert!(inv.args.contains(&"requests".to_string()));
    }

    #[test]
    fn downgrade_pins_exact_version() {
        let inv = table().invocation(&Request::Downgrade {
            package: "requests".to_string(),
            version: "2.25.0".to_string(),
        });
        assert_eq!(
            inv.argv(),
            vec!["python3", "-m", "pip", "install", "requests==2.25.0"]
        );
    }

    #[test]
    fn from_params_requires_every_value() {
        let values = vec![(Param::Package, "requests".to_string())];
        assert_eq!(Request::from_params(MenuAction::Downgrade, &values), None);
        assert_eq!(
            Request::from_params(MenuAction::Uninstall, &values),
            Some(Request::Uninstall {
                package: "requests".to_string()
            })
        );
        assert_eq!(Request::from_params(MenuAction::Quit, &values), None);
        assert_eq!(Request::from_params(MenuAction::List, &[]), Some(Request::List));
    }

    #[test]
    fn placeholder_scan() {
        assert_eq!(placeholders("{package}=={version}"), vec!["package", "version"]);
        assert!(placeholders("--index-url").is_empty());
        assert!(placeholders("{ not a name }").is_empty());
        assert!(placeholders("{unterminated").is_empty());
    }

    #[test]
    fn template_missing_placeholder_is_rejected() {
        let commands = CommandsConfig {
            upgrade: vec!["install".to_string(), "--upgrade".to_string()],
            ..CommandsConfig::default()
        };
        let err = CommandTable::from_config(&ManagerConfig::default(), &commands).unwrap_err();
        assert!(matches!(
            err,
            StartupError::InvalidTemplate {
                command: "upgrade",
                ..
            }
        ));
        assert!(err.to_string().contains("missing placeholder {package}"));
    }

    #[test]
    fn template_unknown_placeholder_is_rejected() {
        let commands = CommandsConfig {
            list: vec!["list".to_string(), "{package}".to_string()],
            ..CommandsConfig::default()
        };
        let err = CommandTable::from_config(&ManagerConfig::default(), &commands).unwrap_err();
        assert!(err.to_string().contains("unknown placeholder {package}"));
    }

    #[test]
    fn empty_program_is_rejected() {
        let manager = ManagerConfig {
            program: "  ".to_string(),
            ..ManagerConfig::default()
        };
        assert!(CommandTable::from_config(&manager, &CommandsConfig::default()).is_err());
    }

    #[test]
    fn substitution_does_not_rescan_values() {
        let values = [(Param::Package, "{version}"), (Param::Version, "2.25.0")];
        assert_eq!(substitute("{package}=={version}", &values), "{version}==2.25.0");
        assert_eq!(substitute("{other}-{package}", &values), "{other}-{version}");
        assert_eq!(substitute("{package", &values), "{package");
    }

    #[test]
    fn lookups_reuse_list_and_search_templates() {
        let table = table();
        assert_eq!(
            table.lookup_invocation(&Lookup::Installed).argv(),
            vec!["python3", "-m", "pip", "list"]
        );
        assert_eq!(
            table.lookup_invocation(&Lookup::Outdated).argv(),
            vec!["python3", "-m", "pip", "list", "--outdated"]
        );
        assert_eq!(
            table
                .lookup_invocation(&Lookup::Versions {
                    package: "requests".to_string()
                })
                .argv(),
            vec!["python3", "-m", "pip", "index", "versions", "requests"]
        );
    }

    #[test]
    fn outdated_template_takes_no_placeholders() {
        let commands = CommandsConfig {
            outdated: vec!["list".to_string(), "{package}".to_string()],
            ..CommandsConfig::default()
        };
        let err = CommandTable::from_config(&ManagerConfig::default(), &commands).unwrap_err();
        assert!(matches!(
            err,
            StartupError::InvalidTemplate {
                command: "outdated",
                ..
            }
        ));
    }

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let inv = Invocation::new("pip", vec!["index".into(), "versions".into(), "a b".into()]);
        assert_eq!(inv.to_string(), "pip index versions 'a b'");
    }
}
