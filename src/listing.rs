//! Parsers for package-manager output that feeds the pickers.
//!
//! The formats are pip's column tables (`pip list`, `pip list --outdated`)
//! and the `Available versions:` line of `pip index versions`. Output that
//! does not match yields nothing and the caller falls back to typed input.

use unicode_width::UnicodeWidthStr;

use crate::input::Param;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub latest: Option<String>,
}

impl InstalledPackage {
    pub fn has_update(&self) -> bool {
        self.latest.as_ref().is_some_and(|latest| *latest != self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
}

/// Versions offered by the index, newest first, as the manager printed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionListing {
    pub versions: Vec<String>,
    pub installed: Option<String>,
}

/// Whitespace-split rows of a column table.
///
/// Rows after a `----- -----` rule are taken when one is present. Without a
/// rule every line is a candidate. Either way a row needs a package-like
/// first column and a version-like second column, which drops headers and
/// chatter.
fn table_rows(output: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = output.lines().collect();
    let is_rule = |line: &&str| {
        let line = line.trim();
        line.contains('-') && line.chars().all(|c| c == '-' || c.is_whitespace())
    };
    let body = match lines.iter().position(is_rule) {
        Some(rule) => &lines[rule + 1..],
        None => &lines[..],
    };
    body.iter()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|parts| parts.len() >= 2 && is_name(parts[0]) && is_version(parts[1]))
        .collect()
}

fn is_name(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphanumeric())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

fn is_version(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit()) && Param::Version.validate(s).is_ok()
}

pub fn parse_installed(output: &str) -> Vec<InstalledPackage> {
    table_rows(output)
        .into_iter()
        .map(|parts| InstalledPackage {
            name: parts[0].to_string(),
            version: parts[1].to_string(),
            latest: None,
        })
        .collect()
}

pub fn parse_outdated(output: &str) -> Vec<PackageUpdate> {
    table_rows(output)
        .into_iter()
        .filter(|parts| parts.len() >= 3 && is_version(parts[2]))
        .map(|parts| PackageUpdate {
            name: parts[0].to_string(),
            current_version: parts[1].to_string(),
            latest_version: parts[2].to_string(),
        })
        .collect()
}

/// Attaches `latest` to installed packages. Names compare case-insensitively.
pub fn merge_updates(installed: &mut [InstalledPackage], updates: &[PackageUpdate]) {
    for update in updates {
        if let Some(pack) = installed
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&update.name))
        {
            pack.latest = Some(update.latest_version.clone());
        }
    }
}

pub fn parse_versions(output: &str) -> Option<VersionListing> {
    let mut versions = None;
    let mut installed = None;
    for line in output.lines() {
        if let Some((_, list)) = line.split_once("Available versions:") {
            versions = Some(
                list.split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            );
        } else if let Some(value) = line.trim().strip_prefix("INSTALLED:") {
            let value = value.trim();
            if !value.is_empty() {
                installed = Some(value.to_string());
            }
        }
    }
    let versions = versions.filter(|v| !v.is_empty())?;
    Some(VersionListing {
        versions,
        installed,
    })
}

/// Aligned `name  installed → latest` labels.
pub fn package_labels(packages: &[InstalledPackage]) -> Vec<String> {
    let name_width = packages.iter().map(|p| p.name.width()).max().unwrap_or(0);
    let version_width = packages
        .iter()
        .map(|p| p.version.width())
        .max()
        .unwrap_or(0);
    packages
        .iter()
        .map(|p| {
            let base = format!(
                "{:<name_width$}  {:>version_width$}",
                p.name, p.version
            );
            match &p.latest {
                Some(latest) if p.has_update() => format!("{base} → {latest}"),
                _ => base.trim_end().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIP_LIST: &str = "\
Package            Version
------------------ ---------
certifi            2024.2.2
numpy              1.26.4
requests           2.28.0
";

    const PIP_OUTDATED: &str = "\
Package    Version Latest Type
---------- ------- ------ -----
numpy      1.26.4  2.0.0  wheel
Requests   2.28.0  2.31.0 wheel
";

    const PIP_INDEX: &str = "\
WARNING: pip index is currently an experimental command.
requests (2.31.0)
Available versions: 2.31.0, 2.30.0, 2.29.0, 2.28.2
  INSTALLED: 2.28.0
  LATEST:    2.31.0
";

    #[test]
    fn installed_rows_follow_the_rule_line() {
        let packages = parse_installed(PIP_LIST);
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["certifi", "numpy", "requests"]);
        assert_eq!(packages[1].version, "1.26.4");
        assert!(packages.iter().all(|p| p.latest.is_none()));
    }

    #[test]
    fn editable_location_column_is_ignored() {
        let output = "\
Package Version Editable project location
------- ------- -------------------------
mylib   0.1.0   /home/me/src/mylib
";
        let packages = parse_installed(output);
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "mylib");
        assert_eq!(packages[0].version, "0.1.0");
    }

    #[test]
    fn table_without_rule_skips_header() {
        let packages = parse_installed("Package Version\nflask 3.0.0\n");
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "flask");
    }

    #[test]
    fn unrelated_output_parses_to_nothing() {
        assert!(parse_installed("").is_empty());
        assert!(parse_installed("Usage: pkg <command>\n").is_empty());
        assert!(parse_versions("ERROR: No matching distribution found").is_none());
        assert!(parse_versions("Available versions: \n").is_none());
    }

    #[test]
    fn outdated_merges_case_insensitively() {
        let mut packages = parse_installed(PIP_LIST);
        let updates = parse_outdated(PIP_OUTDATED);
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].current_version, "2.28.0");
        merge_updates(&mut packages, &updates);

        assert_eq!(packages[0].latest, None);
        assert_eq!(packages[1].latest.as_deref(), Some("2.0.0"));
        assert_eq!(packages[2].latest.as_deref(), Some("2.31.0"));
        assert!(packages[2].has_update());
    }

    #[test]
    fn index_output_gives_versions_and_installed() {
        let listing = parse_versions(PIP_INDEX).unwrap();
        assert_eq!(listing.versions, vec!["2.31.0", "2.30.0", "2.29.0", "2.28.2"]);
        assert_eq!(listing.installed.as_deref(), Some("2.28.0"));
    }

    #[test]
    fn labels_align_and_show_updates() {
        let packages = vec![
            InstalledPackage {
                name: "numpy".to_string(),
                version: "1.26.4".to_string(),
                latest: Some("2.0.0".to_string()),
            },
            InstalledPackage {
                name: "requests".to_string(),
                version: "2.31.0".to_string(),
                latest: Some("2.31.0".to_string()),
            },
        ];
        assert_eq!(
            package_labels(&packages),
            vec!["numpy     1.26.4 → 2.0.0", "requests  2.31.0"]
        );
    }
}
