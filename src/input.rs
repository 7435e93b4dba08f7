use std::fmt;

use crate::error::InputError;

/// A value the user is prompted for before a request can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Package,
    Version,
    Query,
}

impl Param {
    pub fn label(self) -> &'static str {
        match self {
            Param::Package => "package name",
            Param::Version => "version",
            Param::Query => "search term",
        }
    }

    /// Name used inside `{...}` in command templates.
    pub fn placeholder(self) -> &'static str {
        match self {
            Param::Package => "package",
            Param::Version => "version",
            Param::Query => "query",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Param::Package => "Package name",
            Param::Version => "Target version",
            Param::Query => "Search for",
        }
    }

    /// Trims and checks `raw`, returning the value that goes into the command line.
    pub fn validate(self, raw: &str) -> Result<String, InputError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(InputError::Empty { field: self });
        }
        match self {
            Param::Package => validate_package(value),
            Param::Version => validate_version(value),
            Param::Query => validate_query(value),
        }?;
        Ok(value.to_string())
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn invalid(field: Param, value: &str, reason: &'static str) -> InputError {
    InputError::Invalid {
        field,
        value: value.to_string(),
        reason,
    }
}

fn validate_package(value: &str) -> Result<(), InputError> {
    if value.starts_with('-') {
        return Err(invalid(Param::Package, value, "must not start with '-'"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(Param::Package, value, "must not contain spaces"));
    }
    Ok(())
}

fn validate_version(value: &str) -> Result<(), InputError> {
    let starts_ok = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok {
        return Err(invalid(
            Param::Version,
            value,
            "must start with a letter or digit",
        ));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '!' | '*' | '_' | '-');
    if !value.chars().all(allowed) {
        return Err(invalid(
            Param::Version,
            value,
            "may only contain letters, digits and . + ! * _ -",
        ));
    }
    Ok(())
}

fn validate_query(value: &str) -> Result<(), InputError> {
    if value.starts_with('-') {
        return Err(invalid(Param::Query, value, "must not start with '-'"));
    }
    Ok(())
}
