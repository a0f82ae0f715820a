//! Splitting of raw requirement lines.

use std::fmt;

/// A raw Python requirement split into its three parts.
///
/// For `foo<7,>2; sys_platform == 'win32'` the parts are `foo`, `<7,>2` and
/// `sys_platform == 'win32'`. The marker is kept verbatim for the marker
/// translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    version_specifiers: Option<String>,
    marker: Option<String>,
}

impl Requirement {
    /// Split a requirement line into name, version specifiers and marker.
    ///
    /// The line is first split on the first `;`. The name runs up to the first
    /// whitespace or `[~<>=!` character of the dependency expression, and the
    /// trimmed remainder is the version-specifier string. Extras (`foo[bar]`)
    /// have no conda equivalent and are dropped. Empty parts are `None`, so
    /// `foo;` has no marker.
    pub fn parse(line: &str) -> Self {
        let (expression, marker) = match line.split_once(';') {
            Some((expression, marker)) => (expression, Some(marker)),
            None => (line, None),
        };

        let expression = expression.trim();
        let boundary = expression
            .find(is_name_delimiter)
            .unwrap_or(expression.len());
        let (name, rest) = expression.split_at(boundary);
        let rest = strip_extras(rest.trim());

        Self {
            name: name.to_owned(),
            version_specifiers: (!rest.is_empty()).then(|| rest.to_owned()),
            marker: marker
                .map(str::trim)
                .filter(|marker| !marker.is_empty())
                .map(ToOwned::to_owned),
        }
    }

    /// The package name, exactly as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version-specifier string, e.g. `>=1.0,<2`.
    pub fn version_specifiers(&self) -> Option<&str> {
        self.version_specifiers.as_deref()
    }

    /// The environment marker, e.g. `sys_platform == 'win32'`.
    pub fn marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(version_specifiers) = &self.version_specifiers {
            f.write_str(version_specifiers)?;
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

fn is_name_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '[' | '~' | '<' | '>' | '=' | '!')
}

fn strip_extras(rest: &str) -> &str {
    match rest.strip_prefix('[').and_then(|extras| extras.split_once(']')) {
        Some((_, rest)) => rest.trim(),
        None => rest,
    }
}
