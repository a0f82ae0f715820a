//! PEP 508 environment markers → conda selectors.
//!
//! The translation is a sequence of string substitutions over a small, closed
//! vocabulary: `sys_platform == 'win32'` becomes `win`, its negation becomes
//! `not win`, and `python_version < '3.8'` becomes `py<38`. Anything outside
//! the vocabulary is left in place.

/// Comparison operators whose surrounding whitespace is removed.
const COMPARISON_OPERATORS: &[&str] = &["==", "!=", "<", ">", "<=", ">="];

/// Marker variable → (marker literal, conda selector) pairs.
///
/// `python_version` is handled separately, see [`translate_marker`].
pub const PLATFORM_VAR_TRANSLATION: &[(&str, &[(&str, &str)])] = &[
    (
        "sys_platform",
        &[("win32", "win"), ("linux", "linux"), ("darwin", "osx")],
    ),
    (
        "platform_system",
        &[("Windows", "win"), ("Linux", "linux"), ("Darwin", "osx")],
    ),
    ("os_name", &[("nt", "win"), ("posix", "unix")]),
    (
        "platform_machine",
        &[
            ("x86_64", "x86_64"),
            ("AMD64", "x86_64"),
            ("arm64", "arm64"),
            ("i386", "x86"),
        ],
    ),
];

/// Translate a PEP 508 environment marker into a conda selector expression.
///
/// The result is not bracketed; callers wrap it as `# [...]`. Unknown
/// variables and literals pass through unchanged.
pub fn translate_marker(marker: &str) -> String {
    // Dropping the dot turns `python_version < "3.8"` into an integer comparison.
    let stripped: String = marker
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '.'))
        .collect();

    let mut selector = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    for operator in COMPARISON_OPERATORS {
        selector = selector
            .replace(&format!(" {operator}"), operator)
            .replace(&format!("{operator} "), operator);
    }

    selector = selector.replace("python_version", "py");

    for (variable, values) in PLATFORM_VAR_TRANSLATION {
        for (value, conda_bool) in *values {
            selector = selector
                .replace(&format!("{variable}=={value}"), conda_bool)
                .replace(&format!("{variable}!={value}"), &format!("not {conda_bool}"));
        }
    }

    selector
}
