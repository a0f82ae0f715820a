//! PEP 440 version specifiers → conda version constraints.

use std::sync::LazyLock;

use regex::Regex;

use crate::requirement::TranslateError;

/// PEP 440 comparison operators, longest first so that a prefix never shadows
/// a longer operator (`===` before `==`, `<=` before `<`).
const OPERATORS: &[Operator] = &[
    Operator::ArbitraryEqual,
    Operator::Compatible,
    Operator::Equal,
    Operator::NotEqual,
    Operator::LessEqual,
    Operator::GreaterEqual,
    Operator::Less,
    Operator::Greater,
];

/// A pre-release glued onto a release segment, e.g. `0a1` or `2rc3`.
static PRE_RELEASE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)((?:a|b|c|rc)[0-9]+)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    ArbitraryEqual,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::ArbitraryEqual => "===",
        }
    }

    /// Split the operator off the front of a whitespace-free clause.
    fn split(clause: &str) -> Option<(Self, &str)> {
        OPERATORS.iter().find_map(|operator| {
            clause
                .strip_prefix(operator.as_str())
                .map(|version| (*operator, version))
        })
    }
}

/// Translate a comma-separated PEP 440 specifier list into conda syntax.
///
/// Each clause is translated on its own and the results are joined with
/// commas. `~=X.Y` becomes `>=X.Y,==X`, trailing `.*` wildcards are dropped
/// and `===` is rejected.
pub fn translate_version_specifiers(specifiers: &str) -> Result<String, TranslateError> {
    let clauses = specifiers
        .split(',')
        .map(translate_clause)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clauses.join(","))
}

fn translate_clause(clause: &str) -> Result<String, TranslateError> {
    let clause: String = clause.chars().filter(|c| !c.is_whitespace()).collect();

    let Some((operator, version)) = Operator::split(&clause) else {
        return Err(TranslateError::malformed(
            &clause,
            "no recognized comparison operator",
        ));
    };

    if operator == Operator::ArbitraryEqual {
        return Err(TranslateError::UnsupportedOperator {
            operator: operator.as_str().to_owned(),
            clause,
        });
    }

    if version.is_empty() {
        return Err(TranslateError::malformed(&clause, "missing version"));
    }

    match operator {
        Operator::Compatible => {
            if version.contains('*') {
                return Err(TranslateError::malformed(
                    &clause,
                    "`~=` does not accept wildcards",
                ));
            }
            let prefix = compatible_prefix(version);
            if prefix.is_empty() {
                return Err(TranslateError::malformed(
                    &clause,
                    "`~=` requires at least two release segments",
                ));
            }
            Ok(format!(">={version},=={prefix}"))
        }
        Operator::Equal | Operator::NotEqual => match version.strip_suffix(".*") {
            // `==1.4.*` matches the same versions as conda's `==1.4`.
            Some(truncated) if !truncated.is_empty() => {
                Ok(format!("{}{truncated}", operator.as_str()))
            }
            Some(_) => Err(TranslateError::malformed(&clause, "bare wildcard")),
            None => Ok(clause),
        },
        _ if version.ends_with(".*") => Err(TranslateError::malformed(
            &clause,
            "wildcards are only allowed with `==` and `!=`",
        )),
        _ => Ok(clause),
    }
}

/// Split a version into segments, giving a glued pre-release its own segment:
/// `1.0a1` → `1`, `0`, `a1`.
fn version_segments(version: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for item in version.split('.') {
        match PRE_RELEASE_SEGMENT.captures(item) {
            Some(captures) => segments.extend(
                captures
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|capture| capture.as_str()),
            ),
            None => segments.push(item),
        }
    }
    segments
}

/// The `==` prefix implied by `~=version`: every segment but the last, after
/// discarding trailing `post`/`dev` segments.
fn compatible_prefix(version: &str) -> String {
    let mut release: Vec<&str> = version_segments(version)
        .into_iter()
        .take_while(|segment| !segment.starts_with("post") && !segment.starts_with("dev"))
        .collect();
    release.pop();
    release.join(".")
}
