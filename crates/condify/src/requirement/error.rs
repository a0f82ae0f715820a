use thiserror::Error;

/// Errors raised while translating a requirement into conda syntax.
///
/// Both variants are fatal: a requirement that cannot be translated aborts the
/// whole batch, so no partial requirement list is ever handed to conda.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The version operator has no conda equivalent (`===`).
    #[error(
        "the `{operator}` (arbitrary equality) version operator in `{clause}` has no conda equivalent and is not supported"
    )]
    UnsupportedOperator { operator: String, clause: String },

    /// A version-specifier clause that cannot be translated.
    #[error("invalid version specifier `{clause}`: {reason}")]
    MalformedSpecifier { clause: String, reason: &'static str },
}

impl TranslateError {
    pub(crate) fn malformed(clause: &str, reason: &'static str) -> Self {
        Self::MalformedSpecifier {
            clause: clause.to_owned(),
            reason,
        }
    }
}
