//! Evaluation of translated conda selectors against an explicit target.
//!
//! A selector such as `win and py>=38` is parsed with a small recursive-descent
//! parser over a closed grammar and evaluated in a namespace built from a
//! [`Platform`] and a Python version:
//!
//! ```text
//! expr       := and ("or" and)*
//! and        := not ("and" not)*
//! not        := "not" not | comparison
//! comparison := atom (("==" | "!=" | "<" | "<=" | ">" | ">=") atom)*
//! atom       := IDENT | INT | "(" expr ")"
//! ```

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Deepest nesting of parentheses and `not` accepted in a selector.
const MAX_DEPTH: usize = 256;

/// Errors raised by the selector evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error(
        "unknown platform `{0}`, expected one of: linux-64, linux-aarch64, linux-ppc64le, osx-64, osx-arm64, win-64, win-32"
    )]
    UnknownPlatform(String),

    #[error("invalid Python version `{0}`, expected `MAJOR.MINOR`")]
    InvalidPythonVersion(String),

    #[error("invalid selector `{expression}`: {message}")]
    Syntax { expression: String, message: String },

    #[error("unknown selector variable `{0}`")]
    UnknownIdentifier(String),
}

/// A conda platform subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux64,
    LinuxAarch64,
    LinuxPpc64le,
    Osx64,
    OsxArm64,
    Win64,
    Win32,
}

impl Platform {
    pub const ALL: [Self; 7] = [
        Self::Linux64,
        Self::LinuxAarch64,
        Self::LinuxPpc64le,
        Self::Osx64,
        Self::OsxArm64,
        Self::Win64,
        Self::Win32,
    ];

    /// The platform this binary was compiled for, if conda supports it.
    pub fn current() -> Option<Self> {
        Self::for_target(
            std::env::consts::OS,
            std::env::consts::ARCH,
            cfg!(target_endian = "little"),
        )
    }

    fn for_target(os: &str, arch: &str, little_endian: bool) -> Option<Self> {
        match (os, arch) {
            ("linux", "x86_64") => Some(Self::Linux64),
            ("linux", "aarch64") => Some(Self::LinuxAarch64),
            ("linux", "powerpc64") if little_endian => Some(Self::LinuxPpc64le),
            ("macos", "x86_64") => Some(Self::Osx64),
            ("macos", "aarch64") => Some(Self::OsxArm64),
            ("windows", "x86_64") => Some(Self::Win64),
            ("windows", "x86") => Some(Self::Win32),
            _ => None,
        }
    }

    /// The conda subdirectory name, e.g. `linux-64`.
    pub fn subdir(self) -> &'static str {
        match self {
            Self::Linux64 => "linux-64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::LinuxPpc64le => "linux-ppc64le",
            Self::Osx64 => "osx-64",
            Self::OsxArm64 => "osx-arm64",
            Self::Win64 => "win-64",
            Self::Win32 => "win-32",
        }
    }

    fn is_linux(self) -> bool {
        matches!(self, Self::Linux64 | Self::LinuxAarch64 | Self::LinuxPpc64le)
    }

    fn is_osx(self) -> bool {
        matches!(self, Self::Osx64 | Self::OsxArm64)
    }

    fn is_win(self) -> bool {
        matches!(self, Self::Win64 | Self::Win32)
    }

    /// Boolean selector variables and their values on this platform.
    fn variables(self) -> [(&'static str, bool); 12] {
        [
            ("linux", self.is_linux()),
            ("osx", self.is_osx()),
            ("win", self.is_win()),
            ("unix", self.is_linux() || self.is_osx()),
            ("x86", self == Self::Win32),
            (
                "x86_64",
                matches!(self, Self::Linux64 | Self::Osx64 | Self::Win64),
            ),
            ("arm64", self == Self::OsxArm64),
            ("aarch64", self == Self::LinuxAarch64),
            ("ppc64le", self == Self::LinuxPpc64le),
            ("linux64", self == Self::Linux64),
            ("win32", self == Self::Win32),
            ("win64", self == Self::Win64),
        ]
    }
}

impl FromStr for Platform {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|platform| platform.subdir() == s)
            .ok_or_else(|| SelectorError::UnknownPlatform(s.to_owned()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subdir())
    }
}

/// A value in the selector namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    fn truthy(self) -> bool {
        match self {
            Self::Bool(value) => value,
            Self::Int(value) => value != 0,
        }
    }

    fn as_int(self) -> i64 {
        match self {
            Self::Bool(value) => i64::from(value),
            Self::Int(value) => value,
        }
    }
}

/// Evaluates conda selectors for one Python version on one platform.
#[derive(Debug, Clone)]
pub struct SelectorEvaluator {
    namespace: FxHashMap<&'static str, Value>,
}

impl SelectorEvaluator {
    /// Build the namespace for `python` (`MAJOR.MINOR`) on `platform`.
    pub fn new(python: &str, platform: Platform) -> Result<Self, SelectorError> {
        let (major, minor) = parse_python_version(python)?;
        let py: i64 = format!("{major}{minor}")
            .parse()
            .map_err(|_| SelectorError::InvalidPythonVersion(python.to_owned()))?;

        let mut namespace: FxHashMap<&'static str, Value> = platform
            .variables()
            .into_iter()
            .map(|(name, value)| (name, Value::Bool(value)))
            .collect();
        namespace.insert("py", Value::Int(py));
        namespace.insert("py2k", Value::Bool(major == 2));
        namespace.insert("py3k", Value::Bool(major == 3));

        Ok(Self { namespace })
    }

    /// Like [`SelectorEvaluator::new`], with the platform given as a subdir string.
    pub fn for_subdir(python: &str, platform: &str) -> Result<Self, SelectorError> {
        Self::new(python, platform.parse()?)
    }

    /// Evaluate a selector expression (without the surrounding `# [...]`).
    pub fn evaluate(&self, selector: &str) -> Result<bool, SelectorError> {
        let tokens = tokenize(selector)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            depth: 0,
            source: selector,
            namespace: &self.namespace,
        };
        let value = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected `{token}`")));
        }
        Ok(value.truthy())
    }

    /// Keep the lines whose selector holds, with the selector removed.
    ///
    /// Lines without a `# [...]` selector always apply.
    pub fn filter<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<String>, SelectorError> {
        let mut selected = Vec::new();
        for line in lines {
            let (requirement, selector) = split_selector(line.as_ref());
            let applies = match selector {
                Some(selector) => self.evaluate(selector)?,
                None => true,
            };
            if applies {
                selected.push(requirement.to_owned());
            }
        }
        Ok(selected)
    }
}

/// Split `foo>=1.0 # [win]` into `foo>=1.0` and `win`.
pub fn split_selector(line: &str) -> (&str, Option<&str>) {
    let Some((requirement, comment)) = line.split_once('#') else {
        return (line.trim(), None);
    };
    let selector = comment
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'));
    match selector {
        Some(selector) => (requirement.trim(), Some(selector.trim())),
        None => (requirement.trim(), None),
    }
}

fn parse_python_version(python: &str) -> Result<(u32, u32), SelectorError> {
    let invalid = || SelectorError::InvalidPythonVersion(python.to_owned());
    let mut parts = python.trim().split('.');
    let major = parts.next().ok_or_else(invalid)?;
    let minor = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((
        major.parse().map_err(|_| invalid())?,
        minor.parse().map_err(|_| invalid())?,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Int(i64),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Int(value) => write!(f, "{value}"),
            Self::Op(op) => f.write_str(op.as_str()),
            Self::And => f.write_str("and"),
            Self::Or => f.write_str("or"),
            Self::Not => f.write_str("not"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    fn apply(self, left: Value, right: Value) -> bool {
        let (left, right) = (left.as_int(), right.as_int());
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, SelectorError> {
    let syntax = |message: String| SelectorError::Syntax {
        expression: source.to_owned(),
        message,
    };

    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start;
            while let Some(&(index, c)) = chars.peek() {
                if !(c.is_ascii_alphanumeric() || c == '_') {
                    break;
                }
                end = index + c.len_utf8();
                chars.next();
            }
            tokens.push(match &source[start..end] {
                "and" => Token::And,
                "or" => Token::Or,
                "not" => Token::Not,
                ident => Token::Ident(ident.to_owned()),
            });
            continue;
        }

        if c.is_ascii_digit() {
            let mut end = start;
            while let Some(&(index, c)) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                end = index + 1;
                chars.next();
            }
            let literal = &source[start..end];
            let value = literal
                .parse()
                .map_err(|_| syntax(format!("integer `{literal}` is out of range")))?;
            tokens.push(Token::Int(value));
            continue;
        }

        chars.next();
        let followed_by_eq = chars.next_if(|&(_, next)| next == '=').is_some();
        let token = match (c, followed_by_eq) {
            ('(', false) => Token::LParen,
            (')', false) => Token::RParen,
            ('=', true) => Token::Op(CompareOp::Eq),
            ('!', true) => Token::Op(CompareOp::Ne),
            ('<', true) => Token::Op(CompareOp::Le),
            ('>', true) => Token::Op(CompareOp::Ge),
            ('<', false) => Token::Op(CompareOp::Lt),
            ('>', false) => Token::Op(CompareOp::Gt),
            _ => return Err(syntax(format!("unexpected character `{c}`"))),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
    source: &'a str,
    namespace: &'a FxHashMap<&'static str, Value>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        self.position += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn nest(&mut self) -> Result<(), SelectorError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error("selector nested too deeply".to_owned()));
        }
        self.depth += 1;
        Ok(())
    }

    fn error(&self, message: String) -> SelectorError {
        SelectorError::Syntax {
            expression: self.source.to_owned(),
            message,
        }
    }

    // `and`/`or` evaluate both sides so that errors on the right are never
    // hidden by short-circuiting.
    fn expression(&mut self) -> Result<Value, SelectorError> {
        let mut value = self.conjunction()?.truthy();
        while self.eat(&Token::Or) {
            let right = self.conjunction()?.truthy();
            value = value || right;
        }
        Ok(Value::Bool(value))
    }

    fn conjunction(&mut self) -> Result<Value, SelectorError> {
        let mut value = self.negation()?;
        if self.peek() != Some(&Token::And) {
            return Ok(value);
        }
        let mut result = value.truthy();
        while self.eat(&Token::And) {
            value = self.negation()?;
            result = result && value.truthy();
        }
        Ok(Value::Bool(result))
    }

    fn negation(&mut self) -> Result<Value, SelectorError> {
        if self.eat(&Token::Not) {
            self.nest()?;
            let value = self.negation()?;
            self.depth -= 1;
            return Ok(Value::Bool(!value.truthy()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value, SelectorError> {
        let mut left = self.atom()?;
        let mut result: Option<bool> = None;
        while let Some(Token::Op(op)) = self.peek() {
            let op = *op;
            self.position += 1;
            let right = self.atom()?;
            // Chained comparisons hold when every adjacent pair holds.
            result = Some(result.unwrap_or(true) && op.apply(left, right));
            left = right;
        }
        Ok(result.map_or(left, Value::Bool))
    }

    fn atom(&mut self) -> Result<Value, SelectorError> {
        match self.advance().cloned() {
            Some(Token::Ident(name)) => self
                .namespace
                .get(name.as_str())
                .copied()
                .ok_or(SelectorError::UnknownIdentifier(name)),
            Some(Token::Int(value)) => Ok(Value::Int(value)),
            Some(Token::LParen) => {
                self.nest()?;
                let value = self.expression()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("missing closing `)`".to_owned()));
                }
                self.depth -= 1;
                Ok(value)
            }
            Some(token) => Err(self.error(format!("unexpected `{token}`"))),
            None => Err(self.error("unexpected end of selector".to_owned())),
        }
    }
}
