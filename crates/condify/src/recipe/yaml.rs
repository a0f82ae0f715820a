//! A minimal YAML emitter for conda recipes.
//!
//! Recipes contain Jinja (`{{ PYTHON }}`, `{{ compiler('c') }}`) that a YAML
//! library would quote, so output is written by hand in the layout conda
//! recipes conventionally use: two-space indentation, block lists, and a
//! blank line after every nested block.

use std::fmt::Write;

/// A YAML value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Written verbatim.
    Scalar(String),
    List(Vec<Node>),
    /// Entries in insertion order.
    Map(Vec<(String, Node)>),
}

impl Node {
    pub fn scalar(value: impl ToString) -> Self {
        Self::Scalar(value.to_string())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::List(items.into_iter().map(Self::scalar).collect())
    }

    /// Render as a YAML document.
    pub fn render(&self) -> String {
        let mut out = self.lines().join("\n");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match self {
            Self::Map(entries) => {
                for (key, value) in entries {
                    match value {
                        Self::Scalar(scalar) => lines.push(format!("{key}: {scalar}")),
                        Self::List(_) | Self::Map(_) => {
                            lines.push(format!("{key}:"));
                            for line in value.lines() {
                                lines.push(format!("  {line}").trim_end().to_owned());
                            }
                            end_block(&mut lines);
                        }
                    }
                }
            }
            Self::List(items) => {
                for item in items {
                    lines.extend(item.lines());
                }
                end_block(&mut lines);
            }
            Self::Scalar(scalar) => lines.push(format!("- {scalar}")),
        }
        lines
    }
}

fn end_block(lines: &mut Vec<String>) {
    if lines.last().is_some_and(|line| !line.is_empty()) {
        lines.push(String::new());
    }
}

/// Quote `value` the way Python's `repr` quotes a string.
///
/// Single quotes are preferred; double quotes are used when the value
/// contains a single quote but no double quote.
pub fn python_repr(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks() {
        let node = Node::Map(vec![
            (
                "package".to_owned(),
                Node::Map(vec![
                    ("name".to_owned(), Node::scalar("spam")),
                    ("version".to_owned(), Node::scalar("1.0")),
                ]),
            ),
            (
                "requirements".to_owned(),
                Node::Map(vec![
                    ("host".to_owned(), Node::list(["python", "pip"])),
                    ("run".to_owned(), Node::list(["python"])),
                ]),
            ),
            ("empty".to_owned(), Node::List(vec![])),
        ]);
        insta::assert_snapshot!(node.render(), @r"
        package:
          name: spam
          version: 1.0

        requirements:
          host:
            - python
            - pip

          run:
            - python

        empty:
        ");
    }

    #[test]
    fn top_level_list() {
        let node = Node::Map(vec![("python".to_owned(), Node::list(["3.11", "3.12"]))]);
        assert_eq!(node.render(), "python:\n  - 3.11\n  - 3.12\n");
    }

    #[test]
    fn repr_quoting() {
        assert_eq!(python_repr("MIT"), "'MIT'");
        assert_eq!(python_repr("Spam's eggs"), "\"Spam's eggs\"");
        assert_eq!(python_repr("both ' and \""), "'both \\' and \"'");
        assert_eq!(python_repr("a\\b\nc"), "'a\\\\b\\nc'");
        assert_eq!(python_repr("bell\u{7}"), "'bell\\x07'");
    }
}
