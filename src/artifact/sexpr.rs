//! Minimal s-expression reader for KiCad file formats
//!
//! KiCad netlists and board files are plain s-expressions. This keeps only
//! what the artifact readers need: a tree of atoms and lists, plus child
//! lookup by tag. Source spans and patching are deliberately out of scope;
//! the pipeline only reads these files.

use thiserror::Error;

/// An s-expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    /// Unquoted symbol or number
    Atom(String),
    /// Quoted string, with quotes stripped and escapes resolved
    Str(String),
    List(Vec<Sexpr>),
}

impl Sexpr {
    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text content of an atom or string node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// First-element symbol of a list, e.g. "comp" for `(comp ...)`.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()?.first()?.as_text()
    }

    /// Find the first direct child list `(name ...)`.
    pub fn child(&self, name: &str) -> Option<&Sexpr> {
        self.as_list()?
            .iter()
            .find(|item| item.tag() == Some(name))
    }

    /// All direct child lists `(name ...)`.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Sexpr> + 'a {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter(move |item| item.tag() == Some(name))
    }

    /// The first value of a direct child list: `(value "470")` yields "470".
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)?.as_list()?.get(1)?.as_text()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SexprError {
    #[error("unexpected end of input (unbalanced parentheses)")]
    UnexpectedEof,
    #[error("unexpected closing parenthesis at byte {0}")]
    UnexpectedClose(usize),
    #[error("trailing data after top-level expression at byte {0}")]
    TrailingData(usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("empty input")]
    Empty,
}

/// Parse a single top-level s-expression.
pub fn parse(input: &str) -> Result<Sexpr, SexprError> {
    let bytes = input.as_bytes();
    let mut i = 0usize;
    let mut stack: Vec<Vec<Sexpr>> = Vec::new();
    let mut root: Option<Sexpr> = None;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                stack.push(Vec::new());
                i += 1;
            }
            b')' => {
                let items = stack.pop().ok_or(SexprError::UnexpectedClose(i))?;
                i += 1;
                place(&mut stack, &mut root, Sexpr::List(items), i)?;
            }
            b'"' => {
                let start = i;
                i += 1;
                let mut text = String::new();
                loop {
                    if i >= bytes.len() {
                        return Err(SexprError::UnterminatedString(start));
                    }
                    match bytes[i] {
                        b'"' => {
                            i += 1;
                            break;
                        }
                        b'\\' => {
                            // The escaped character may be multibyte, so
                            // advance by its UTF-8 length, not by one byte.
                            let Some(escaped) = input[i + 1..].chars().next() else {
                                return Err(SexprError::UnterminatedString(start));
                            };
                            text.push(match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => other,
                            });
                            i += 1 + escaped.len_utf8();
                        }
                        _ => {
                            let ch = input[i..]
                                .chars()
                                .next()
                                .ok_or(SexprError::UnterminatedString(start))?;
                            text.push(ch);
                            i += ch.len_utf8();
                        }
                    }
                }
                place(&mut stack, &mut root, Sexpr::Str(text), i)?;
            }
            c if c.is_ascii_whitespace() => {
                i += 1;
            }
            _ => {
                let start = i;
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'(' | b')' | b'"')
                {
                    i += 1;
                }
                let atom = Sexpr::Atom(input[start..i].to_string());
                place(&mut stack, &mut root, atom, i)?;
            }
        }
    }

    if !stack.is_empty() {
        return Err(SexprError::UnexpectedEof);
    }
    root.ok_or(SexprError::Empty)
}

fn place(
    stack: &mut [Vec<Sexpr>],
    root: &mut Option<Sexpr>,
    node: Sexpr,
    pos: usize,
) -> Result<(), SexprError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(SexprError::TrailingData(pos)),
    }
}
