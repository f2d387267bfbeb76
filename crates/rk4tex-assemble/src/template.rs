//! Derivative placeholders in RHS templates.
//!
//! A template is opaque LaTeX except for `\partial_<dir> <operand>` and
//! `∂_<dir> <operand>`. Everything else is copied through unchanged.

use rk4tex_core::{AssemblyError, Direction};

/// The thing being differentiated, as written in the template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    /// LaTeX text, including any `_`/`^` attachments.
    pub text: String,
    /// Whether the text must be braced before a grid index is attached.
    pub compound: bool,
}

impl Operand {
    /// The operand at grid index `index` (`X_{i+1}`, `{\beta^r}_{i-1}`).
    pub fn at_index(&self, index: &str) -> String {
        if self.compound {
            format!("{{{}}}_{{{index}}}", self.text)
        } else {
            format!("{}_{{{index}}}", self.text)
        }
    }
}

/// One piece of a parsed template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplatePart {
    /// Verbatim LaTeX.
    Text(String),
    /// A first-derivative placeholder.
    Derivative {
        /// Differentiation axis.
        direction: Direction,
        /// What is differentiated.
        operand: Operand,
    },
}

/// A parsed RHS template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Pieces in template order.
    pub parts: Vec<TemplatePart>,
}

impl Template {
    /// Split `template` into text and placeholders.
    ///
    /// # Errors
    ///
    /// [`AssemblyError::InvalidTemplate`] for an empty template, an
    /// unknown direction subscript, or a placeholder without an operand.
    pub fn parse(field: &str, template: &str) -> Result<Self, AssemblyError> {
        if template.trim().is_empty() {
            return Err(invalid(field, "empty RHS template".to_string()));
        }
        let mut scanner = Scanner {
            field,
            text: template,
            pos: 0,
        };
        let mut parts = Vec::new();
        let mut text_start = 0;
        while let Some((start, marker)) = scanner.next_marker() {
            if start > text_start {
                parts.push(TemplatePart::Text(template[text_start..start].to_string()));
            }
            scanner.pos = start + marker.len();
            let direction = scanner.direction(start)?;
            let operand = scanner.operand(start)?;
            parts.push(TemplatePart::Derivative { direction, operand });
            text_start = scanner.pos;
        }
        if text_start < template.len() {
            parts.push(TemplatePart::Text(template[text_start..].to_string()));
        }
        Ok(Self { parts })
    }

    /// Whether the template is exactly one placeholder (surrounding
    /// whitespace aside).
    pub fn is_single_derivative(&self) -> bool {
        let mut derivatives = 0;
        for part in &self.parts {
            match part {
                TemplatePart::Derivative { .. } => derivatives += 1,
                TemplatePart::Text(text) if text.trim().is_empty() => {}
                TemplatePart::Text(_) => return false,
            }
        }
        derivatives == 1
    }

    /// Placeholders in template order.
    pub fn derivatives(&self) -> impl Iterator<Item = (Direction, &Operand)> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Derivative { direction, operand } => Some((*direction, operand)),
            TemplatePart::Text(_) => None,
        })
    }
}

fn invalid(field: &str, detail: String) -> AssemblyError {
    AssemblyError::InvalidTemplate {
        field: field.to_string(),
        detail,
    }
}

const PARTIAL: &str = "\\partial";
const PARTIAL_SIGN: &str = "∂";

struct Scanner<'a> {
    field: &'a str,
    text: &'a str,
    pos: usize,
}

impl Scanner<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn snippet(&self, start: usize) -> String {
        self.text[start..].chars().take(24).collect()
    }

    /// Next `\partial` (not a longer command name) or `∂` at or after `pos`.
    fn next_marker(&self) -> Option<(usize, &'static str)> {
        let mut from = self.pos;
        loop {
            let rest = &self.text[from..];
            let partial = rest.find(PARTIAL).map(|i| (from + i, PARTIAL));
            let sign = rest.find(PARTIAL_SIGN).map(|i| (from + i, PARTIAL_SIGN));
            let found = match (partial, sign) {
                (Some(a), Some(b)) => Some(if a.0 < b.0 { a } else { b }),
                (a, b) => a.or(b),
            }?;
            let after = &self.text[found.0 + found.1.len()..];
            if found.1 == PARTIAL && after.starts_with(|c: char| c.is_ascii_alphabetic()) {
                from = found.0 + found.1.len();
                continue;
            }
            return Some(found);
        }
    }

    /// `_r`, `_{\theta}`, `_\varphi`, `_φ`.
    fn direction(&mut self, start: usize) -> Result<Direction, AssemblyError> {
        self.skip_ws();
        if self.peek() != Some('_') {
            return Err(invalid(
                self.field,
                format!("derivative without direction subscript near `{}`", self.snippet(start)),
            ));
        }
        self.pos += 1;
        let subscript = self.script().unwrap_or_default();
        let symbol = subscript.trim_start_matches('{').trim_end_matches('}').trim();
        match symbol {
            "r" => Ok(Direction::Radial),
            "\\theta" | "θ" => Ok(Direction::Angular),
            "\\phi" | "\\varphi" | "φ" => Ok(Direction::Azimuthal),
            _ => Err(invalid(
                self.field,
                format!("unknown derivative direction `{symbol}` near `{}`", self.snippet(start)),
            )),
        }
    }

    /// A braced group, a command, or a letter, plus `_`/`^` attachments.
    fn operand(&mut self, start: usize) -> Result<Operand, AssemblyError> {
        self.skip_ws();
        let missing = |scanner: &Self| {
            invalid(
                scanner.field,
                format!("derivative without operand near `{}`", scanner.snippet(start)),
            )
        };
        let head_start = self.pos;
        match self.peek() {
            Some('{') => {
                self.script().ok_or_else(|| missing(self))?;
            }
            Some('\\') => {
                let name: String = self.rest()[1..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .collect();
                if name.is_empty() || name == "partial" || name == "left" || name == "right" {
                    return Err(missing(self));
                }
                self.pos += 1 + name.len();
            }
            Some(c) if c.is_alphabetic() && c != '∂' => self.pos += c.len_utf8(),
            _ => return Err(missing(self)),
        }
        let mut compound = false;
        while let Some(c @ ('_' | '^')) = self.peek() {
            self.pos += c.len_utf8();
            self.script().ok_or_else(|| missing(self))?;
            compound = true;
        }
        Ok(Operand {
            text: self.text[head_start..self.pos].to_string(),
            compound,
        })
    }

    /// Consume a `{group}` (braces included), a `\command`, or one
    /// character and return it.
    fn script(&mut self) -> Option<String> {
        let rest = self.rest();
        let len = match rest.chars().next()? {
            '{' => {
                let mut depth = 0usize;
                let mut end = None;
                for (i, c) in rest.char_indices() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(i + 1);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                end?
            }
            '\\' => {
                1 + rest[1..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphabetic())
                    .map(char::len_utf8)
                    .sum::<usize>()
            }
            c => c.len_utf8(),
        };
        let script = rest[..len].to_string();
        self.pos += len;
        Some(script)
    }
}
