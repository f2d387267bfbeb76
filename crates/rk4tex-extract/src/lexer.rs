//! Tokenizer for the right-hand side of a finite-difference formula.
//!
//! Works on a byte range of a document whose comments have already been
//! blanked out (see [`mask_comments`]), so byte offsets in tokens and
//! errors line up with the original text. The recognized pattern set is
//! deliberately closed: anything outside it is a located
//! [`MalformedReason::UnrecognizedToken`], never a silent skip.

use std::collections::VecDeque;
use std::ops::Range;

use rk4tex_core::{Coefficient, Direction, InputError, MalformedReason};

/// One lexical unit of a formula body.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Plus,
    Minus,
    /// `*`, `\cdot`, `\times`.
    Times,
    Slash,
    /// `(`, `[`, `{`, also after `\left`.
    Open,
    Close,
    /// A bare numeric literal.
    Number { value: Coefficient, text: String },
    /// `\frac{a}{b}`, with any grid spacing in `b` split out.
    Frac {
        value: Coefficient,
        spacing: u32,
        text: String,
    },
    /// A bare grid spacing: `h`, `h^2`, `\Delta r`.
    Spacing { power: u32 },
    /// A field value at a grid offset: `f_{i+1}`, `u[i-2]`, `f(r+h)`.
    GridRef { offset: i32 },
    /// A big-O truncation annotation; `order` is the raw exponent.
    BigO { order: String },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the document.
    pub at: usize,
}

/// Deepest accepted nesting of groups and `\frac` numerators.
pub(crate) const MAX_NESTING: usize = 64;

/// Commands that only size or space delimiters.
const SIZING: &[&str] = &[
    "left", "right", "bigl", "bigr", "Bigl", "Bigr", "big", "Big", "biggl", "biggr",
];

pub(crate) struct Lexer<'a> {
    document: &'a str,
    /// Original text, for locators.
    source: &'a str,
    /// Comment-masked text, for scanning.
    text: &'a str,
    pos: usize,
    end: usize,
    /// `\frac` numerators enclosing this range.
    depth: usize,
    /// Tokens already produced by an expanded `\frac`.
    queued: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(document: &'a str, source: &'a str, text: &'a str, range: Range<usize>) -> Self {
        Self {
            document,
            source,
            text,
            pos: range.start,
            end: range.end.min(text.len()),
            depth: 0,
            queued: VecDeque::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, InputError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn error(&self, at: usize, reason: MalformedReason) -> InputError {
        InputError::malformed_at(self.document, self.source, at, reason)
    }

    fn unrecognized(&self, at: usize, token: impl Into<String>) -> InputError {
        self.error(
            at,
            MalformedReason::UnrecognizedToken {
                token: token.into(),
            },
        )
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..self.end]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '&' || c == '~' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.text[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Option<Token>, InputError> {
        if let Some(token) = self.queued.pop_front() {
            return Ok(Some(token));
        }
        loop {
            self.skip_ws();
            let at = self.pos;
            let Some(c) = self.peek() else {
                return Ok(None);
            };
            let kind = match c {
                '+' => {
                    self.bump();
                    TokenKind::Plus
                }
                '-' => {
                    self.bump();
                    TokenKind::Minus
                }
                '*' => {
                    self.bump();
                    TokenKind::Times
                }
                '/' => {
                    self.bump();
                    TokenKind::Slash
                }
                '(' | '[' | '{' => {
                    self.bump();
                    TokenKind::Open
                }
                ')' | ']' | '}' => {
                    self.bump();
                    TokenKind::Close
                }
                '0'..='9' | '.' => self.number(at)?,
                '\\' => match self.command(at)? {
                    Some(kind) => kind,
                    None => continue,
                },
                c if c.is_ascii_alphabetic() => {
                    let symbol = self.take_while(|c| c.is_ascii_alphabetic());
                    self.identifier(at, symbol)?
                }
                other => return Err(self.unrecognized(at, other.to_string())),
            };
            return Ok(Some(Token { kind, at }));
        }
    }

    fn number(&mut self, at: usize) -> Result<TokenKind, InputError> {
        let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
        match Coefficient::parse(text) {
            Some(value) => Ok(TokenKind::Number {
                value,
                text: text.to_string(),
            }),
            None => Err(self.error(
                at,
                MalformedReason::InvalidNumber {
                    text: text.to_string(),
                },
            )),
        }
    }

    /// Lex a backslash command. `Ok(None)` means "ignorable, keep going".
    fn command(&mut self, at: usize) -> Result<Option<TokenKind>, InputError> {
        self.bump();
        let name = self.take_while(|c| c.is_ascii_alphabetic());
        if name.is_empty() {
            return match self.bump() {
                Some(',' | ';' | '!' | ':' | ' ' | '>') => Ok(None),
                Some('{') => Ok(Some(TokenKind::Open)),
                Some('}') => Ok(Some(TokenKind::Close)),
                Some(c) => Err(self.unrecognized(at, format!("\\{c}"))),
                None => Err(self.unrecognized(at, "\\")),
            };
        }
        match name {
            n if SIZING.contains(&n) => {
                self.skip_ws();
                if self.peek() == Some('.') {
                    self.bump();
                }
                Ok(None)
            }
            "quad" | "qquad" => Ok(None),
            "cdot" | "times" => Ok(Some(TokenKind::Times)),
            "frac" | "dfrac" | "tfrac" => self.fraction(at).map(Some),
            "mathcal" | "mathrm" | "mathit" | "operatorname" => {
                let (letter, _) = self.script(at)?;
                if letter.trim() == "O" {
                    self.big_o(at).map(Some)
                } else {
                    Err(self.unrecognized(at, format!("\\{name}{{{letter}}}")))
                }
            }
            "Delta" | "delta" => {
                self.skip_ws();
                let coord_start = self.pos;
                let (coord, _) = self.script(at)?;
                if coord.trim().is_empty() {
                    return Err(self.unrecognized(at, format!("\\{name}")));
                }
                let power = self.power(coord_start)?;
                Ok(Some(TokenKind::Spacing { power }))
            }
            _ => {
                let symbol = format!("\\{name}");
                self.identifier(at, &symbol).map(Some)
            }
        }
    }

    /// Read a `{group}`, a `\command`, or a single character, as LaTeX
    /// does for script and macro arguments. Returns the content and the
    /// byte offset where it started.
    fn script(&mut self, at: usize) -> Result<(String, usize), InputError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            Some('{') => {
                let content = self.delimited('{', '}')?;
                Ok((content, start))
            }
            Some('\\') => {
                self.bump();
                let name = self.take_while(|c| c.is_ascii_alphabetic());
                Ok((format!("\\{name}"), start))
            }
            Some(_) => {
                let c = self.bump().map(String::from).unwrap_or_default();
                Ok((c, start))
            }
            None => Err(self.unrecognized(at, &self.source[at..self.end])),
        }
    }

    /// Read a balanced `open ... close` group and return its inner text.
    fn delimited(&mut self, open: char, close: char) -> Result<String, InputError> {
        let start = self.pos;
        self.bump();
        let inner_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    let inner_end = self.pos - close.len_utf8();
                    return Ok(self.text[inner_start..inner_end].to_string());
                }
            }
        }
        Err(self.error(start, MalformedReason::UnbalancedGroup))
    }

    /// Optional `^n` / `^{n}` exponent; defaults to 1.
    fn power(&mut self, at: usize) -> Result<u32, InputError> {
        if self.peek() != Some('^') {
            return Ok(1);
        }
        self.bump();
        let (exp, start) = self.script(at)?;
        match exp.trim().parse::<u32>() {
            Ok(p) if p > 0 => Ok(p),
            _ => Err(self.error(start, MalformedReason::InvalidNumber { text: exp })),
        }
    }

    fn fraction(&mut self, at: usize) -> Result<TokenKind, InputError> {
        let (num, num_at) = self.script(at)?;
        let num_end = self.pos;
        let (den, den_at) = self.script(at)?;
        let text = format!("\\frac{{{num}}}{{{den}}}");
        let invalid = |lexer: &Self, at: usize, text: &str| {
            lexer.error(
                at,
                MalformedReason::InvalidNumber {
                    text: text.to_string(),
                },
            )
        };
        if num.trim().is_empty() {
            return Err(invalid(self, num_at, &num));
        }
        let (denominator, spacing) = split_denominator(&den)
            .filter(|(d, _)| !d.is_zero())
            .ok_or_else(|| invalid(self, den_at, &den))?;
        let Some(numerator) = Coefficient::parse(num.trim()) else {
            let braced = self.text[num_at..].starts_with('{');
            let inner = if braced {
                num_at + 1..num_end - 1
            } else {
                num_at..num_end
            };
            return self.expand_fraction(inner, num_end, den_at, denominator, spacing);
        };
        let value = numerator
            .checked_div(denominator)
            .ok_or_else(|| invalid(self, at, &text))?;
        Ok(TokenKind::Frac {
            value,
            spacing,
            text,
        })
    }

    /// Rewrite `\frac{sum}{d}` as `(sum) / (d)` so the parser divides
    /// every term of the numerator. Returns the opening token and queues
    /// the rest.
    fn expand_fraction(
        &mut self,
        numerator: Range<usize>,
        num_end: usize,
        den_at: usize,
        denominator: Coefficient,
        spacing: u32,
    ) -> Result<TokenKind, InputError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(
                numerator.start,
                MalformedReason::NestingTooDeep { limit: MAX_NESTING },
            ));
        }
        let inner = Lexer {
            document: self.document,
            source: self.source,
            text: self.text,
            pos: numerator.start,
            end: numerator.end,
            depth: self.depth + 1,
            queued: VecDeque::new(),
        }
        .tokenize()?;
        let token = |kind| Token { kind, at: den_at };
        self.queued.extend(inner);
        self.queued.push_back(Token {
            kind: TokenKind::Close,
            at: num_end.saturating_sub(1),
        });
        self.queued.push_back(token(TokenKind::Slash));
        self.queued.push_back(token(TokenKind::Open));
        self.queued.push_back(token(TokenKind::Number {
            value: denominator,
            text: denominator.to_string(),
        }));
        if spacing > 0 {
            self.queued.push_back(token(TokenKind::Spacing { power: spacing }));
        }
        self.queued.push_back(token(TokenKind::Close));
        Ok(TokenKind::Open)
    }

    fn big_o(&mut self, at: usize) -> Result<TokenKind, InputError> {
        self.skip_ws();
        loop {
            let rest = self.rest();
            let sizing = SIZING
                .iter()
                .find(|s| rest.starts_with(&format!("\\{s}")) && !rest[s.len() + 1..].starts_with(|c: char| c.is_ascii_alphabetic()));
            match sizing {
                Some(s) => {
                    self.pos += s.len() + 1;
                    self.skip_ws();
                }
                None => break,
            }
        }
        if self.peek() != Some('(') {
            return Err(self.unrecognized(at, "O"));
        }
        let content = self.delimited('(', ')')?;
        let content = content.trim_end();
        let content = SIZING
            .iter()
            .find_map(|s| content.strip_suffix(&format!("\\{s}")))
            .unwrap_or(content);
        Ok(TokenKind::BigO {
            order: big_o_exponent(content),
        })
    }

    /// A symbol followed by its grid index, or a bare spacing `h`.
    fn identifier(&mut self, at: usize, symbol: &str) -> Result<TokenKind, InputError> {
        if symbol == "O" {
            let save = self.pos;
            self.skip_ws();
            if self.peek() == Some('(') || self.rest().starts_with("\\left") {
                return self.big_o(at);
            }
            self.pos = save;
        }
        if symbol == "h" && !matches!(self.peek(), Some('_' | '[')) {
            let power = self.power(at)?;
            return Ok(TokenKind::Spacing { power });
        }

        let mut offset: Option<i32> = None;
        loop {
            let index_at = self.pos;
            let content = match self.peek() {
                Some('^') => {
                    // time level or other superscript; not part of the offset
                    self.bump();
                    self.script(at)?;
                    continue;
                }
                Some('_') if offset.is_none() => {
                    self.bump();
                    let (content, _) = self.script(at)?;
                    parse_index(&content)
                }
                Some('[') if offset.is_none() => parse_index(&self.delimited('[', ']')?),
                Some('(') if offset.is_none() => parse_argument(&self.delimited('(', ')')?),
                _ => break,
            };
            match content {
                Some(o) => offset = Some(o),
                None => {
                    return Err(self.unrecognized(index_at, &self.source[index_at..self.pos]));
                }
            }
        }
        match offset {
            Some(offset) => Ok(TokenKind::GridRef { offset }),
            None => Err(self.unrecognized(at, symbol)),
        }
    }
}

/// Blank out LaTeX comments, keeping every byte offset intact.
///
/// A `%` not preceded by a backslash starts a comment that runs to the
/// end of its line.
pub(crate) fn mask_comments(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let mut in_comment = false;
        let mut prev = None;
        for c in line.chars() {
            if !in_comment && c == '%' && prev != Some('\\') {
                in_comment = true;
            }
            if in_comment && c != '\n' {
                masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
            } else {
                masked.push(c);
            }
            prev = Some(c);
        }
    }
    masked
}

/// Scan free text (the tail after a formula) for the first big-O
/// annotation. Lexing failures here are not errors: the tail is prose.
pub(crate) fn find_big_o(
    document: &str,
    source: &str,
    text: &str,
    range: Range<usize>,
) -> Option<(String, usize)> {
    let region = text.get(range.clone())?;
    for (i, c) in region.char_indices() {
        let at = range.start + i;
        let candidate = if c == '\\' {
            region[i..].starts_with("\\mathcal")
        } else {
            c == 'O'
                && !region[..i]
                    .chars()
                    .next_back()
                    .is_some_and(|p| p.is_ascii_alphanumeric() || p == '\\')
        };
        if !candidate {
            continue;
        }
        let mut lexer = Lexer::new(document, source, text, at..range.end);
        if let Ok(Some(Token {
            kind: TokenKind::BigO { order },
            ..
        })) = lexer.next_token()
        {
            return Some((order, at));
        }
    }
    None
}

/// `i`, `i+1`, `i - 2` → offset. The index letter itself is free.
fn parse_index(content: &str) -> Option<i32> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = compact.chars();
    if !chars.next()?.is_ascii_alphabetic() {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        return Some(0);
    }
    let (sign, digits) = match rest.split_at(1) {
        ("+", d) => (1, d),
        ("-", d) => (-1, d),
        _ => return None,
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i32>().ok().map(|n| sign * n)
}

/// `r+h`, `r - 2h, t`, `\theta+\Delta\theta` → offset in grid steps.
fn parse_argument(content: &str) -> Option<i32> {
    let first = content.split(',').next()?.trim();
    let rest = match first.strip_prefix('\\') {
        Some(cmd) => cmd.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        None => {
            let mut chars = first.chars();
            if !chars.next()?.is_ascii_alphabetic() {
                return None;
            }
            chars.as_str()
        }
    };
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(0);
    }
    let (sign, rest) = match rest.split_at(1) {
        ("+", r) => (1, r.trim_start()),
        ("-", r) => (-1, r.trim_start()),
        _ => return None,
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let steps: i32 = if digits_end == 0 {
        1
    } else {
        rest[..digits_end].parse().ok()?
    };
    let spacing = rest[digits_end..].trim();
    let spacing = spacing.strip_prefix("\\cdot").unwrap_or(spacing);
    (parse_spacing(spacing)? == 1).then_some(sign * steps)
}

/// Split `12h`, `2\Delta r`, `h^2`, `6` into `(number, spacing power)`.
pub(crate) fn split_denominator(den: &str) -> Option<(Coefficient, u32)> {
    let den = den.trim();
    let number_end = den
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(den.len());
    let number = if number_end == 0 {
        Coefficient::ONE
    } else {
        Coefficient::parse(&den[..number_end])?
    };
    let rest = den[number_end..].trim();
    let rest = rest.strip_prefix("\\cdot").unwrap_or(rest).trim();
    let spacing = if rest.is_empty() {
        0
    } else {
        parse_spacing(rest)?
    };
    Some((number, spacing))
}

/// `h`, `h^2`, `\Delta r`, `\delta\theta^{2}`, `(\Delta r)^2` → power.
pub(crate) fn parse_spacing(text: &str) -> Option<u32> {
    let text = text.trim();
    let (base, power) = match text.rsplit_once('^') {
        Some((base, exp)) => {
            let exp = exp.trim().trim_start_matches('{').trim_end_matches('}');
            let power = exp.trim().parse::<u32>().ok().filter(|&p| p > 0)?;
            (base.trim(), power)
        }
        None => (text, 1),
    };
    let base = base
        .strip_prefix('(')
        .and_then(|b| b.strip_suffix(')'))
        .unwrap_or(base)
        .trim();
    if base == "h" {
        return Some(power);
    }
    let coord = base
        .strip_prefix("\\Delta")
        .or_else(|| base.strip_prefix("\\delta"))?
        .trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim();
    is_coordinate(coord).then_some(power)
}

fn is_coordinate(coord: &str) -> bool {
    if Direction::from_alias(coord).is_some() {
        return true;
    }
    let mut chars = coord.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_alphabetic(),
        (Some('\\'), Some(_)) => coord[1..].chars().all(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

/// `h^4` → `"4"`, `\Delta r^{6}` → `"6"`, `h` → `"1"`.
fn big_o_exponent(content: &str) -> String {
    match content.rsplit_once('^') {
        Some((_, exp)) => exp
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim()
            .to_string(),
        None => "1".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(body: &str) -> Result<Vec<TokenKind>, InputError> {
        let masked = mask_comments(body);
        Lexer::new("doc.tex", body, &masked, 0..body.len())
            .tokenize()
            .map(|tokens| tokens.into_iter().map(|t| t.kind).collect())
    }

    fn reason(err: InputError) -> MalformedReason {
        match err {
            InputError::Malformed { reason, .. } => reason,
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn subscript_bracket_and_argument_references() {
        let kinds = lex("f_{i-2} u[i+1] f(r + 2h, t) g_i X_{i + 3}^{n}").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::GridRef { offset: -2 },
                TokenKind::GridRef { offset: 1 },
                TokenKind::GridRef { offset: 2 },
                TokenKind::GridRef { offset: 0 },
                TokenKind::GridRef { offset: 3 },
            ]
        );
    }

    #[test]
    fn greek_symbols_and_angular_arguments() {
        let kinds = lex("\\psi_{j-1} - \\psi(\\theta - \\Delta\\theta)").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::GridRef { offset: -1 },
                TokenKind::Minus,
                TokenKind::GridRef { offset: -1 },
            ]
        );
    }

    #[test]
    fn fractions_split_out_spacing() {
        let kinds = lex("\\frac{1}{12h} \\dfrac{-2}{3}").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Frac {
                    value: Coefficient::rational(1, 12).unwrap(),
                    spacing: 1,
                    text: "\\frac{1}{12h}".into(),
                },
                TokenKind::Frac {
                    value: Coefficient::rational(-2, 3).unwrap(),
                    spacing: 0,
                    text: "\\frac{-2}{3}".into(),
                },
            ]
        );
    }

    #[test]
    fn sizing_spacing_and_multiplication_are_handled() {
        let kinds = lex("\\left( 8 \\cdot f_{i} \\, \\right) / (2 h^2)").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Open,
                TokenKind::Number {
                    value: Coefficient::integer(8),
                    text: "8".into()
                },
                TokenKind::Times,
                TokenKind::GridRef { offset: 0 },
                TokenKind::Close,
                TokenKind::Slash,
                TokenKind::Open,
                TokenKind::Number {
                    value: Coefficient::integer(2),
                    text: "2".into()
                },
                TokenKind::Spacing { power: 2 },
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn big_o_spellings() {
        for (body, order) in [
            ("\\mathcal{O}(h^4)", "4"),
            ("\\mathcal O\\left(h^{6}\\right)", "6"),
            ("O(\\Delta r^2)", "2"),
            ("O(h)", "1"),
        ] {
            assert_eq!(
                lex(body).unwrap(),
                vec![TokenKind::BigO {
                    order: order.into()
                }],
                "{body}"
            );
        }
    }

    #[test]
    fn invalid_number_is_located() {
        let err = lex("f_{i} + 1.2.3 f_{i+1}").unwrap_err();
        match err {
            InputError::Malformed {
                locator: Some(loc),
                reason: MalformedReason::InvalidNumber { text },
                ..
            } => {
                assert_eq!(text, "1.2.3");
                assert_eq!(loc.column, 9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_tokens_fail() {
        assert!(matches!(
            reason(lex("f_{i} = 2").unwrap_err()),
            MalformedReason::UnrecognizedToken { token } if token == "="
        ));
        assert!(matches!(
            reason(lex("\\sin f_{i}").unwrap_err()),
            MalformedReason::UnrecognizedToken { token } if token == "\\sin"
        ));
        assert!(matches!(
            reason(lex("g_{rr}").unwrap_err()),
            MalformedReason::UnrecognizedToken { .. }
        ));
        assert!(matches!(
            reason(lex("\\frac{a}{2}").unwrap_err()),
            MalformedReason::UnrecognizedToken { token } if token == "a"
        ));
        assert!(matches!(
            reason(lex("\\frac{f_{i}}{0}").unwrap_err()),
            MalformedReason::InvalidNumber { text } if text == "0"
        ));
        assert!(matches!(
            reason(lex("\\frac{ }{2}").unwrap_err()),
            MalformedReason::InvalidNumber { .. }
        ));
    }

    #[test]
    fn fraction_over_a_sum_becomes_a_divided_group() {
        let kinds = lex("\\frac{f_{i+1} - f_{i-1}}{2h}").unwrap();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Open,
                TokenKind::GridRef { offset: 1 },
                TokenKind::Minus,
                TokenKind::GridRef { offset: -1 },
                TokenKind::Close,
                TokenKind::Slash,
                TokenKind::Open,
                TokenKind::Number {
                    value: Coefficient::integer(2),
                    text: "2".into()
                },
                TokenKind::Spacing { power: 1 },
                TokenKind::Close,
            ]
        );
        let kinds = lex("\\frac{u(\\theta + \\Delta\\theta)}{\\Delta\\theta} f_{i}").unwrap();
        assert_eq!(kinds[1], TokenKind::GridRef { offset: 1 });
        assert_eq!(kinds.last(), Some(&TokenKind::GridRef { offset: 0 }));
    }

    #[test]
    fn nested_fractions_are_capped() {
        let depth = MAX_NESTING + 10;
        let body = format!("{}f_{{i}}{}", "\\frac{".repeat(depth), "}{2}".repeat(depth));
        assert_eq!(
            reason(lex(&body).unwrap_err()),
            MalformedReason::NestingTooDeep { limit: MAX_NESTING }
        );

        let shallow = format!("{}f_{{i}}{}", "\\frac{".repeat(3), "}{2}".repeat(3));
        assert!(lex(&shallow).is_ok());
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert_eq!(
            reason(lex("\\frac{1}{2 f_{i}").unwrap_err()),
            MalformedReason::UnbalancedGroup
        );
    }

    #[test]
    fn comments_are_masked_in_place() {
        let text = "a % comment θ\n\\% kept % gone\n";
        let masked = mask_comments(text);
        assert_eq!(masked.len(), text.len());
        assert!(masked.starts_with("a  "));
        assert!(masked.contains("\\% kept "));
        assert!(!masked.contains("gone"));
        assert!(!masked.contains("comment"));
    }

    #[test]
    fn big_o_found_in_prose_tail() {
        let text = "\\quad \\text{error} \\mathcal{O}(h^4).";
        let found = find_big_o("doc.tex", text, text, 0..text.len());
        assert_eq!(found, Some(("4".to_string(), text.find("\\mathcal").unwrap())));
        assert_eq!(find_big_o("doc.tex", "Order", "Order", 0..5), None);
    }

    #[test]
    fn spacing_forms() {
        assert_eq!(parse_spacing("h"), Some(1));
        assert_eq!(parse_spacing("h^{2}"), Some(2));
        assert_eq!(parse_spacing("\\Delta r"), Some(1));
        assert_eq!(parse_spacing("(\\Delta \\theta)^2"), Some(2));
        assert_eq!(parse_spacing("\\delta x"), Some(1));
        assert_eq!(parse_spacing("k"), None);
        assert_eq!(split_denominator("12 h"), Some((Coefficient::integer(12), 1)));
        assert_eq!(split_denominator("6"), Some((Coefficient::integer(6), 0)));
        assert_eq!(split_denominator("2x"), None);
    }
}
