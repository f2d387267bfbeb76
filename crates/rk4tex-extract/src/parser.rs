//! Term grammar over lexed formula tokens.
//!
//! ```text
//! sum     := term (('+' | '-') term)*
//! term    := sign* (coef '*'? (ref | group) | ref | group)
//! group   := '(' sum ')' ('/' divisor)?      (also `\frac{sum}{divisor}`)
//! coef    := number ('/' (number | spacing))? | frac
//! divisor := number? spacing? | '(' number? spacing? ')'
//! ```
//!
//! A reference that does not start a term, a coefficient that is not
//! followed by a reference or group, and a sign with no term after it
//! are malformed. Groups nest at most [`MAX_NESTING`] deep.

use rk4tex_core::{Coefficient, InputError, MalformedReason};

use crate::lexer::{Token, TokenKind, MAX_NESTING};

/// One weighted grid reference.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Term {
    pub offset: i32,
    pub coefficient: Coefficient,
    /// Power of the grid spacing dividing this term.
    pub spacing: u32,
    pub at: usize,
}

/// A parsed formula body.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Formula {
    /// Terms in document order, offsets unique.
    pub terms: Vec<Term>,
    /// Common spacing power of every term.
    pub spacing_power: u32,
    /// First big-O annotation met inside the body: `(raw order, at)`.
    pub big_o: Option<(String, usize)>,
}

/// Parse a token stream that starts at byte `start` of `source`.
pub(crate) fn parse_formula(
    document: &str,
    source: &str,
    tokens: &[Token],
    start: usize,
) -> Result<Formula, InputError> {
    let mut parser = Parser {
        document,
        source,
        tokens,
        pos: 0,
        terms: Vec::new(),
        big_o: None,
        depth: 0,
    };
    parser.sum(Coefficient::ONE, 0, None)?;

    let Some(first) = parser.terms.first() else {
        return Err(parser.error(start, MalformedReason::NoCoefficients));
    };
    let spacing_power = first.spacing;
    if let Some(odd) = parser.terms.iter().find(|t| t.spacing != spacing_power) {
        return Err(parser.error(odd.at, MalformedReason::InconsistentSpacing));
    }
    Ok(Formula {
        terms: parser.terms,
        spacing_power,
        big_o: parser.big_o,
    })
}

struct Parser<'a> {
    document: &'a str,
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
    terms: Vec<Term>,
    big_o: Option<(String, usize)>,
    /// Groups currently open.
    depth: usize,
}

impl Parser<'_> {
    fn error(&self, at: usize, reason: MalformedReason) -> InputError {
        InputError::malformed_at(self.document, self.source, at, reason)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, ahead: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + ahead).map(|t| &t.kind)
    }

    fn overflow(&self, at: usize, text: &str) -> InputError {
        self.error(
            at,
            MalformedReason::InvalidNumber {
                text: text.to_string(),
            },
        )
    }

    /// Parse terms until end of input or the `Close` matching `open_at`.
    fn sum(
        &mut self,
        scale: Coefficient,
        spacing: u32,
        open_at: Option<usize>,
    ) -> Result<(), InputError> {
        let mut sign = Coefficient::ONE;
        // sign token still waiting for its term
        let mut pending: Option<(usize, &'static str)> = None;
        let mut at_term_start = true;
        loop {
            let Some(token) = self.tokens.get(self.pos).cloned() else {
                self.dangling_sign(pending)?;
                return match open_at {
                    Some(at) => Err(self.error(at, MalformedReason::UnbalancedGroup)),
                    None => Ok(()),
                };
            };
            let at = token.at;
            if matches!(
                token.kind,
                TokenKind::GridRef { .. }
                    | TokenKind::Number { .. }
                    | TokenKind::Frac { .. }
                    | TokenKind::Open
            ) {
                pending = None;
            }
            match token.kind {
                TokenKind::Close => {
                    self.dangling_sign(pending)?;
                    if open_at.is_none() {
                        return Err(self.error(at, MalformedReason::UnbalancedGroup));
                    }
                    self.pos += 1;
                    return Ok(());
                }
                TokenKind::BigO { order } => {
                    self.pos += 1;
                    if self.big_o.is_none() {
                        self.big_o = Some((order, at));
                    }
                    // the sign belonged to the error term
                    sign = Coefficient::ONE;
                    pending = None;
                }
                TokenKind::Plus => {
                    self.pos += 1;
                    pending = Some((at, "+"));
                    at_term_start = true;
                }
                TokenKind::Minus => {
                    self.pos += 1;
                    sign = -sign;
                    pending = Some((at, "-"));
                    at_term_start = true;
                }
                TokenKind::GridRef { offset } => {
                    if !at_term_start {
                        return Err(
                            self.error(at, MalformedReason::OffsetWithoutCoefficient { offset })
                        );
                    }
                    self.pos += 1;
                    let coefficient = scale
                        .checked_mul(sign)
                        .ok_or_else(|| self.overflow(at, "coefficient"))?;
                    self.push(offset, coefficient, spacing, at)?;
                    sign = Coefficient::ONE;
                    at_term_start = false;
                }
                TokenKind::Number { .. } | TokenKind::Frac { .. } => {
                    let (coef, coef_spacing, text) = self.coefficient()?;
                    if !at_term_start {
                        return Err(self.error(
                            at,
                            MalformedReason::CoefficientWithoutOffset { coefficient: text },
                        ));
                    }
                    if self.peek() == Some(&TokenKind::Times) {
                        self.pos += 1;
                    }
                    let weight = scale
                        .checked_mul(sign)
                        .and_then(|s| s.checked_mul(coef))
                        .ok_or_else(|| self.overflow(at, &text))?;
                    let spacing = spacing.saturating_add(coef_spacing);
                    match self.tokens.get(self.pos).cloned() {
                        Some(Token {
                            kind: TokenKind::GridRef { offset },
                            at: ref_at,
                        }) => {
                            self.pos += 1;
                            self.push(offset, weight, spacing, ref_at)?;
                        }
                        Some(Token {
                            kind: TokenKind::Open,
                            at: open,
                        }) => {
                            self.pos += 1;
                            self.group(weight, spacing, open)?;
                        }
                        _ => {
                            return Err(self.error(
                                at,
                                MalformedReason::CoefficientWithoutOffset { coefficient: text },
                            ));
                        }
                    }
                    sign = Coefficient::ONE;
                    at_term_start = false;
                }
                TokenKind::Open => {
                    if !at_term_start {
                        return Err(self.error(
                            at,
                            MalformedReason::UnrecognizedToken { token: "(".into() },
                        ));
                    }
                    self.pos += 1;
                    let weight = scale
                        .checked_mul(sign)
                        .ok_or_else(|| self.overflow(at, "coefficient"))?;
                    self.group(weight, spacing, at)?;
                    sign = Coefficient::ONE;
                    at_term_start = false;
                }
                kind @ (TokenKind::Times | TokenKind::Slash) => {
                    let token = if kind == TokenKind::Times { "*" } else { "/" };
                    return Err(self.error(
                        at,
                        MalformedReason::UnrecognizedToken {
                            token: token.into(),
                        },
                    ));
                }
                TokenKind::Spacing { .. } => {
                    return Err(self.error(
                        at,
                        MalformedReason::UnrecognizedToken { token: "h".into() },
                    ));
                }
            }
        }
    }

    fn dangling_sign(&self, pending: Option<(usize, &'static str)>) -> Result<(), InputError> {
        match pending {
            Some((at, sign)) => Err(self.error(
                at,
                MalformedReason::CoefficientWithoutOffset {
                    coefficient: sign.into(),
                },
            )),
            None => Ok(()),
        }
    }

    /// A parenthesized sum with an optional trailing `/ divisor`.
    fn group(
        &mut self,
        scale: Coefficient,
        spacing: u32,
        open_at: usize,
    ) -> Result<(), InputError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(
                open_at,
                MalformedReason::NestingTooDeep { limit: MAX_NESTING },
            ));
        }
        let first = self.terms.len();
        self.depth += 1;
        let inner = self.sum(scale, spacing, Some(open_at));
        self.depth -= 1;
        inner?;
        if self.peek() != Some(&TokenKind::Slash) {
            return Ok(());
        }
        let slash_at = self.tokens[self.pos].at;
        self.pos += 1;
        let (divisor, divisor_spacing) = self.divisor(slash_at)?;
        for index in first..self.terms.len() {
            let term = &self.terms[index];
            let coefficient = term
                .coefficient
                .checked_div(divisor)
                .ok_or_else(|| self.overflow(slash_at, &divisor.to_string()))?;
            let term = &mut self.terms[index];
            term.coefficient = coefficient;
            term.spacing = term.spacing.saturating_add(divisor_spacing);
        }
        Ok(())
    }

    fn divisor(&mut self, slash_at: usize) -> Result<(Coefficient, u32), InputError> {
        let parenthesized = self.peek() == Some(&TokenKind::Open);
        if parenthesized {
            self.pos += 1;
        }
        let mut value = Coefficient::ONE;
        let mut spacing = 0;
        let mut any = false;
        if let Some(TokenKind::Number { value: n, .. }) = self.peek() {
            value = *n;
            any = true;
            self.pos += 1;
        }
        if let Some(TokenKind::Spacing { power }) = self.peek() {
            spacing = *power;
            any = true;
            self.pos += 1;
        }
        if parenthesized {
            if self.peek() != Some(&TokenKind::Close) {
                return Err(self.error(slash_at, MalformedReason::UnbalancedGroup));
            }
            self.pos += 1;
        }
        if !any || value.is_zero() {
            return Err(self.error(
                slash_at,
                MalformedReason::UnrecognizedToken { token: "/".into() },
            ));
        }
        Ok((value, spacing))
    }

    /// Consume a coefficient: `8`, `1/12`, `8/h`, `\frac{1}{12h}`.
    fn coefficient(&mut self) -> Result<(Coefficient, u32, String), InputError> {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        match token.kind {
            TokenKind::Frac {
                value,
                spacing,
                text,
            } => Ok((value, spacing, text)),
            TokenKind::Number { value, text } => {
                if self.peek() != Some(&TokenKind::Slash) {
                    return Ok((value, 0, text));
                }
                match self.peek_at(1).cloned() {
                    Some(TokenKind::Number { value: den, text: den_text }) => {
                        self.pos += 2;
                        let text = format!("{text}/{den_text}");
                        let value = value.checked_div(den).ok_or_else(|| {
                            self.error(
                                token.at,
                                MalformedReason::InvalidNumber { text: text.clone() },
                            )
                        })?;
                        let spacing = match self.peek() {
                            Some(TokenKind::Spacing { power }) => {
                                let power = *power;
                                self.pos += 1;
                                power
                            }
                            _ => 0,
                        };
                        Ok((value, spacing, text))
                    }
                    Some(TokenKind::Spacing { power }) => {
                        self.pos += 2;
                        Ok((value, power, format!("{text}/h")))
                    }
                    _ => Ok((value, 0, text)),
                }
            }
            _ => Err(self.error(
                token.at,
                MalformedReason::UnrecognizedToken {
                    token: "coefficient".into(),
                },
            )),
        }
    }

    fn push(
        &mut self,
        offset: i32,
        coefficient: Coefficient,
        spacing: u32,
        at: usize,
    ) -> Result<(), InputError> {
        if self.terms.iter().any(|t| t.offset == offset) {
            return Err(self.error(at, MalformedReason::DuplicateOffset { offset }));
        }
        self.terms.push(Term {
            offset,
            coefficient,
            spacing,
            at,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{mask_comments, Lexer};

    fn parse(body: &str) -> Result<Formula, InputError> {
        let masked = mask_comments(body);
        let tokens = Lexer::new("doc.tex", body, &masked, 0..body.len()).tokenize()?;
        parse_formula("doc.tex", body, &tokens, 0)
    }

    fn weights(formula: &Formula) -> Vec<(i32, Coefficient)> {
        formula
            .terms
            .iter()
            .map(|t| (t.offset, t.coefficient))
            .collect()
    }

    fn reason(err: InputError) -> MalformedReason {
        match err {
            InputError::Malformed { reason, .. } => reason,
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    fn q(num: i64, den: i64) -> Coefficient {
        Coefficient::rational(num, den).unwrap()
    }

    #[test]
    fn decimal_weights_with_zero_center() {
        let formula = parse("-0.5 f_{i-1} + 0 f_{i} + 0.5 f_{i+1}").unwrap();
        assert_eq!(
            weights(&formula),
            vec![
                (-1, Coefficient::Decimal(-0.5)),
                (0, Coefficient::ZERO),
                (1, Coefficient::Decimal(0.5)),
            ]
        );
        assert_eq!(formula.spacing_power, 0);
    }

    #[test]
    fn prefactor_distributes_over_group() {
        let formula =
            parse("\\frac{1}{12h}\\left(f_{i-2} - 8f_{i-1} + 8f_{i+1} - f_{i+2}\\right)").unwrap();
        assert_eq!(
            weights(&formula),
            vec![(-2, q(1, 12)), (-1, q(-2, 3)), (1, q(2, 3)), (2, q(-1, 12))]
        );
        assert_eq!(formula.spacing_power, 1);
    }

    #[test]
    fn group_divisor_applies_to_group_terms() {
        let formula = parse("(f_{i+1} - f_{i-1}) / (2h)").unwrap();
        assert_eq!(weights(&formula), vec![(1, q(1, 2)), (-1, q(-1, 2))]);
        assert_eq!(formula.spacing_power, 1);
    }

    #[test]
    fn per_term_fractions_and_slash_rationals() {
        let err = parse("\\frac{1}{2h} f_{i+1} - 1/2 \\cdot f_{i-1}/h").unwrap_err();
        // a trailing /h after a reference is not part of the grammar
        assert!(matches!(reason(err), MalformedReason::UnrecognizedToken { .. }));

        let formula = parse("\\frac{1}{2h} f_{i+1} - \\frac{1}{2h} f_{i-1}").unwrap();
        assert_eq!(weights(&formula), vec![(1, q(1, 2)), (-1, q(-1, 2))]);

        let formula = parse("1/2 f_{i+1} - 1/2 f_{i-1}").unwrap();
        assert_eq!(weights(&formula), vec![(1, q(1, 2)), (-1, q(-1, 2))]);
    }

    #[test]
    fn bare_reference_has_unit_weight() {
        let formula = parse("f_{i+1} - f_{i}").unwrap();
        assert_eq!(
            weights(&formula),
            vec![(1, Coefficient::ONE), (0, Coefficient::integer(-1))]
        );
    }

    #[test]
    fn big_o_inside_body_is_captured() {
        let formula = parse("f_{i+1} - f_{i} + \\mathcal{O}(h^2)").unwrap();
        assert_eq!(formula.big_o.map(|(o, _)| o), Some("2".to_string()));
        assert_eq!(formula.terms.len(), 2);
    }

    #[test]
    fn duplicate_offset_is_rejected() {
        assert_eq!(
            reason(parse("f_{i+1} - f_{i+1}").unwrap_err()),
            MalformedReason::DuplicateOffset { offset: 1 }
        );
    }

    #[test]
    fn dangling_coefficient_is_rejected() {
        assert_eq!(
            reason(parse("f_{i+1} - 8").unwrap_err()),
            MalformedReason::CoefficientWithoutOffset {
                coefficient: "8".into()
            }
        );
    }

    #[test]
    fn adjacent_references_are_rejected() {
        assert_eq!(
            reason(parse("f_{i} f_{i+1}").unwrap_err()),
            MalformedReason::OffsetWithoutCoefficient { offset: 1 }
        );
    }

    #[test]
    fn mixed_spacing_is_rejected() {
        assert_eq!(
            reason(parse("\\frac{1}{h} f_{i+1} - f_{i}").unwrap_err()),
            MalformedReason::InconsistentSpacing
        );
    }

    #[test]
    fn empty_body_has_no_coefficients() {
        assert_eq!(
            reason(parse("  ").unwrap_err()),
            MalformedReason::NoCoefficients
        );
    }

    #[test]
    fn fraction_over_sum_divides_each_term() {
        let formula = parse("\\frac{f_{i+1} - f_{i-1}}{2h}").unwrap();
        assert_eq!(weights(&formula), vec![(1, q(1, 2)), (-1, q(-1, 2))]);
        assert_eq!(formula.spacing_power, 1);

        let formula =
            parse("\\frac{-f(r+2h,t) + 8f(r+h,t) - 8f(r-h,t) + f(r-2h,t)}{12h}").unwrap();
        assert_eq!(
            weights(&formula),
            vec![(2, q(-1, 12)), (1, q(2, 3)), (-1, q(-2, 3)), (-2, q(1, 12))]
        );
        assert_eq!(formula.spacing_power, 1);

        let formula = parse("-\\frac{1}{2} \\frac{f_{i+1} - 2f_{i} + f_{i-1}}{h^2}").unwrap();
        assert_eq!(
            weights(&formula),
            vec![(1, q(-1, 2)), (0, Coefficient::ONE), (-1, q(-1, 2))]
        );
        assert_eq!(formula.spacing_power, 2);
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let depth = 5_000;
        let body = format!("{}f_{{i}}{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            reason(parse(&body).unwrap_err()),
            MalformedReason::NestingTooDeep { limit: MAX_NESTING }
        );

        let body = format!("{}f_{{i}}{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse(&body).unwrap().terms.len(), 1);
    }

    #[test]
    fn trailing_sign_is_rejected() {
        for body in ["0.5 f_{i+1} - 0.5 f_{i-1} -", "f_{i+1} +", "(f_{i+1} - f_{i} -) / h"] {
            assert!(
                matches!(
                    reason(parse(body).unwrap_err()),
                    MalformedReason::CoefficientWithoutOffset { .. }
                ),
                "{body}"
            );
        }
        assert_eq!(
            reason(parse("f_{i+1} - f_{i} -").unwrap_err()),
            MalformedReason::CoefficientWithoutOffset {
                coefficient: "-".into()
            }
        );
    }

    #[test]
    fn sign_of_error_term_does_not_leak() {
        let formula = parse("f_{i+1} - \\mathcal{O}(h^2) + f_{i}").unwrap();
        assert_eq!(
            weights(&formula),
            vec![(1, Coefficient::ONE), (0, Coefficient::ONE)]
        );
        let formula = parse("f_{i+1} - f_{i} - O(h)").unwrap();
        assert_eq!(formula.terms.len(), 2);
    }

    #[test]
    fn unbalanced_group_is_rejected() {
        assert_eq!(
            reason(parse("(f_{i+1} - f_{i}").unwrap_err()),
            MalformedReason::UnbalancedGroup
        );
        assert_eq!(
            reason(parse("f_{i+1} - f_{i})").unwrap_err()),
            MalformedReason::UnbalancedGroup
        );
    }
}
