//! One stencil document → its stencils.
//!
//! A document may hold several `\approx` formulas; each becomes one
//! [`Stencil`]. Direction and order come from up to three sources (file
//! name, `%` headers, big-O annotation) which must agree when present.

use std::ops::Range;

use smallvec::SmallVec;
use tracing::{debug, warn};

use rk4tex_core::{
    Direction, InputError, MalformedReason, Order, Stencil, StencilEntry, StencilKey,
};

use crate::header::{scan_header, Header};
use crate::lexer::{find_big_o, mask_comments, Lexer};
use crate::naming::{parse_file_name, NameMetadata};
use crate::parser::parse_formula;

const APPROX: &str = "\\approx";

/// Text that ends a formula body.
const TERMINATORS: &[&str] = &[
    "\\quad", "\\qquad", "\\\\", "\\end{", "\\]", "$", "\\label", "\\tag", "\\text",
    "\\nonumber", "\\notag",
];

/// Byte ranges of one formula inside the masked text.
#[derive(Clone, Debug, PartialEq, Eq)]
struct FormulaSpan {
    /// Right-hand side after `\approx`.
    body: Range<usize>,
    /// Text after the body up to the next `\approx`.
    tail: Range<usize>,
}

/// Parse every formula of one document.
///
/// `document` identifies the source (its file name carries direction and
/// order by convention); `text` is the full LaTeX content.
///
/// # Errors
///
/// - [`InputError::Malformed`] for a grammar violation, an invalid or
///   contradictory order, or a document with no `\approx` formula.
/// - [`InputError::MissingDirectionOrOrder`] when no source names them.
pub fn parse_document(document: &str, text: &str) -> Result<Vec<Stencil>, InputError> {
    let masked = mask_comments(text);
    let header = scan_header(document, text)?;
    let name = parse_file_name(document);
    let spans = formula_spans(&masked);
    if spans.is_empty() {
        return Err(InputError::Malformed {
            document: document.to_string(),
            locator: None,
            reason: MalformedReason::NoCoefficients,
        });
    }

    let direction = resolve_direction(document, text, &name, &header)?;
    let mut stencils = Vec::with_capacity(spans.len());
    for span in spans {
        let tokens =
            Lexer::new(document, text, &masked, span.body.clone()).tokenize()?;
        let formula = parse_formula(document, text, &tokens, span.body.start)?;
        let big_o = formula
            .big_o
            .clone()
            .or_else(|| find_big_o(document, text, &masked, span.tail.clone()));
        let order = resolve_order(document, text, &name, &header, big_o.as_ref())?;

        let (direction, order) = match (direction, order) {
            (Some(d), Some(o)) => (d, o),
            (None, Some(_)) => return Err(missing(document, "direction")),
            (Some(_), None) => return Err(missing(document, "order")),
            (None, None) => return Err(missing(document, "direction and order")),
        };
        let key = StencilKey::new(direction, order);
        let entries: SmallVec<[StencilEntry; 9]> = formula
            .terms
            .iter()
            .map(|term| StencilEntry {
                direction,
                order,
                offset: term.offset,
                coefficient: term.coefficient,
            })
            .collect();
        if entries.len() != order.expected_width() {
            warn!(
                document,
                key = %key,
                width = entries.len(),
                expected = order.expected_width(),
                "stencil width differs from order + 1"
            );
        }
        debug!(document, key = %key, width = entries.len(), "parsed stencil");
        stencils.push(Stencil {
            key,
            entries,
            spacing_power: formula.spacing_power,
            variable: header.variable.clone(),
            variant: name.variant.clone(),
            document: document.to_string(),
        });
    }
    Ok(stencils)
}

fn missing(document: &str, what: &'static str) -> InputError {
    InputError::MissingDirectionOrOrder {
        document: document.to_string(),
        missing: what,
    }
}

fn formula_spans(masked: &str) -> Vec<FormulaSpan> {
    let starts: Vec<usize> = masked.match_indices(APPROX).map(|(i, _)| i).collect();
    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let body_start = start + APPROX.len();
            let limit = starts.get(n + 1).copied().unwrap_or(masked.len());
            let region = &masked[body_start..limit];
            let body_end = TERMINATORS
                .iter()
                .filter_map(|t| region.find(t))
                .min()
                .map_or(limit, |i| body_start + i);
            let trimmed = masked[body_start..body_end]
                .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | ';'))
                .len();
            FormulaSpan {
                body: body_start..body_start + trimmed,
                tail: body_end..limit,
            }
        })
        .collect()
}

fn resolve_direction(
    document: &str,
    text: &str,
    name: &NameMetadata,
    header: &Header,
) -> Result<Option<Direction>, InputError> {
    match (name.direction, &header.direction) {
        (Some(from_name), Some(declared)) if from_name != declared.value => {
            Err(InputError::malformed_at(
                document,
                text,
                declared.at,
                MalformedReason::ContradictoryMetadata {
                    what: "direction",
                    first: from_name.to_string(),
                    second: declared.raw.clone(),
                },
            ))
        }
        (Some(d), _) => Ok(Some(d)),
        (None, declared) => Ok(declared.as_ref().map(|h| h.value)),
    }
}

/// One claim about the order: raw text, parsed value, location.
struct OrderClaim {
    raw: String,
    value: Option<u32>,
    at: Option<usize>,
}

fn resolve_order(
    document: &str,
    text: &str,
    name: &NameMetadata,
    header: &Header,
    big_o: Option<&(String, usize)>,
) -> Result<Option<Order>, InputError> {
    let mut claims = Vec::new();
    if let Some((raw, value)) = &name.order {
        claims.push(OrderClaim {
            raw: raw.clone(),
            value: Some(*value),
            at: None,
        });
    }
    if let Some(declared) = &header.order {
        claims.push(OrderClaim {
            raw: declared.raw.clone(),
            value: declared.value,
            at: Some(declared.at),
        });
    }
    if let Some((raw, at)) = big_o {
        claims.push(OrderClaim {
            raw: raw.clone(),
            value: raw.parse().ok(),
            at: Some(*at),
        });
    }

    let error = |at: Option<usize>, reason: MalformedReason| match at {
        Some(at) => InputError::malformed_at(document, text, at, reason),
        None => InputError::Malformed {
            document: document.to_string(),
            locator: None,
            reason,
        },
    };

    let mut resolved: Option<(Order, &str)> = None;
    for claim in &claims {
        let order = claim.value.and_then(Order::new).ok_or_else(|| {
            error(
                claim.at,
                MalformedReason::InvalidOrder {
                    value: claim.raw.clone(),
                },
            )
        })?;
        match resolved {
            Some((first, first_raw)) if first != order => {
                return Err(error(
                    claim.at,
                    MalformedReason::ContradictoryMetadata {
                        what: "order",
                        first: first_raw.to_string(),
                        second: claim.raw.clone(),
                    },
                ));
            }
            Some(_) => {}
            None => resolved = Some((order, &claim.raw)),
        }
    }
    Ok(resolved.map(|(order, _)| order))
}
