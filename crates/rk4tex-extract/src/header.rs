//! `% Key: value` comment headers.

use rk4tex_core::{Direction, InputError, MalformedReason};

/// A header value and the byte offset of its line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct HeaderValue<T> {
    pub raw: String,
    pub value: T,
    pub at: usize,
}

/// Metadata declared in comment headers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Header {
    pub variable: Option<String>,
    pub direction: Option<HeaderValue<Direction>>,
    /// `value` is `None` when the text names no recognizable number.
    pub order: Option<HeaderValue<Option<u32>>>,
}

/// Scan every comment line for `Variable`, `Direction` and `Order`
/// headers. Keys are case-insensitive; other comments are ignored.
///
/// A repeated header must repeat the same value.
pub(crate) fn scan_header(document: &str, text: &str) -> Result<Header, InputError> {
    let mut header = Header::default();
    let mut line_start = 0;
    for line in text.split_inclusive('\n') {
        let at = line_start;
        line_start += line.len();
        let Some(comment) = line.trim_start().strip_prefix('%') else {
            continue;
        };
        let Some((key, value)) = comment.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let contradiction = |what: &'static str, first: &str| {
            InputError::malformed_at(
                document,
                text,
                at,
                MalformedReason::ContradictoryMetadata {
                    what,
                    first: first.to_string(),
                    second: value.to_string(),
                },
            )
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "variable" => match &header.variable {
                Some(first) if first != value => return Err(contradiction("variable", first)),
                Some(_) => {}
                None => header.variable = Some(value.to_string()),
            },
            "direction" => {
                let direction = parse_direction(value).ok_or_else(|| {
                    InputError::malformed_at(
                        document,
                        text,
                        at,
                        MalformedReason::UnrecognizedToken {
                            token: value.to_string(),
                        },
                    )
                })?;
                match &header.direction {
                    Some(first) if first.value != direction => {
                        return Err(contradiction("direction", &first.raw));
                    }
                    Some(_) => {}
                    None => {
                        header.direction = Some(HeaderValue {
                            raw: value.to_string(),
                            value: direction,
                            at,
                        });
                    }
                }
            }
            "order" => {
                let order = parse_order(value);
                match &header.order {
                    Some(first) if first.value != order => {
                        return Err(contradiction("order", &first.raw));
                    }
                    Some(_) => {}
                    None => {
                        header.order = Some(HeaderValue {
                            raw: value.to_string(),
                            value: order,
                            at,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    Ok(header)
}

/// The whole value, or its first word: `radial (r)` → radial.
fn parse_direction(value: &str) -> Option<Direction> {
    Direction::from_alias(value).or_else(|| {
        value
            .split(|c: char| c.is_whitespace() || c == ',' || c == '(')
            .find(|w| !w.is_empty())
            .and_then(Direction::from_alias)
    })
}

/// First integer in the text, or an ordinal word: `4`, `O(h^4)`,
/// `fourth-order`.
fn parse_order(value: &str) -> Option<u32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }
    let lower = value.to_ascii_lowercase();
    [
        ("second", 2),
        ("fourth", 4),
        ("sixth", 6),
        ("eighth", 8),
        ("tenth", 10),
    ]
    .iter()
    .find(|(word, _)| lower.contains(word))
    .map(|&(_, n)| n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_three_headers() {
        let text = "% Variable: f\n% direction: theta\n%   ORDER: fourth\n\\[ x \\]\n";
        let header = scan_header("doc.tex", text).unwrap();
        assert_eq!(header.variable.as_deref(), Some("f"));
        let direction = header.direction.unwrap();
        assert_eq!(direction.value, Direction::Angular);
        assert_eq!(direction.at, text.find("% direction").unwrap());
        assert_eq!(header.order.unwrap().value, Some(4));
    }

    #[test]
    fn unrelated_comments_are_ignored() {
        let header = scan_header("doc.tex", "% generated by hand\n% Note: see appendix\n").unwrap();
        assert_eq!(header, Header::default());
    }

    #[test]
    fn order_text_forms() {
        assert_eq!(parse_order("6"), Some(6));
        assert_eq!(parse_order("O(h^2)"), Some(2));
        assert_eq!(parse_order("Second order"), Some(2));
        assert_eq!(parse_order("high"), None);
    }

    #[test]
    fn unknown_direction_is_located() {
        let err = scan_header("doc.tex", "% Direction: sideways\n").unwrap_err();
        match err {
            InputError::Malformed {
                locator: Some(loc),
                reason: MalformedReason::UnrecognizedToken { token },
                ..
            } => {
                assert_eq!(token, "sideways");
                assert_eq!(loc.line, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn repeated_header_must_agree() {
        assert!(scan_header("d", "% Order: 4\n% Order: 4\n").is_ok());
        let err = scan_header("d", "% Order: 4\n% Order: 6\n").unwrap_err();
        assert!(matches!(
            err,
            InputError::Malformed {
                reason: MalformedReason::ContradictoryMetadata { what: "order", .. },
                ..
            }
        ));
    }
}
