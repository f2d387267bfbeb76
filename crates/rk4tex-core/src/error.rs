//! Error types for rk4tex.
//!
//! Organized by pipeline stage: input (stencil extraction), assembly
//! (RK4 formula construction), and output (document write). Every
//! variant names the document, field, or path that must be corrected.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::stencil::{Order, StencilKey};
use crate::Direction;

const SNIPPET_CHARS: usize = 40;

/// Position of a problem inside a source document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locator {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Up to 40 characters of the offending line, starting at the column.
    pub snippet: String,
}

impl Locator {
    /// Build a locator for byte offset `at` in `text`.
    ///
    /// Offsets past the end clamp to the end; offsets inside a multi-byte
    /// character snap back to its first byte.
    pub fn at(text: &str, at: usize) -> Self {
        let mut at = at.min(text.len());
        while !text.is_char_boundary(at) {
            at -= 1;
        }
        let before = &text[..at];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = text[line_start..at].chars().count() + 1;
        let snippet = text[at..]
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(SNIPPET_CHARS)
            .collect::<String>()
            .trim_end()
            .to_string();
        Self {
            line,
            column,
            snippet,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)?;
        if !self.snippet.is_empty() {
            write!(f, " near `{}`", self.snippet)?;
        }
        Ok(())
    }
}

/// Why a stencil document could not be turned into entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MalformedReason {
    /// The document (or one of its formulas) has no grid-point terms.
    NoCoefficients,
    /// A grid reference follows another term without a sign or weight.
    OffsetWithoutCoefficient {
        /// Offset of the orphaned reference.
        offset: i32,
    },
    /// A weight is not attached to any grid reference.
    CoefficientWithoutOffset {
        /// The weight as written.
        coefficient: String,
    },
    /// A numeric token could not be parsed.
    InvalidNumber {
        /// The token as written.
        text: String,
    },
    /// The same offset appears twice in one formula.
    DuplicateOffset {
        /// The repeated offset.
        offset: i32,
    },
    /// A token outside the recognized pattern set.
    UnrecognizedToken {
        /// The token as written.
        token: String,
    },
    /// Parentheses or braces do not balance.
    UnbalancedGroup,
    /// Groups or fractions nest deeper than the parser accepts.
    NestingTooDeep {
        /// Maximum accepted depth.
        limit: usize,
    },
    /// A truncation order that is not a positive even integer.
    InvalidOrder {
        /// The order as written.
        value: String,
    },
    /// Terms carry different powers of the grid spacing.
    InconsistentSpacing,
    /// Two metadata sources disagree.
    ContradictoryMetadata {
        /// Which property (`"direction"` or `"order"`).
        what: &'static str,
        /// First value seen.
        first: String,
        /// Conflicting value.
        second: String,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCoefficients => write!(f, "no finite-difference coefficients found"),
            Self::OffsetWithoutCoefficient { offset } => {
                write!(f, "grid offset {offset:+} has no matching coefficient")
            }
            Self::CoefficientWithoutOffset { coefficient } => {
                write!(f, "coefficient `{coefficient}` has no grid offset")
            }
            Self::InvalidNumber { text } => write!(f, "unparseable number `{text}`"),
            Self::DuplicateOffset { offset } => {
                write!(f, "grid offset {offset:+} defined more than once")
            }
            Self::UnrecognizedToken { token } => write!(f, "unrecognized token `{token}`"),
            Self::UnbalancedGroup => write!(f, "unbalanced parentheses or braces"),
            Self::NestingTooDeep { limit } => {
                write!(f, "groups nested more than {limit} levels deep")
            }
            Self::InvalidOrder { value } => {
                write!(f, "order `{value}` is not a positive even integer")
            }
            Self::InconsistentSpacing => {
                write!(f, "terms use different powers of the grid spacing")
            }
            Self::ContradictoryMetadata { what, first, second } => {
                write!(f, "{what} given as both `{first}` and `{second}`")
            }
        }
    }
}

/// Errors from reading and parsing stencil documents.
#[derive(Debug)]
pub enum InputError {
    /// A document or the input directory could not be read.
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The input directory holds no `stencil_*.tex` documents.
    NoDocuments {
        /// The directory searched.
        dir: PathBuf,
    },
    /// A document's content violates the stencil grammar.
    Malformed {
        /// Source document identifier.
        document: String,
        /// Where in the document, when known.
        locator: Option<Locator>,
        /// What went wrong.
        reason: MalformedReason,
    },
    /// Two documents define the same key differently.
    ConflictingDefinition {
        /// The contested direction/order pair.
        key: StencilKey,
        /// Document that defined the key first.
        first_document: String,
        /// Document with the conflicting definition.
        second_document: String,
        /// Description of the first difference found.
        detail: String,
    },
    /// Neither the filename nor the content determines direction or order.
    MissingDirectionOrOrder {
        /// Source document identifier.
        document: String,
        /// `"direction"`, `"order"`, or `"direction and order"`.
        missing: &'static str,
    },
}

impl InputError {
    /// Shorthand for a [`InputError::Malformed`] located in `text`.
    pub fn malformed_at(
        document: impl Into<String>,
        text: &str,
        at: usize,
        reason: MalformedReason,
    ) -> Self {
        Self::Malformed {
            document: document.into(),
            locator: Some(Locator::at(text, at)),
            reason,
        }
    }

    /// The document this error is attributed to, if any.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Malformed { document, .. } | Self::MissingDirectionOrOrder { document, .. } => {
                Some(document)
            }
            Self::ConflictingDefinition {
                second_document, ..
            } => Some(second_document),
            Self::Io { .. } | Self::NoDocuments { .. } => None,
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::NoDocuments { dir } => {
                write!(f, "no stencil_*.tex documents found in {}", dir.display())
            }
            Self::Malformed {
                document,
                locator,
                reason,
            } => {
                write!(f, "{document}: malformed stencil")?;
                if let Some(loc) = locator {
                    write!(f, " at {loc}")?;
                }
                write!(f, ": {reason}")
            }
            Self::ConflictingDefinition {
                key,
                first_document,
                second_document,
                detail,
            } => write!(
                f,
                "{second_document}: conflicting definition of {key} \
                 (already defined by {first_document}): {detail}"
            ),
            Self::MissingDirectionOrOrder { document, missing } => write!(
                f,
                "{document}: cannot determine stencil {missing} from filename or content"
            ),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors from building RK4 formulas for the evolved fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssemblyError {
    /// No evolved fields were supplied.
    EmptyFieldList,
    /// A field's template needs a stencil absent from the table.
    UnresolvedDerivative {
        /// Field name.
        field: String,
        /// Requested direction.
        direction: Direction,
        /// Requested truncation order.
        order: Order,
    },
    /// A field's RHS template uses an unknown or incomplete placeholder.
    InvalidTemplate {
        /// Field name.
        field: String,
        /// What is wrong with the template.
        detail: String,
    },
    /// Two fields share a name.
    DuplicateField {
        /// The repeated name.
        name: String,
    },
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFieldList => write!(f, "no evolved fields supplied"),
            Self::UnresolvedDerivative {
                field,
                direction,
                order,
            } => write!(
                f,
                "field '{field}': no {direction} stencil of order {order} in the stencil table"
            ),
            Self::InvalidTemplate { field, detail } => {
                write!(f, "field '{field}': invalid RHS template: {detail}")
            }
            Self::DuplicateField { name } => write!(f, "field '{name}' declared more than once"),
        }
    }
}

impl Error for AssemblyError {}

/// Errors from writing the generated document.
#[derive(Debug)]
pub enum OutputError {
    /// The destination could not be written or replaced.
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot write {}: {source}", path.display()),
        }
    }
}

impl Error for OutputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}
