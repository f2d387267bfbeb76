//! Stencil entries and the normalized [`StencilTable`].

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::coefficient::Coefficient;
use crate::direction::Direction;
use crate::error::InputError;

/// Truncation order of a finite-difference approximation.
///
/// Always a positive even integer: the power of the grid spacing at
/// which the leading error term appears (`O(h^4)` → order 4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Order(u32);

impl Order {
    /// Returns `None` unless `n` is positive and even.
    pub fn new(n: u32) -> Option<Self> {
        (n > 0 && n % 2 == 0).then_some(Self(n))
    }

    /// The raw order.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Point count of a centered first-derivative stencil of this order.
    pub fn expected_width(self) -> usize {
        self.0 as usize + 1
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `(direction, order)` pair a stencil is filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StencilKey {
    /// Differentiation axis.
    pub direction: Direction,
    /// Truncation order.
    pub order: Order,
}

impl StencilKey {
    /// Build a key.
    pub fn new(direction: Direction, order: Order) -> Self {
        Self { direction, order }
    }
}

impl fmt::Display for StencilKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, order {}", self.direction, self.order)
    }
}

/// One finite-difference weight at one grid offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StencilEntry {
    /// Differentiation axis.
    pub direction: Direction,
    /// Truncation order of the stencil this weight belongs to.
    pub order: Order,
    /// Grid offset relative to the evaluation point.
    pub offset: i32,
    /// Weight applied to the value at `offset`.
    pub coefficient: Coefficient,
}

impl StencilEntry {
    /// The key of the stencil this entry belongs to.
    pub fn key(&self) -> StencilKey {
        StencilKey::new(self.direction, self.order)
    }
}

/// Shape of a stencil's offset set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Support {
    /// Offsets are symmetric about zero.
    Centered,
    /// All offsets are `>= 0`.
    Forward,
    /// All offsets are `<= 0`.
    Backward,
    /// Mixed signs without symmetry.
    Skewed,
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Centered => "centered",
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Skewed => "skewed",
        })
    }
}

/// A complete stencil extracted from one formula of one document.
#[derive(Clone, Debug, PartialEq)]
pub struct Stencil {
    /// Direction and order.
    pub key: StencilKey,
    /// Weights in document order; offsets are unique.
    pub entries: SmallVec<[StencilEntry; 9]>,
    /// Power of the grid spacing dividing the weighted sum (0 if the
    /// document gives pre-scaled weights).
    pub spacing_power: u32,
    /// The differentiated variable named in the document header.
    pub variable: Option<String>,
    /// Variant label from the filename (`central`, `forward`, ...).
    pub variant: Option<String>,
    /// Identifier of the source document.
    pub document: String,
}

impl Stencil {
    /// Number of grid points.
    pub fn width(&self) -> usize {
        self.entries.len()
    }

    /// Offsets in document order.
    pub fn offsets(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|e| e.offset)
    }

    /// Weight at `offset`, if the stencil touches it.
    pub fn coefficient_at(&self, offset: i32) -> Option<Coefficient> {
        self.entries
            .iter()
            .find(|e| e.offset == offset)
            .map(|e| e.coefficient)
    }

    /// Classify the offset set.
    pub fn support(&self) -> Support {
        if self.offsets().all(|o| self.coefficient_at(-o).is_some()) {
            Support::Centered
        } else if self.offsets().all(|o| o >= 0) {
            Support::Forward
        } else if self.offsets().all(|o| o <= 0) {
            Support::Backward
        } else {
            Support::Skewed
        }
    }

    /// Compare two definitions of the same key.
    ///
    /// Returns `None` when they define the same offsets, weights and
    /// spacing power, otherwise a description of the first difference.
    pub fn difference(&self, other: &Stencil) -> Option<String> {
        let mut mine: Vec<i32> = self.offsets().collect();
        let mut theirs: Vec<i32> = other.offsets().collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        if mine != theirs {
            return Some(format!("offsets {mine:?} vs {theirs:?}"));
        }
        for entry in &self.entries {
            let Some(other_coef) = other.coefficient_at(entry.offset) else {
                continue;
            };
            if !entry.coefficient.same_value(&other_coef) {
                return Some(format!(
                    "coefficient at offset {:+} is {} vs {}",
                    entry.offset, entry.coefficient, other_coef
                ));
            }
        }
        if self.spacing_power != other.spacing_power {
            return Some(format!(
                "grid spacing power {} vs {}",
                self.spacing_power, other.spacing_power
            ));
        }
        None
    }
}

/// Mapping from `(direction, order)` to its stencil, in document order.
///
/// Owned and populated exclusively by the extractor; read-only for the
/// assembler.
#[derive(Clone, Debug, Default)]
pub struct StencilTable {
    stencils: IndexMap<StencilKey, Stencil>,
}

impl StencilTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stencil.
    ///
    /// Returns `Ok(true)` when the key is new and `Ok(false)` when an
    /// identical definition already exists (the first is kept).
    ///
    /// # Errors
    ///
    /// [`InputError::ConflictingDefinition`] if the key is already
    /// defined differently.
    pub fn insert(&mut self, stencil: Stencil) -> Result<bool, InputError> {
        if let Some(existing) = self.stencils.get(&stencil.key) {
            return match existing.difference(&stencil) {
                None => Ok(false),
                Some(detail) => Err(InputError::ConflictingDefinition {
                    key: stencil.key,
                    first_document: existing.document.clone(),
                    second_document: stencil.document,
                    detail,
                }),
            };
        }
        self.stencils.insert(stencil.key, stencil);
        Ok(true)
    }

    /// Look up a stencil.
    pub fn get(&self, key: &StencilKey) -> Option<&Stencil> {
        self.stencils.get(key)
    }

    /// Entries for a key, in document order.
    pub fn entries(&self, key: &StencilKey) -> Option<&[StencilEntry]> {
        self.stencils.get(key).map(|s| s.entries.as_slice())
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &StencilKey) -> bool {
        self.stencils.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.stencils.len()
    }

    /// Whether the table holds no stencils.
    pub fn is_empty(&self) -> bool {
        self.stencils.is_empty()
    }

    /// Stencils in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Stencil> {
        self.stencils.values()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &StencilKey> {
        self.stencils.keys()
    }
}
