//! Core types for the rk4tex stencil-to-RK4 generator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the data shared between the stencil extractor and the formula
//! assembler: grid directions, truncation orders, coefficients, the
//! normalized [`StencilTable`], evolved field declarations, and the
//! error taxonomy for every stage of a run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coefficient;
pub mod direction;
pub mod error;
pub mod field;
pub mod stencil;

pub use coefficient::Coefficient;
pub use direction::Direction;
pub use error::{AssemblyError, InputError, Locator, MalformedReason, OutputError};
pub use field::{default_symbol, EvolvedField};
pub use stencil::{Order, Stencil, StencilEntry, StencilKey, StencilTable, Support};
