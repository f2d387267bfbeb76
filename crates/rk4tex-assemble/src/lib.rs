//! RK4 formula assembly and LaTeX rendering for rk4tex.
//!
//! Takes a [`StencilTable`](rk4tex_core::StencilTable) and the evolved
//! fields of a run and produces, per field, the four RK4 stages and the
//! update formula:
//!
//! - [`instantiate_rhs`] substitutes each `\partial_r`-style placeholder
//!   of a field's RHS template with its stencil's weighted sum (`k_1`).
//! - [`build_stages`] adds `k_2..k_4` as unexpanded functional references.
//! - [`build_update`] forms the fixed `(1, 2, 2, 1) / 6` combination.
//! - [`render`] serializes an [`OutputDocument`] to LaTeX and
//!   [`write_atomic`] places it on disk.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod output;
pub mod render;
pub mod rhs;
pub mod stage;
pub mod template;

pub use output::write_atomic;
pub use render::{render, OutputDocument, DEFAULT_TITLE};
pub use rhs::{instantiate_rhs, Rhs, RhsPart, Substitution};
pub use stage::{
    assemble, build_stages, build_update, FieldFormula, Rk4Stage, Stage, StageExpr,
    StepFraction, UpdateFormula, RK4_DIVISOR, RK4_WEIGHTS,
};
pub use template::{Operand, Template, TemplatePart};
