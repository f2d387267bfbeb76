//! rk4tex: RK4 time-update formulas in LaTeX from finite-difference
//! stencil documents.
//!
//! This is the top-level facade crate. It re-exports the sub-crates and
//! adds the run configuration and the end-to-end pipeline.
//!
//! # Quick start
//!
//! ```rust
//! use rk4tex::prelude::*;
//!
//! let docs = [SourceDocument::new(
//!     "stencil_r_2.tex",
//!     "\\[ \\partial_r f \\approx -0.5 f_{i-1} + 0 f_{i} + 0.5 f_{i+1} \\]",
//! )];
//! let mut field = FieldConfig::new("g_rr", "\\partial_r X");
//! field.order = 2;
//! let config = RunConfig { fields: vec![field], ..RunConfig::default() };
//!
//! let (latex, table) = rk4tex::generate(&docs, &config).unwrap();
//! assert_eq!(table.len(), 1);
//! assert!(latex.contains("k_1^{(g_{rr})} = -0.5 X_{i-1} + 0.5 X_{i+1}"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rk4tex-core` | Directions, orders, coefficients, the stencil table, errors |
//! | [`extract`] | `rk4tex-extract` | Document discovery and stencil extraction |
//! | [`assemble`] | `rk4tex-assemble` | RHS substitution, RK4 stages, rendering, atomic write |
//! | [`config`] | (this crate) | JSON run configuration |
//! | [`pipeline`] | (this crate) | The end-to-end run |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod pipeline;

/// Shared data types and the error taxonomy (`rk4tex-core`).
///
/// The normalized [`types::StencilTable`] is the only thing passed from
/// extraction to assembly.
pub use rk4tex_core as types;

/// Stencil extraction (`rk4tex-extract`).
///
/// [`extract::load_dir`] reads a directory, [`extract::build_table`]
/// folds the documents into one table.
pub use rk4tex_extract as extract;

/// Formula assembly and rendering (`rk4tex-assemble`).
///
/// [`assemble::assemble()`] builds per-field formulas and
/// [`assemble::render()`] serializes them.
pub use rk4tex_assemble as assemble;

pub use config::{ConfigError, FieldConfig, RunConfig};
pub use pipeline::{
    generate, render_table, run, run_with, PipelineError, RunOptions, RunSummary, DEFAULT_OUTPUT,
};

/// Common imports for typical rk4tex usage.
pub mod prelude {
    // Core types
    pub use rk4tex_core::{
        Coefficient, Direction, EvolvedField, Order, Stencil, StencilKey, StencilTable,
    };

    // Errors
    pub use rk4tex_core::{AssemblyError, InputError, OutputError};

    // Extraction
    pub use rk4tex_extract::{build_table, load_dir, SourceDocument};

    // Assembly
    pub use rk4tex_assemble::{assemble, render, FieldFormula, OutputDocument};

    // Runs
    pub use crate::config::{FieldConfig, RunConfig};
    pub use crate::pipeline::{generate, run, run_with, PipelineError, RunOptions, RunSummary};
}
