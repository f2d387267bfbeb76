//! Stencil extraction for rk4tex.
//!
//! Reads `stencil_*.tex` documents, each stating one or more
//! finite-difference approximations of a first derivative as LaTeX
//! (`f' \approx \frac{1}{2h}(f_{i+1} - f_{i-1})`), and normalizes them
//! into a [`StencilTable`](rk4tex_core::StencilTable) keyed by direction
//! and truncation order.
//!
//! Extraction is strict: any text inside a formula that the grammar does
//! not recognize is reported with its document, line and column rather
//! than skipped.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod document;
mod header;
mod lexer;
pub mod naming;
mod parser;
pub mod table;

pub use document::parse_document;
pub use naming::{is_stencil_file_name, parse_file_name, NameMetadata};
pub use table::{build_table, build_table_with, discover, flatten, load_dir, SourceDocument};
