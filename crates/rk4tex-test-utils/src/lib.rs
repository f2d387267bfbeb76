//! Test fixtures for rk4tex development.
//!
//! Provides canned stencil documents ([`fixtures`]), evolved field
//! declarations, and [`write_stencil_dir`] for materializing a document
//! set in a temporary input directory.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::fs;
use std::io;

use rk4tex_core::{
    Coefficient, Direction, EvolvedField, Order, Stencil, StencilEntry, StencilKey, StencilTable,
};
use tempfile::TempDir;

/// Write `(file name, content)` pairs into a fresh temporary directory.
///
/// The directory is removed when the returned handle drops.
pub fn write_stencil_dir<'a>(
    documents: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    for (name, text) in documents {
        fs::write(dir.path().join(name), text)?;
    }
    Ok(dir)
}

/// Field with a derived symbol. Panics on an invalid order.
pub fn field(name: &str, rhs: &str, order: u32) -> EvolvedField {
    EvolvedField::new(name, rhs, order_of(order))
}

pub fn order_of(n: u32) -> Order {
    Order::new(n).unwrap_or_else(|| panic!("{n} is not a positive even order"))
}

/// Hand-built stencil, bypassing extraction.
pub fn stencil(
    direction: Direction,
    order: u32,
    spacing_power: u32,
    weights: &[(i32, Coefficient)],
) -> Stencil {
    let key = StencilKey::new(direction, order_of(order));
    Stencil {
        key,
        entries: weights
            .iter()
            .map(|&(offset, coefficient)| StencilEntry {
                direction,
                order: key.order,
                offset,
                coefficient,
            })
            .collect(),
        spacing_power,
        variable: None,
        variant: None,
        document: format!("stencil_{direction}_{order}.tex"),
    }
}

/// Table from hand-built stencils. Panics on a conflict.
pub fn table(stencils: impl IntoIterator<Item = Stencil>) -> StencilTable {
    let mut table = StencilTable::new();
    for stencil in stencils {
        if let Err(err) = table.insert(stencil) {
            panic!("fixture table conflict: {err}");
        }
    }
    table
}

/// The second-order radial stencil `{-1: -0.5, 0: 0, +1: 0.5}`.
pub fn radial_order_2() -> Stencil {
    stencil(
        Direction::Radial,
        2,
        0,
        &[
            (-1, Coefficient::Decimal(-0.5)),
            (0, Coefficient::ZERO),
            (1, Coefficient::Decimal(0.5)),
        ],
    )
}

/// Fourth-order centered stencils for every direction, `1/h` scaled.
pub fn centered_order_4() -> Vec<Stencil> {
    let q = |n, d| Coefficient::rational(n, d).unwrap_or(Coefficient::ZERO);
    Direction::ALL
        .iter()
        .map(|&direction| {
            stencil(
                direction,
                4,
                1,
                &[
                    (-2, q(1, 12)),
                    (-1, q(-2, 3)),
                    (1, q(2, 3)),
                    (2, q(-1, 12)),
                ],
            )
        })
        .collect()
}

/// Two fields exercising every direction at order 4.
pub fn sample_fields() -> Vec<EvolvedField> {
    vec![
        field("g_rr", "-2 \\alpha K_{rr} + \\partial_r \\beta^r", 4),
        field(
            "K_thth",
            "\\alpha \\partial_\\theta X + \\partial_{\\phi} \\beta^\\phi",
            4,
        ),
    ]
}
