//! Synthetic stencil corpora for benchmarking.
//!
//! - [`synthetic_corpus`]: seeded stencil documents, one key each
//! - [`synthetic_fields`]: fields whose templates use every direction

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rk4tex_core::{Direction, EvolvedField, Order};
use rk4tex_extract::SourceDocument;

/// Build `documents` stencil documents from `seed`.
///
/// Document `n` covers direction `n % 3` at order `2 * (n / 3 + 1)`, so
/// keys never collide. Weights are random integers and fractions over a
/// `\frac{1}{h}` prefactor.
pub fn synthetic_corpus(documents: usize, seed: u64) -> Vec<SourceDocument> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..documents)
        .map(|n| {
            let direction = Direction::ALL[n % 3];
            let order = 2 * (n as u32 / 3 + 1);
            let name = format!("stencil_{}_{order}.tex", direction.name());
            SourceDocument::new(name, stencil_text(&mut rng, direction, order))
        })
        .collect()
}

fn stencil_text(rng: &mut ChaCha8Rng, direction: Direction, order: u32) -> String {
    let index = direction.index_symbol();
    let half = (order / 2) as i32;
    let mut terms = String::new();
    for offset in -half..=half {
        let magnitude = 1 + rng.next_u32() % 20;
        let negative = rng.next_u32() % 2 == 0;
        let sign = match (terms.is_empty(), negative) {
            (true, false) => "",
            (true, true) => "-",
            (false, false) => " + ",
            (false, true) => " - ",
        };
        let weight = if rng.next_u32() % 3 == 0 {
            format!("\\frac{{{magnitude}}}{{{}}}", 2 + rng.next_u32() % 11)
        } else {
            magnitude.to_string()
        };
        let at = match offset {
            0 => index.to_string(),
            o => format!("{index}{o:+}"),
        };
        terms.push_str(&format!("{sign}{weight} f_{{{at}}}"));
    }
    format!(
        "% Variable: f\n% Direction: {}\n% Order: {order}\n\
         \\begin{{equation}}\n  \\partial f \\approx \\frac{{1}}{{h}}\\left({terms}\\right)\n  \
         \\quad \\mathcal{{O}}(h^{{{order}}})\n\\end{{equation}}\n",
        direction.name()
    )
}

/// `count` fields at `order`, each differentiating in every direction.
pub fn synthetic_fields(count: usize, order: u32) -> Vec<EvolvedField> {
    let Some(order) = Order::new(order) else {
        return Vec::new();
    };
    (0..count)
        .map(|n| {
            EvolvedField::new(
                format!("u_{n}"),
                format!(
                    "-2 \\alpha K_{{{n}}} + \\partial_r U_{{{n}}} \
                     + \\beta^\\theta \\partial_\\theta U_{{{n}}} + \\partial_\\phi {{\\beta U_{{{n}}}}}"
                ),
                order,
            )
        })
        .collect()
}
