//! The four RK4 stages and the update combination.
//!
//! Stage 1 carries the substituted RHS. Stages 2–4 stay functional,
//! `F(X^n + c·Δt·k_{s-1})`, and are never expanded.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info};

use rk4tex_core::{AssemblyError, EvolvedField, StencilTable};

use crate::rhs::{instantiate_rhs, Rhs};

/// RK4 stage index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// `k_1`
    K1,
    /// `k_2`
    K2,
    /// `k_3`
    K3,
    /// `k_4`
    K4,
}

impl Stage {
    /// Stages in evaluation order.
    pub const ALL: [Stage; 4] = [Self::K1, Self::K2, Self::K3, Self::K4];

    /// 1-based stage number.
    pub fn number(self) -> u8 {
        match self {
            Self::K1 => 1,
            Self::K2 => 2,
            Self::K3 => 3,
            Self::K4 => 4,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.number())
    }
}

/// Fraction of `Δt` by which a functional stage advances the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepFraction {
    /// `Δt / 2`
    Half,
    /// `Δt`
    Full,
}

/// The expression of one stage.
#[derive(Clone, Debug, PartialEq)]
pub enum StageExpr {
    /// Stencil coefficients inlined into the RHS at `X^n`.
    Substituted(Rhs),
    /// `F(X^n + step · k_previous)`, left unexpanded.
    FunctionalReference {
        /// The immediately preceding stage.
        previous: Stage,
        /// Multiple of `Δt` applied to it.
        step: StepFraction,
    },
}

/// One stage of one field.
#[derive(Clone, Debug, PartialEq)]
pub struct Rk4Stage {
    /// Which stage.
    pub stage: Stage,
    /// Its expression.
    pub expr: StageExpr,
}

/// Classical RK4 weights of `k_1..k_4`.
pub const RK4_WEIGHTS: [u32; 4] = [1, 2, 2, 1];
/// Common divisor of [`RK4_WEIGHTS`] applied to `Δt`.
pub const RK4_DIVISOR: u32 = 6;

/// `X^{n+1} = X^n + Δt/6 · (k_1 + 2k_2 + 2k_3 + k_4)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateFormula {
    /// `(weight, stage)` in stage order.
    pub terms: [(u32, Stage); 4],
    /// Divisor of `Δt`.
    pub divisor: u32,
}

/// Every formula for one field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFormula {
    /// The field.
    pub field: EvolvedField,
    /// `k_1..k_4` in order.
    pub stages: [Rk4Stage; 4],
    /// The combination of the stages.
    pub update: UpdateFormula,
}

/// Stage 1 from `rhs`; stages 2–4 as functional references to their
/// predecessor.
pub fn build_stages(field: &EvolvedField, rhs: Rhs) -> [Rk4Stage; 4] {
    debug!(field = %field.name, "building RK4 stages");
    let functional = |stage, previous, step| Rk4Stage {
        stage,
        expr: StageExpr::FunctionalReference { previous, step },
    };
    [
        Rk4Stage {
            stage: Stage::K1,
            expr: StageExpr::Substituted(rhs),
        },
        functional(Stage::K2, Stage::K1, StepFraction::Half),
        functional(Stage::K3, Stage::K2, StepFraction::Half),
        functional(Stage::K4, Stage::K3, StepFraction::Full),
    ]
}

/// The fixed `(1, 2, 2, 1) / 6` combination of `stages`.
pub fn build_update(field: &EvolvedField, stages: &[Rk4Stage; 4]) -> UpdateFormula {
    debug!(field = %field.name, "building RK4 update");
    let mut terms = [(0, Stage::K1); 4];
    for ((term, stage), weight) in terms.iter_mut().zip(stages).zip(RK4_WEIGHTS) {
        *term = (weight, stage.stage);
    }
    UpdateFormula {
        terms,
        divisor: RK4_DIVISOR,
    }
}

/// Build the formulas of every field, in input order.
///
/// Fails on the first field that cannot be assembled; nothing is
/// returned for the others.
///
/// # Errors
///
/// [`AssemblyError::EmptyFieldList`], [`AssemblyError::DuplicateField`],
/// or the first error from [`instantiate_rhs`].
pub fn assemble(
    table: &StencilTable,
    fields: &[EvolvedField],
) -> Result<Vec<FieldFormula>, AssemblyError> {
    if fields.is_empty() {
        return Err(AssemblyError::EmptyFieldList);
    }
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(AssemblyError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }
    let formulas = fields
        .iter()
        .map(|field| {
            let rhs = instantiate_rhs(field, table)?;
            let stages = build_stages(field, rhs);
            let update = build_update(field, &stages);
            Ok(FieldFormula {
                field: field.clone(),
                stages,
                update,
            })
        })
        .collect::<Result<Vec<_>, AssemblyError>>()?;
    info!(fields = formulas.len(), "assembled RK4 formulas");
    Ok(formulas)
}
