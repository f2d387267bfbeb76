//! Stage-1 right-hand sides: templates with stencils substituted.

use smallvec::SmallVec;
use tracing::debug;

use rk4tex_core::{AssemblyError, EvolvedField, StencilEntry, StencilKey, StencilTable};

use crate::template::{Operand, Template, TemplatePart};

/// A derivative placeholder replaced by its stencil's weighted sum.
#[derive(Clone, Debug, PartialEq)]
pub struct Substitution {
    /// The stencil used.
    pub key: StencilKey,
    /// What is differentiated.
    pub operand: Operand,
    /// Every entry of the stencil, zero weights included, in table order.
    pub entries: SmallVec<[StencilEntry; 9]>,
    /// Power of the grid spacing dividing the sum.
    pub spacing_power: u32,
}

/// One piece of a substituted RHS.
#[derive(Clone, Debug, PartialEq)]
pub enum RhsPart {
    /// Verbatim template text.
    Text(String),
    /// A substituted derivative.
    Stencil(Substitution),
}

/// `F(X^n)` for one field: the template with every placeholder
/// replaced by stencil data.
#[derive(Clone, Debug, PartialEq)]
pub struct Rhs {
    /// Pieces in template order.
    pub parts: Vec<RhsPart>,
    /// Whether the template was exactly one placeholder.
    pub single_derivative: bool,
}

impl Rhs {
    /// Substitutions in template order.
    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.parts.iter().filter_map(|part| match part {
            RhsPart::Stencil(sub) => Some(sub),
            RhsPart::Text(_) => None,
        })
    }
}

/// Substitute every derivative placeholder of `field.rhs_template` with
/// the stencil for its direction at `field.order`.
///
/// # Errors
///
/// [`AssemblyError::InvalidTemplate`] if the template cannot be parsed,
/// [`AssemblyError::UnresolvedDerivative`] if a required stencil is
/// absent from `table`.
pub fn instantiate_rhs(field: &EvolvedField, table: &StencilTable) -> Result<Rhs, AssemblyError> {
    let template = Template::parse(&field.name, &field.rhs_template)?;
    let single_derivative = template.is_single_derivative();
    let mut parts = Vec::with_capacity(template.parts.len());
    for part in template.parts {
        match part {
            TemplatePart::Text(text) => parts.push(RhsPart::Text(text)),
            TemplatePart::Derivative { direction, operand } => {
                let key = StencilKey::new(direction, field.order);
                let stencil =
                    table
                        .get(&key)
                        .ok_or_else(|| AssemblyError::UnresolvedDerivative {
                            field: field.name.clone(),
                            direction,
                            order: field.order,
                        })?;
                debug!(field = %field.name, key = %key, source = %stencil.document, "substituted derivative");
                parts.push(RhsPart::Stencil(Substitution {
                    key,
                    operand,
                    entries: stencil.entries.clone(),
                    spacing_power: stencil.spacing_power,
                }));
            }
        }
    }
    Ok(Rhs {
        parts,
        single_derivative,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk4tex_core::{Coefficient, Direction};
    use rk4tex_test_utils::{centered_order_4, field, radial_order_2, table};

    #[test]
    fn substitution_keeps_every_table_entry() {
        let table = table([radial_order_2()]);
        let rhs = instantiate_rhs(&field("g_rr", "\\partial_r X", 2), &table).unwrap();
        assert!(rhs.single_derivative);
        let subs: Vec<&Substitution> = rhs.substitutions().collect();
        assert_eq!(subs.len(), 1);
        let stencil = table.iter().next().unwrap();
        assert_eq!(subs[0].entries, stencil.entries);
        assert_eq!(subs[0].entries[1].coefficient, Coefficient::ZERO);
    }

    #[test]
    fn mixed_template_resolves_each_direction() {
        let table = table(centered_order_4());
        let rhs = instantiate_rhs(
            &field("K_thth", "\\alpha \\partial_\\theta X + \\partial_{\\phi} Y", 4),
            &table,
        )
        .unwrap();
        assert!(!rhs.single_derivative);
        let directions: Vec<Direction> = rhs.substitutions().map(|s| s.key.direction).collect();
        assert_eq!(directions, [Direction::Angular, Direction::Azimuthal]);
        assert!(matches!(&rhs.parts[0], RhsPart::Text(t) if t == "\\alpha "));
    }

    #[test]
    fn missing_order_is_unresolved() {
        let table = table([radial_order_2()]);
        let err = instantiate_rhs(&field("g_rr", "\\partial_r X", 4), &table).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::UnresolvedDerivative {
                field: "g_rr".into(),
                direction: Direction::Radial,
                order: rk4tex_test_utils::order_of(4),
            }
        );
    }

    #[test]
    fn missing_direction_is_unresolved() {
        let table = table([radial_order_2()]);
        let err = instantiate_rhs(&field("g_rr", "\\partial_\\theta X", 2), &table).unwrap_err();
        assert!(err.to_string().contains("no angular stencil of order 2"));
    }

    #[test]
    fn template_without_placeholders_is_opaque() {
        let rhs = instantiate_rhs(&field("alpha", "-2 \\alpha K", 4), &StencilTable::new()).unwrap();
        assert_eq!(rhs.parts, vec![RhsPart::Text("-2 \\alpha K".into())]);
    }
}
