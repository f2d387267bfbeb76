//! Evolved field declarations.

use crate::stencil::Order;

/// A named quantity advanced in time by the RK4 scheme.
///
/// Declared once per run from configuration and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvolvedField {
    /// Identifier (e.g. `gamma_rr`). Unique within a run.
    pub name: String,
    /// LaTeX symbol used in the rendered formulas (e.g. `\gamma_{rr}`).
    pub symbol: String,
    /// Right-hand side with `\partial_r`-style derivative placeholders.
    pub rhs_template: String,
    /// Truncation order of the stencils used for every placeholder.
    pub order: Order,
}

impl EvolvedField {
    /// Declare a field; the symbol is derived from the name.
    pub fn new(name: impl Into<String>, rhs_template: impl Into<String>, order: Order) -> Self {
        let name = name.into();
        Self {
            symbol: default_symbol(&name),
            name,
            rhs_template: rhs_template.into(),
            order,
        }
    }

    /// Override the LaTeX symbol.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }
}

const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau", "upsilon", "phi", "chi", "psi",
    "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Pi", "Sigma", "Phi", "Psi", "Omega",
];

/// Derive a LaTeX symbol from a field identifier.
///
/// The part before the first `_` is the base (Greek letter names gain a
/// backslash); the rest becomes a subscript in which `th` and `ph` expand
/// to `\theta` and `\phi`: `gamma_rth` → `\gamma_{r\theta}`.
pub fn default_symbol(name: &str) -> String {
    let (base, sub) = match name.split_once('_') {
        Some((base, sub)) => (base, Some(sub)),
        None => (name, None),
    };
    let mut symbol = if GREEK.contains(&base) {
        format!("\\{base}")
    } else {
        base.to_string()
    };
    if let Some(sub) = sub.filter(|s| !s.is_empty()) {
        symbol.push_str("_{");
        let mut rest = sub;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("th") {
                symbol.push_str("\\theta ");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix("ph") {
                symbol.push_str("\\phi ");
                rest = tail;
            } else {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    symbol.push(c);
                }
                rest = chars.as_str();
            }
        }
        let trimmed = symbol.trim_end().len();
        symbol.truncate(trimmed);
        symbol.push('}');
    }
    symbol
}
