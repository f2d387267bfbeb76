//! Canned stencil documents.
//!
//! [`standard_documents`] covers every direction at orders 2 and 4 with
//! the textbook centered weights, written in the styles seen in practice:
//! a `\frac` prefactor over a group, per-term fractions, and a group
//! divisor.

/// Worked example: second-order radial stencil with decimal weights and an
/// explicit zero at the center.
pub const RADIAL_ORDER_2_DECIMAL: &str = "\
% Variable: f
% Direction: radial
% Order: 2
\\begin{equation}
  \\partial_r f \\approx -0.5 f_{i-1} + 0 f_{i} + 0.5 f_{i+1}
  \\quad \\mathcal{O}(h^2)
\\end{equation}
";

/// Same key as [`RADIAL_ORDER_2_DECIMAL`], different (one-sided) weights.
pub const RADIAL_ORDER_2_FORWARD: &str = "\
% Direction: radial
% Order: 2
\\[ \\partial_r f \\approx -1.5 f_{i} + 2 f_{i+1} - 0.5 f_{i+2} \\]
";

pub const RADIAL_ORDER_4: &str = "\
% Variable: f
% Direction: radial
% Order: 4
\\begin{equation}
  \\frac{\\partial f}{\\partial r} \\approx
  \\frac{1}{12h}\\left(f_{i-2} - 8f_{i-1} + 8f_{i+1} - f_{i+2}\\right)
  + \\mathcal{O}(h^4)
\\end{equation}
";

/// Second-order radial stencil written as a single quotient.
pub const RADIAL_ORDER_2_QUOTIENT: &str = "\
% Direction: radial
\\[ f'(r) \\approx \\frac{f_{i+1} - f_{i-1}}{2h} \\quad \\mathcal{O}(h^2) \\]
";

/// [`RADIAL_ORDER_4`] in function-argument notation over one fraction.
pub const RADIAL_ORDER_4_ARGUMENT: &str = "\
% Variable: f
\\begin{equation}
  f'(r) \\approx \\frac{-f(r+2h,t) + 8f(r+h,t) - 8f(r-h,t) + f(r-2h,t)}{12h}
  + \\mathcal{O}(h^4)
\\end{equation}
";

pub const ANGULAR_ORDER_2: &str = "\
% Variable: f
% Direction: theta
\\[ \\partial_\\theta f \\approx \\frac{1}{2h} f_{j+1} - \\frac{1}{2h} f_{j-1} \\quad \\mathcal{O}(h^2) \\]
";

pub const ANGULAR_ORDER_4: &str = "\
% Variable: f
\\[ \\partial_\\theta f \\approx \\frac{1}{12 \\Delta\\theta}\\left(f_{j-2} - 8 f_{j-1} + 8 f_{j+1} - f_{j+2}\\right) \\]
";

pub const AZIMUTHAL_ORDER_2: &str = "\
% Direction: phi
% Order: second
\\[ \\partial_\\phi f \\approx (f(\\phi + h) - f(\\phi - h)) / (2h) \\]
";

pub const AZIMUTHAL_ORDER_4: &str = "\
% Direction: phi
\\[ \\partial_\\phi f \\approx \\frac{1}{12}f[k-2] - \\frac{2}{3}f[k-1] + \\frac{2}{3}f[k+1] - \\frac{1}{12}f[k+2]
   \\qquad \\text{error } \\mathcal{O}(h^{4}) \\]
";

/// `(file name, content)` for every direction at orders 2 and 4.
pub fn standard_documents() -> Vec<(&'static str, &'static str)> {
    vec![
        ("stencil_radial_2.tex", RADIAL_ORDER_2_DECIMAL),
        ("stencil_radial_4.tex", RADIAL_ORDER_4),
        ("stencil_theta_2.tex", ANGULAR_ORDER_2),
        ("stencil_theta_4.tex", ANGULAR_ORDER_4),
        ("stencil_phi_2.tex", AZIMUTHAL_ORDER_2),
        ("stencil_phi_4.tex", AZIMUTHAL_ORDER_4),
    ]
}
