//! Finite-difference weights.
//!
//! Stencil documents write weights either as exact rationals (`8`,
//! `\frac{2}{3}`, `1/12`) or as decimals (`-0.5`). [`Coefficient`] keeps
//! that distinction so a rational weight renders back as a fraction and
//! a decimal renders as written.

use std::fmt;
use std::ops::Neg;

/// A single finite-difference weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coefficient {
    /// An exact rational `num / den`, reduced, with `den > 0`.
    Rational {
        /// Signed numerator.
        num: i64,
        /// Positive denominator.
        den: i64,
    },
    /// A finite decimal value.
    Decimal(f64),
}

impl Coefficient {
    /// The weight `0`.
    pub const ZERO: Self = Self::Rational { num: 0, den: 1 };
    /// The weight `1`.
    pub const ONE: Self = Self::Rational { num: 1, den: 1 };

    /// An integer weight.
    pub fn integer(n: i64) -> Self {
        Self::Rational { num: n, den: 1 }
    }

    /// A reduced rational weight. Returns `None` for a zero denominator
    /// or when normalization overflows `i64`.
    pub fn rational(num: i64, den: i64) -> Option<Self> {
        reduce(num as i128, den as i128)
    }

    /// A decimal weight. Returns `None` for NaN or infinities.
    pub fn decimal(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self::Decimal(value))
    }

    /// Parse a numeric literal: an integer (`-8`), a decimal (`0.25`,
    /// `1e-3`) or a slash rational (`1/12`, `-2/3`).
    ///
    /// Anything else, including empty text, a bare sign, or a second
    /// decimal point, is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some((num, den)) = text.split_once('/') {
            let num: i64 = parse_integer(num)?;
            let den: i64 = parse_integer(den)?;
            return Self::rational(num, den);
        }
        if let Some(n) = parse_integer(text) {
            return Some(Self::integer(n));
        }
        let body = text.trim_start_matches(['+', '-']);
        let well_formed = body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            && body.chars().any(|c| c.is_ascii_digit())
            && body
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
        if !well_formed {
            return None;
        }
        text.parse::<f64>().ok().and_then(Self::decimal)
    }

    /// Numeric value as `f64`.
    pub fn value(&self) -> f64 {
        match *self {
            Self::Rational { num, den } => num as f64 / den as f64,
            Self::Decimal(v) => v,
        }
    }

    /// Whether the weight is exactly zero.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Rational { num, .. } => num == 0,
            Self::Decimal(v) => v == 0.0,
        }
    }

    /// Whether the weight is strictly negative.
    pub fn is_negative(&self) -> bool {
        match *self {
            Self::Rational { num, .. } => num < 0,
            Self::Decimal(v) => v < 0.0,
        }
    }

    /// Absolute value.
    pub fn abs(self) -> Self {
        if self.is_negative() {
            -self
        } else {
            self
        }
    }

    /// Whether the weight is exactly one.
    pub fn is_one(&self) -> bool {
        match *self {
            Self::Rational { num, den } => num == 1 && den == 1,
            Self::Decimal(v) => v == 1.0,
        }
    }

    /// Product of two weights. Rational times rational stays exact;
    /// anything involving a decimal becomes a decimal.
    ///
    /// Returns `None` when an exact product overflows `i64`.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Rational { num: a, den: b }, Self::Rational { num: c, den: d }) => {
                reduce(a as i128 * c as i128, b as i128 * d as i128)
            }
            _ => Self::decimal(self.value() * other.value()),
        }
    }

    /// Quotient of two weights, with the same exactness rules as
    /// [`checked_mul`](Self::checked_mul).
    ///
    /// Returns `None` for a zero divisor or on overflow.
    pub fn checked_div(self, divisor: Self) -> Option<Self> {
        if divisor.is_zero() {
            return None;
        }
        match divisor {
            Self::Rational { num, den } => self.checked_mul(Self::rational(den, num)?),
            Self::Decimal(v) => Self::decimal(self.value() / v),
        }
    }

    /// Numeric equality across representations: `1/2` equals `0.5`.
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Rational { .. }, Self::Rational { .. }) => self == other,
            _ => self.value() == other.value(),
        }
    }
}

impl Neg for Coefficient {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            // `reduce` guarantees num > i64::MIN.
            Self::Rational { num, den } => Self::Rational { num: -num, den },
            Self::Decimal(v) => Self::Decimal(-v),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Rational { num, den: 1 } => write!(f, "{num}"),
            Self::Rational { num, den } => write!(f, "{num}/{den}"),
            Self::Decimal(v) if v == 0.0 => write!(f, "0"),
            Self::Decimal(v) => write!(f, "{v}"),
        }
    }
}

fn parse_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs()
}

fn reduce(num: i128, den: i128) -> Option<Coefficient> {
    if den == 0 {
        return None;
    }
    let g = gcd(num, den).max(1);
    let sign = if den < 0 { -1 } else { 1 };
    let num = i64::try_from(sign * num / g).ok()?;
    let den = i64::try_from(sign * den / g).ok()?;
    if num == i64::MIN {
        return None;
    }
    Some(Coefficient::Rational { num, den })
}
