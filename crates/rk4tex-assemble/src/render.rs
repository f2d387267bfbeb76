//! LaTeX serialization of assembled formulas.
//!
//! Pure formatting: the output is a function of the [`OutputDocument`]
//! alone, so identical inputs give byte-identical text.

use std::fmt::{self, Write};

use rk4tex_core::{Coefficient, EvolvedField};

use crate::rhs::{Rhs, RhsPart, Substitution};
use crate::stage::{FieldFormula, StageExpr, StepFraction, UpdateFormula};

/// Title used when none is configured.
pub const DEFAULT_TITLE: &str = "Warp Solver RK4 Time Integration Equations";

/// The generated document: a title and one block per field.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputDocument {
    /// Text of `\title{}`.
    pub title: String,
    /// Emit `\pagebreak` after each field block.
    pub page_break: bool,
    /// Field blocks in input order.
    pub formulas: Vec<FieldFormula>,
}

impl OutputDocument {
    /// A document with the default title and page breaks on.
    pub fn new(formulas: Vec<FieldFormula>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            page_break: true,
            formulas,
        }
    }

    /// Override the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Toggle `\pagebreak` between field blocks.
    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }
}

impl fmt::Display for OutputDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\\documentclass{{article}}")?;
        writeln!(f, "\\usepackage{{amsmath}}")?;
        writeln!(f, "\\usepackage[margin=0.5in]{{geometry}}")?;
        writeln!(f)?;
        writeln!(f, "\\begin{{document}}")?;
        writeln!(f, "\\title{{{}}}", self.title)?;
        writeln!(f, "\\date{{}}")?;
        writeln!(f, "\\maketitle")?;
        for formula in &self.formulas {
            writeln!(f)?;
            write_field(f, formula)?;
            if self.page_break {
                writeln!(f, "\\pagebreak")?;
            }
        }
        writeln!(f)?;
        writeln!(f, "\\end{{document}}")
    }
}

/// Render the whole document.
pub fn render(document: &OutputDocument) -> String {
    document.to_string()
}

fn write_field(out: &mut impl Write, formula: &FieldFormula) -> fmt::Result {
    let field = &formula.field;
    let symbol = &field.symbol;
    writeln!(
        out,
        "\\section*{{${symbol}$ (\\texttt{{{}}}, order {})}}",
        escape_text(&field.name),
        field.order
    )?;
    for stage in &formula.stages {
        let n = stage.stage.number();
        writeln!(out)?;
        writeln!(out, "\\textbf{{RK4 Stage {n}:}}")?;
        writeln!(out, "\\[")?;
        write!(out, "{} = ", stage_label(field, n))?;
        match &stage.expr {
            StageExpr::Substituted(rhs) => write_rhs(out, rhs)?,
            StageExpr::FunctionalReference { previous, step } => {
                let step = match step {
                    StepFraction::Half => "\\frac{\\Delta t}{2}",
                    StepFraction::Full => "\\Delta t \\,",
                };
                write!(
                    out,
                    "F_{{{symbol}}}\\left({symbol}^n + {step} {}\\right)",
                    stage_label(field, previous.number())
                )?;
            }
        }
        writeln!(out)?;
        writeln!(out, "\\]")?;
    }
    writeln!(out)?;
    writeln!(out, "\\textbf{{Update:}}")?;
    writeln!(out, "\\[")?;
    write_update(out, symbol, &formula.update)?;
    writeln!(out)?;
    writeln!(out, "\\]")
}

fn stage_label(field: &EvolvedField, n: u8) -> String {
    format!("k_{n}^{{({})}}", field.symbol)
}

fn write_update(out: &mut impl Write, symbol: &str, update: &UpdateFormula) -> fmt::Result {
    write!(
        out,
        "{symbol}^{{n+1}} = {symbol}^n + \\frac{{\\Delta t}}{{{}}} \\left(",
        update.divisor
    )?;
    for (i, (weight, stage)) in update.terms.iter().enumerate() {
        if i > 0 {
            write!(out, " + ")?;
        }
        if *weight != 1 {
            write!(out, "{weight} ")?;
        }
        write!(out, "k_{}", stage.number())?;
    }
    write!(out, "\\right)")
}

fn write_rhs(out: &mut impl Write, rhs: &Rhs) -> fmt::Result {
    for part in &rhs.parts {
        match part {
            RhsPart::Text(text) => out.write_str(text)?,
            RhsPart::Stencil(sub) => write_substitution(out, sub, rhs.single_derivative)?,
        }
    }
    Ok(())
}

/// `Σ c·operand_{idx±k}` with zero weights dropped.
fn write_substitution(out: &mut impl Write, sub: &Substitution, single: bool) -> fmt::Result {
    let direction = sub.key.direction;
    let mut sum = String::new();
    for entry in sub.entries.iter().filter(|e| !e.coefficient.is_zero()) {
        let negative = entry.coefficient.is_negative();
        if sum.is_empty() {
            if negative {
                sum.push('-');
            }
        } else {
            sum.push_str(if negative { " - " } else { " + " });
        }
        let magnitude = entry.coefficient.abs();
        if !magnitude.is_one() {
            write_magnitude(&mut sum, magnitude)?;
            sum.push(' ');
        }
        let index = match entry.offset {
            0 => direction.index_symbol().to_string(),
            o => format!("{}{o:+}", direction.index_symbol()),
        };
        sum.push_str(&sub.operand.at_index(&index));
    }
    if sum.is_empty() {
        sum.push('0');
    }

    if sub.spacing_power > 0 {
        let coord = direction.coordinate();
        match sub.spacing_power {
            1 => write!(out, "\\frac{{1}}{{\\Delta {coord}}}")?,
            p => write!(out, "\\frac{{1}}{{\\Delta {coord}^{{{p}}}}}")?,
        }
        write!(out, "\\left({sum}\\right)")
    } else if single {
        out.write_str(&sum)
    } else {
        write!(out, "\\left({sum}\\right)")
    }
}

fn write_magnitude(out: &mut impl Write, c: Coefficient) -> fmt::Result {
    match c {
        Coefficient::Rational { num, den: 1 } => write!(out, "{num}"),
        Coefficient::Rational { num, den } => write!(out, "\\frac{{{num}}}{{{den}}}"),
        Coefficient::Decimal(v) => write!(out, "{v}"),
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '&' | '%' | '#' | '$' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
