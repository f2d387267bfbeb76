//! Run configuration: document options and the evolved-field list.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rk4tex_assemble::DEFAULT_TITLE;
use rk4tex_core::{EvolvedField, Order};

/// Errors from loading or validating a [`RunConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The file is not valid configuration JSON.
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Decoder failure, with line and column.
        source: serde_json::Error,
    },
    /// A field declaration is unusable.
    Invalid {
        /// Description of the validation failure.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::Invalid { reason } => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid { .. } => None,
        }
    }
}

// ── FieldConfig ────────────────────────────────────────────────────

/// One evolved field as written in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Identifier, unique within the run.
    pub name: String,
    /// LaTeX symbol; derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// RHS template with `\partial_r`-style placeholders.
    pub rhs: String,
    /// Stencil order used for every placeholder. Default: 4.
    #[serde(default = "default_order")]
    pub order: u32,
}

fn default_order() -> u32 {
    4
}

impl FieldConfig {
    /// Declare a field at the default order.
    pub fn new(name: impl Into<String>, rhs: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: None,
            rhs: rhs.into(),
            order: default_order(),
        }
    }

    /// Check the declaration and build the [`EvolvedField`].
    pub fn to_field(&self) -> Result<EvolvedField, ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "field with empty name".to_string(),
            });
        }
        let order = Order::new(self.order).ok_or_else(|| ConfigError::Invalid {
            reason: format!(
                "field '{name}': order {} is not a positive even integer",
                self.order
            ),
        })?;
        let field = EvolvedField::new(name, self.rhs.as_str(), order);
        Ok(match &self.symbol {
            Some(symbol) => field.with_symbol(symbol.as_str()),
            None => field,
        })
    }
}

// ── RunConfig ──────────────────────────────────────────────────────

/// Document options and the fields to evolve.
///
/// Every key is optional in JSON; missing keys take the [`Default`]
/// values, which include the built-in ADM field list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Text of the document title.
    pub title: String,
    /// Emit `\pagebreak` after each field block.
    pub page_break: bool,
    /// Fields in output order.
    pub fields: Vec<FieldConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            page_break: true,
            fields: adm_fields(),
        }
    }
}

impl RunConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field declaration without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fields.iter().try_for_each(|f| f.to_field().map(drop))
    }

    /// The validated field list, in order.
    pub fn evolved_fields(&self) -> Result<Vec<EvolvedField>, ConfigError> {
        self.fields.iter().map(FieldConfig::to_field).collect()
    }
}

/// ADM metric and extrinsic-curvature components on a spherical grid
/// with radial shift.
fn adm_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::new(
            "gamma_rr",
            "-2 \\alpha K_{rr} + \\beta^r \\partial_r \\gamma_{rr} + 2 \\gamma_{rr} \\partial_r \\beta^r",
        ),
        FieldConfig::new(
            "gamma_thth",
            "-2 \\alpha K_{\\theta\\theta} + \\beta^r \\partial_r \\gamma_{\\theta\\theta} \
             + \\beta^\\theta \\partial_\\theta \\gamma_{\\theta\\theta}",
        ),
        FieldConfig::new(
            "gamma_phph",
            "-2 \\alpha K_{\\phi\\phi} + \\beta^r \\partial_r \\gamma_{\\phi\\phi} \
             + \\beta^\\phi \\partial_\\phi \\gamma_{\\phi\\phi}",
        ),
        FieldConfig::new(
            "K_rr",
            "-\\partial_r A_r + \\alpha \\left(R_{rr} + K K_{rr} - 2 K_{rr} K^r_r\\right) \
             + \\beta^r \\partial_r K_{rr} + 2 K_{rr} \\partial_r \\beta^r",
        ),
        FieldConfig::new(
            "K_thth",
            "-\\partial_\\theta A_\\theta + \\alpha \\left(R_{\\theta\\theta} + K K_{\\theta\\theta}\\right) \
             + \\beta^r \\partial_r K_{\\theta\\theta}",
        ),
        FieldConfig::new(
            "K_phph",
            "-\\partial_\\phi A_\\phi + \\alpha \\left(R_{\\phi\\phi} + K K_{\\phi\\phi}\\right) \
             + \\beta^r \\partial_r K_{\\phi\\phi}",
        ),
    ]
}
