//! The end-to-end run: discover, extract, assemble, render, write.
//!
//! Each stage consumes the previous stage's complete output. Any error
//! aborts the run before the output file is touched.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use rk4tex_assemble::{assemble, render, write_atomic, OutputDocument};
use rk4tex_core::{AssemblyError, InputError, OutputError, Stencil, StencilTable};
use rk4tex_extract::{build_table, build_table_with, load_dir, SourceDocument};

use crate::config::{ConfigError, RunConfig};

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "solver_update.tex";

/// Any failure of a run, by stage.
#[derive(Debug)]
pub enum PipelineError {
    /// The run configuration is unusable.
    Config(ConfigError),
    /// Stencil discovery or extraction failed.
    Input(InputError),
    /// The RK4 formulas could not be built.
    Assembly(AssemblyError),
    /// The document could not be written.
    Output(OutputError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Input(e) => write!(f, "stencil extraction failed: {e}"),
            Self::Assembly(e) => write!(f, "formula assembly failed: {e}"),
            Self::Output(e) => write!(f, "{e}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Input(e) => Some(e),
            Self::Assembly(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InputError> for PipelineError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

impl From<AssemblyError> for PipelineError {
    fn from(e: AssemblyError) -> Self {
        Self::Assembly(e)
    }
}

impl From<OutputError> for PipelineError {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

/// Where to read, where to write, and what to generate.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Directory searched for `stencil_*.tex` documents.
    pub input_dir: PathBuf,
    /// Output `.tex` path.
    pub output: PathBuf,
    /// Title, page breaks, and fields.
    pub config: RunConfig,
}

impl RunOptions {
    /// Read from `input_dir` into [`DEFAULT_OUTPUT`] with the default
    /// configuration.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            config: RunConfig::default(),
        }
    }
}

/// What a successful run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// The file written.
    pub output: PathBuf,
    /// Number of stencil documents read.
    pub documents: usize,
    /// Number of field blocks rendered.
    pub fields: usize,
    /// The stencil table the formulas were built from.
    pub table: StencilTable,
}

/// Build the document text from in-memory stencil documents.
///
/// Returns the rendered LaTeX together with the table it was built from.
pub fn generate(
    documents: &[SourceDocument],
    config: &RunConfig,
) -> Result<(String, StencilTable), PipelineError> {
    config.validate()?;
    let table = build_table(documents)?;
    let text = render_table(&table, config)?;
    Ok((text, table))
}

/// Assemble and render every configured field against `table`.
pub fn render_table(table: &StencilTable, config: &RunConfig) -> Result<String, PipelineError> {
    let fields = config.evolved_fields()?;
    let formulas = assemble(table, &fields)?;
    let document = OutputDocument::new(formulas)
        .with_title(config.title.as_str())
        .with_page_break(config.page_break);
    Ok(render(&document))
}

/// Run the whole pipeline and write the output file.
///
/// # Errors
///
/// The first failure of any stage. The output file is written only
/// after every field has been assembled, and atomically.
pub fn run(options: &RunOptions) -> Result<RunSummary, PipelineError> {
    run_with(options, |_| {})
}

/// [`run`], handing each stencil to `inspect` as it is extracted.
///
/// `inspect` sees every stencil parsed before a failure, including the
/// one whose definition conflicts.
pub fn run_with(
    options: &RunOptions,
    inspect: impl FnMut(&Stencil),
) -> Result<RunSummary, PipelineError> {
    options.config.validate()?;
    info!(dir = %options.input_dir.display(), "loading stencil documents");
    let documents = load_dir(&options.input_dir)?;
    let table = build_table_with(&documents, inspect)?;
    let text = render_table(&table, &options.config)?;
    debug!(bytes = text.len(), "rendered document");
    write_atomic(&options.output, &text)?;
    info!(output = %options.output.display(), "wrote RK4 update formulas");
    Ok(RunSummary {
        output: options.output.clone(),
        documents: documents.len(),
        fields: options.config.fields.len(),
        table,
    })
}
