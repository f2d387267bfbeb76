//! Document discovery and [`StencilTable`] construction.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use rk4tex_core::{InputError, Stencil, StencilEntry, StencilTable};

use crate::document::parse_document;
use crate::naming::is_stencil_file_name;

/// A stencil document held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    /// Identifier used in errors and for filename metadata.
    pub name: String,
    /// Full LaTeX content.
    pub text: String,
}

impl SourceDocument {
    /// Wrap in-memory content.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk; its name is the file name.
    pub fn read(path: &Path) -> Result<Self, InputError> {
        let text = fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, text })
    }
}

/// List the `stencil_*.tex` files in `dir`, sorted by file name.
///
/// # Errors
///
/// [`InputError::Io`] if the directory cannot be listed and
/// [`InputError::NoDocuments`] if nothing matches.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let io_error = |source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let is_file = entry.file_type().map_err(io_error)?.is_file();
        let name = entry.file_name();
        if is_file && name.to_str().is_some_and(is_stencil_file_name) {
            paths.push(entry.path());
        }
    }
    if paths.is_empty() {
        return Err(InputError::NoDocuments {
            dir: dir.to_path_buf(),
        });
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(dir = %dir.display(), count = paths.len(), "discovered stencil documents");
    Ok(paths)
}

/// Discover and read every stencil document in `dir`, in sorted order.
pub fn load_dir(dir: &Path) -> Result<Vec<SourceDocument>, InputError> {
    discover(dir)?
        .iter()
        .map(|path| SourceDocument::read(path))
        .collect()
}

/// Parse every document and fold the stencils into one table.
///
/// Documents are processed in the given order; the first definition of
/// a key is kept and an identical redefinition is accepted silently.
///
/// # Errors
///
/// The first [`InputError`] from any document, or
/// [`InputError::ConflictingDefinition`] when two definitions of a key
/// differ.
pub fn build_table(documents: &[SourceDocument]) -> Result<StencilTable, InputError> {
    build_table_with(documents, |_| {})
}

/// [`build_table`], handing each stencil to `inspect` as soon as it is
/// parsed and before it is merged, so a run that later fails still
/// shows what was read.
pub fn build_table_with(
    documents: &[SourceDocument],
    mut inspect: impl FnMut(&Stencil),
) -> Result<StencilTable, InputError> {
    if documents.is_empty() {
        warn!("no stencil documents supplied; stencil table is empty");
    }
    let mut table = StencilTable::new();
    for document in documents {
        for stencil in parse_document(&document.name, &document.text)? {
            inspect(&stencil);
            let key = stencil.key;
            if !table.insert(stencil)? {
                debug!(document = %document.name, key = %key, "identical redefinition ignored");
            }
        }
    }
    info!(
        documents = documents.len(),
        stencils = table.len(),
        "stencil table built"
    );
    Ok(table)
}

/// Flatten parsed stencils into one entry list, in order.
pub fn flatten(stencils: &[Stencil]) -> Vec<StencilEntry> {
    stencils
        .iter()
        .flat_map(|s| s.entries.iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk4tex_core::{Direction, Order, StencilKey};

    fn central(order: u32) -> &'static str {
        match order {
            2 => "\\[ f' \\approx \\frac{1}{2h}\\left(f_{i+1} - f_{i-1}\\right) \\]",
            _ => "\\[ f' \\approx \\frac{1}{12h}\\left(f_{i-2} - 8f_{i-1} + 8f_{i+1} - f_{i+2}\\right) \\]",
        }
    }

    #[test]
    fn table_keeps_document_order() {
        let docs = [
            SourceDocument::new("stencil_theta_4.tex", central(4)),
            SourceDocument::new("stencil_r_2.tex", central(2)),
        ];
        let table = build_table(&docs).unwrap();
        let keys: Vec<StencilKey> = table.keys().copied().collect();
        assert_eq!(
            keys,
            [
                StencilKey::new(Direction::Angular, Order::new(4).unwrap()),
                StencilKey::new(Direction::Radial, Order::new(2).unwrap()),
            ]
        );
    }

    #[test]
    fn identical_documents_merge() {
        let docs = [
            SourceDocument::new("stencil_r_2.tex", central(2)),
            SourceDocument::new("stencil_r_2_copy.tex", central(2)),
        ];
        assert_eq!(build_table(&docs).unwrap().len(), 1);
    }

    #[test]
    fn conflicting_documents_fail() {
        let docs = [
            SourceDocument::new("stencil_r_2.tex", central(2)),
            SourceDocument::new(
                "stencil_r_2_forward.tex",
                "\\[ f' \\approx \\frac{1}{h}(f_{i+1} - f_{i}) \\]",
            ),
        ];
        match build_table(&docs).unwrap_err() {
            InputError::ConflictingDefinition {
                first_document,
                second_document,
                ..
            } => {
                assert_eq!(first_document, "stencil_r_2.tex");
                assert_eq!(second_document, "stencil_r_2_forward.tex");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inspection_sees_stencils_before_a_conflict() {
        let docs = [
            SourceDocument::new("stencil_r_2.tex", central(2)),
            SourceDocument::new(
                "stencil_r_2_forward.tex",
                "\\[ f' \\approx \\frac{1}{h}(f_{i+1} - f_{i}) \\]",
            ),
        ];
        let mut seen = Vec::new();
        let result = build_table_with(&docs, |s| seen.push(s.document.clone()));
        assert!(matches!(result, Err(InputError::ConflictingDefinition { .. })));
        assert_eq!(seen, ["stencil_r_2.tex", "stencil_r_2_forward.tex"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(build_table(&[]).unwrap().is_empty());
    }

    #[test]
    fn flatten_preserves_order() {
        let stencils = parse_document("stencil_r_2.tex", central(2)).unwrap();
        let offsets: Vec<i32> = flatten(&stencils).iter().map(|e| e.offset).collect();
        assert_eq!(offsets, [1, -1]);
    }

    #[test]
    fn discovery_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["stencil_r_4.tex", "stencil_r_2.tex", "notes.tex", "stencil_x.txt"] {
            fs::write(dir.path().join(name), central(2)).unwrap();
        }
        fs::create_dir(dir.path().join("stencil_dir.tex")).unwrap();
        let names: Vec<String> = discover(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["stencil_r_2.tex", "stencil_r_4.tex"]);
    }

    #[test]
    fn empty_directory_has_no_documents() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover(dir.path()),
            Err(InputError::NoDocuments { .. })
        ));
    }

    #[test]
    fn unreadable_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            load_dir(&missing),
            Err(InputError::Io { .. })
        ));
    }
}
