//! File processing logic for symdex

use bumpalo::Bump;
use mago_database::file::FileId;
use serde::{Deserialize, Serialize};
use std::path::Path;

use symdex_core::{MemoryIndex, SourceModule};
use symdex_indexer::Indexer;

/// Everything indexed from a single file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileIndex {
    pub index: MemoryIndex,
    /// 1-based (line, column) of each reference, parallel to `index.references`
    pub positions: Vec<(usize, usize)>,
}

/// Module path relative to the project root, as stored in the index
pub fn module_path(path: &Path, project_root: &Path) -> String {
    path.strip_prefix(project_root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Index the source of a single PHP file
///
/// Returns `None` when the source does not parse.
pub fn index_source(
    source_code: &str,
    path: &Path,
    project_root: &Path,
    indexer: &Indexer<'_>,
) -> Option<FileIndex> {
    let arena = Bump::new();
    let file_id = FileId::new(path.to_string_lossy().as_ref());

    let (program, parse_error) = mago_syntax::parser::parse_file_content(&arena, file_id, source_code);
    if parse_error.is_some() {
        return None;
    }

    let module = SourceModule::new(
        module_path(path, project_root),
        project_root.to_string_lossy().to_string(),
    );

    let mut index = MemoryIndex::new();
    indexer.index_program(program, source_code, &module, &mut index);

    let positions = index
        .references
        .iter()
        .map(|record| offset_to_line_column(source_code, record.offset as usize))
        .collect();

    Some(FileIndex { index, positions })
}

/// Convert byte offset to 1-based line and column
pub fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}
