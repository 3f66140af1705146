use std::path::{Path, PathBuf};

use target_mapping::{Cell, TargetTable};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Resolves a path of the configuration against the directory of the configuration file.
pub fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = root.join(file_path);
    p.as_path().display().to_string()
}

/// Splits rows of cells into a header and the data rows.
///
/// The header is the first row, with its cells as text. An empty input has an empty header.
pub fn assemble_table(mut rows: Vec<Vec<Cell>>) -> TargetTable {
    if rows.is_empty() {
        return TargetTable::default();
    }
    let header: Vec<String> = rows.remove(0).iter().map(|c| c.to_text()).collect();
    TargetTable { header, rows }
}
