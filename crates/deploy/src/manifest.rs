//! Upload manifest: the listing sent alongside the artifact.

use std::path::Path;

use denpush_pack::{PackError, scan_source_tree};

/// Lists every regular file under `dir`, one `/`-separated relative path
/// per line, sorted, each line newline-terminated.
pub fn build_manifest(dir: &Path) -> Result<String, PackError> {
    let (files, _) = scan_source_tree(dir)?;

    let mut paths: Vec<String> = files.into_iter().map(|f| f.relative_path).collect();
    paths.sort();

    let mut manifest = String::new();
    for path in paths {
        manifest.push_str(&path);
        manifest.push('\n');
    }
    Ok(manifest)
}
