//! File enumeration and the per-file processing loop.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rewrite;

/// Process every `.html` file under `<root>/docs`, recursively.
///
/// Each file is read whole, rewritten in memory, and written back in place;
/// nothing is created or deleted. Files are visited in sorted order and a
/// `save <path>` line is printed per file unless `quiet` is set. The first
/// structural mismatch or I/O failure aborts the run.
pub fn process_docs(root: &Path, quiet: bool) -> Result<()> {
    let pattern = root.join("docs").join("**").join("*.html");

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        files.push(entry?);
    }
    files.sort();

    for path in &files {
        let html = fs::read_to_string(path)?;
        let rewritten = rewrite::rewrite_html(&html)?;
        fs::write(path, rewritten)?;
        if !quiet {
            println!("save {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_docs_dir_is_a_noop() {
        let dir = tempfile::TempDir::new().unwrap();
        process_docs(dir.path(), true).unwrap();
    }

    #[test]
    fn test_files_rewritten_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let docs = dir.path().join("docs").join("widgets");
        fs::create_dir_all(&docs).unwrap();

        let page = docs.join("button.html");
        fs::write(
            &page,
            r#"<html><body><div class="section-availability">clay-web, clay-native</div></body></html>"#,
        )
        .unwrap();

        process_docs(dir.path(), true).unwrap();

        let out = fs::read_to_string(&page).unwrap();
        assert!(out.contains(r#"<div class="section-availability">clay</div>"#));
    }

    #[test]
    fn test_non_html_files_untouched() {
        let dir = tempfile::TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();

        let css = docs.join("style.css");
        fs::write(&css, ".field { color: red }").unwrap();

        process_docs(dir.path(), true).unwrap();

        assert_eq!(fs::read_to_string(&css).unwrap(), ".field { color: red }");
    }
}
