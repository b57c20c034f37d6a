use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Refuse an `--output` that names the source file, however it is spelled.
pub fn ensure_output_not_same(output: &Path, source: &Path) -> Result<()> {
    if resolve(output)? == resolve(source)? {
        bail!(
            "refusing to overwrite source file {} with --output {}",
            source.display(),
            output.display()
        );
    }
    Ok(())
}

/// Absolute, symlink-free form of `path`. A file that does not exist yet is
/// resolved through its parent directory, so `a/../b.xml` still compares
/// equal to `b.xml`.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()));
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("{} does not name a file", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => env::current_dir().context("failed to read current directory")?,
    };
    let parent = parent.canonicalize().unwrap_or(parent);
    Ok(parent.join(file_name))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn rejects_same_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.yaml");
        fs::write(&path, "[]").expect("write");

        let err = ensure_output_not_same(&path, &path).expect_err("same path");
        assert!(err.to_string().contains("refusing to overwrite source file"));
    }

    #[test]
    fn rejects_same_file_through_parent_segment() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("sub")).expect("mkdir");
        let source = dir.path().join("rules.yaml");
        fs::write(&source, "[]").expect("write");

        let output = dir.path().join("sub").join("..").join("rules.yaml");
        ensure_output_not_same(&output, &source).expect_err("same file");
    }

    #[test]
    fn allows_new_sibling() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("rules.yaml");
        fs::write(&source, "[]").expect("write");

        ensure_output_not_same(&dir.path().join("rules.gmail.xml"), &source).expect("distinct");
    }

    #[test]
    fn allows_new_file_in_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("rules.yaml");
        fs::write(&source, "[]").expect("write");

        let output = dir.path().join("out").join("rules.yaml");
        ensure_output_not_same(&output, &source).expect("distinct");
    }
}
