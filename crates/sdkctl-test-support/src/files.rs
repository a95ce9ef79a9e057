//! Temporary file helpers for option files and CA bundles.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Write `contents` to a fresh temporary file that is removed on drop.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn temp_file_with(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to create temporary file")?;
    file.write_all(contents.as_bytes())
        .context("failed to write temporary file")?;
    file.flush().context("failed to flush temporary file")?;
    Ok(file)
}

/// Path that is guaranteed not to exist for the lifetime of the returned guard.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn missing_path() -> Result<(tempfile::TempDir, std::path::PathBuf)> {
    let dir = tempfile::tempdir().context("failed to create temporary directory")?;
    let path = dir.path().join("does-not-exist");
    Ok((dir, path))
}

/// Read a file back as UTF-8.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_round_trips_contents() -> Result<()> {
        let file = temp_file_with("{\"a\": 1}")?;
        assert_eq!(read_to_string(file.path())?, "{\"a\": 1}");
        Ok(())
    }

    #[test]
    fn missing_path_does_not_exist() -> Result<()> {
        let (_guard, path) = missing_path()?;
        assert!(!path.exists());
        Ok(())
    }
}
