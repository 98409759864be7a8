//! File utility functions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Expand a path string to an absolute path.
///
/// Handles `~` / `~/path` via the home directory and resolves relative
/// paths against the current working directory. Absolute paths pass through.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Write a file readable only by the current user (0600 on unix)
pub fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        file.write_all(contents)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
    }

    #[cfg(not(unix))]
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unchanged() {
        #[cfg(unix)]
        assert_eq!(expand_path("/var/lib/leads"), PathBuf::from("/var/lib/leads"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/leads.db"), home.join("leads.db"));
        }
    }

    #[test]
    fn test_expand_path_relative_becomes_absolute() {
        let result = expand_path("data/leads.db");
        assert!(result.is_absolute());
        assert!(result.ends_with("data/leads.db"));
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(expand_path("  data "), expand_path("data"));
    }

    #[test]
    fn test_write_private_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("key");
        write_private_file(&path, b"abc").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
