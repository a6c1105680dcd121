//! File helpers shared by the config and rule stores.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ConfigError, ConfigResult};

/// Read a file, returning `None` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> ConfigResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace `path` with `content` through a temporary file in the same
/// directory, so readers see either the old or the new file.
pub(crate) fn write_atomic(path: &Path, content: &str) -> ConfigResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|source| ConfigError::Persist {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_optional_missing() {
        let temp = TempDir::new().unwrap();
        assert!(read_optional(&temp.path().join("nope.toml")).unwrap().is_none());
    }

    #[test]
    fn test_write_atomic_replaces_and_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/rules.toml");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
