use std::path::Path;

use crate::error::{Error, Result};

/// Reads a whole text file, attaching the path to any I/O failure.
pub fn read_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.glsl");

        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, Error::Io { path: ref p, .. } if *p == path));
        assert!(err.to_string().contains("nope.glsl"));
    }

    #[test]
    fn reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.glsl");
        std::fs::write(&path, "void main() {}").unwrap();

        assert_eq!(read_source(&path).unwrap(), "void main() {}");
    }
}
