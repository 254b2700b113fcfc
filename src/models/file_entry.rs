use std::path::Path;

use serde::{Deserialize, Serialize};

/// One document per regular file found under an indexed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    pub file_name: String,
    pub file_path: String,
    pub relative_path: String,
}

impl IndexedFile {
    /// Builds the document for `path`, which must live under `root`.
    /// Returns `None` for paths without a usable base name and for paths
    /// that are not valid UTF-8, which could not be stored verbatim.
    pub fn from_path(root: &Path, path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.is_empty() {
            return None;
        }
        let relative = path.strip_prefix(root).ok()?;

        Some(Self {
            file_name: file_name.to_string(),
            file_path: path.to_str()?.to_string(),
            relative_path: relative.to_str()?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_nested() {
        let doc = IndexedFile::from_path(
            Path::new("/srv/docs"),
            Path::new("/srv/docs/2024/report.pdf"),
        )
        .unwrap();
        assert_eq!(doc.file_name, "report.pdf");
        assert_eq!(doc.file_path, "/srv/docs/2024/report.pdf");
        assert_eq!(doc.relative_path, "2024/report.pdf");
    }

    #[test]
    fn test_from_path_outside_root() {
        assert!(IndexedFile::from_path(Path::new("/srv/docs"), Path::new("/etc/passwd")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_path_rejects_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new("/srv/docs").join(OsStr::from_bytes(b"bad\xffname.txt"));
        assert!(IndexedFile::from_path(Path::new("/srv/docs"), &path).is_none());
    }

    #[test]
    fn test_serializes_with_store_field_names() {
        let doc = IndexedFile {
            file_name: "a.txt".to_string(),
            file_path: "/r/a.txt".to_string(),
            relative_path: "a.txt".to_string(),
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["file_name"], "a.txt");
        assert_eq!(value["file_path"], "/r/a.txt");
        assert_eq!(value["relative_path"], "a.txt");
    }
}
