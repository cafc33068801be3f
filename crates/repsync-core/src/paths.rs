//! Local file naming for remote archive paths.
//!
//! Downloads land flat in the download directory under the remote basename,
//! sanitized for Linux filesystems.

use std::path::{Path, PathBuf};

/// Fallback when a remote path yields no usable basename.
const DEFAULT_FILENAME: &str = "download.bin";

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Last non-empty segment of a remote path. Both `/` and `\` separate segments.
///
/// Returns `None` for the root, an empty path, or a trailing `.`/`..`.
pub fn remote_basename(remote_path: &str) -> Option<&str> {
    let segment = remote_path
        .split(|c| c == '/' || c == '\\')
        .filter(|s| !s.is_empty())
        .last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

/// Makes a remote basename safe as a local file name.
///
/// - Replaces NUL and control characters with `_`
/// - Trims leading/trailing spaces and dots
/// - Limits length to 255 bytes
///
/// Underscores and other punctuation are kept as-is: report names rely on them.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c == '\0' || c.is_control() { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Local file name for a remote path, if it has a usable basename.
pub fn local_file_name(remote_path: &str) -> Option<String> {
    let name = sanitize_file_name(remote_basename(remote_path)?);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// `dir/<basename of remote_path>`, falling back to `download.bin`.
pub fn default_local_path(dir: &Path, remote_path: &str) -> PathBuf {
    let name = local_file_name(remote_path).unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_of_archive_entry() {
        assert_eq!(
            remote_basename("/EQ/20230526/PC01101_EQMLIST_001_260523_025153489.xml.p7s.zip.p7e"),
            Some("PC01101_EQMLIST_001_260523_025153489.xml.p7s.zip.p7e")
        );
        assert_eq!(remote_basename("/UpdateHistory.txt"), Some("UpdateHistory.txt"));
        assert_eq!(remote_basename("\\EQ\\20230526\\a.zip"), Some("a.zip"));
        assert_eq!(remote_basename("single"), Some("single"));
    }

    #[test]
    fn basename_root_or_empty() {
        assert_eq!(remote_basename("/"), None);
        assert_eq!(remote_basename(""), None);
        assert_eq!(remote_basename("/EQ/.."), None);
    }

    #[test]
    fn sanitize_keeps_underscores() {
        assert_eq!(sanitize_file_name("PC01101__EQ_001.zip"), "PC01101__EQ_001.zip");
    }

    #[test]
    fn sanitize_control_chars_and_trim() {
        assert_eq!(sanitize_file_name("a\x00b\tc.txt"), "a_b_c.txt");
        assert_eq!(sanitize_file_name("  ..file.txt.. "), "file.txt");
    }

    #[test]
    fn sanitize_limits_length() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_file_name(&long).len(), 255);
    }

    #[test]
    fn default_local_path_fallback() {
        let dir = Path::new("/srv/reports");
        assert_eq!(
            default_local_path(dir, "/EQ/20240301/a.zip"),
            PathBuf::from("/srv/reports/a.zip")
        );
        assert_eq!(
            default_local_path(dir, "/EQ/20240301/"),
            PathBuf::from("/srv/reports/20240301")
        );
        assert_eq!(default_local_path(dir, "/"), PathBuf::from("/srv/reports/download.bin"));
    }
}
