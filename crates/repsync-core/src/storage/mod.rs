//! Disk I/O and file lifecycle.
//!
//! Destination files for downloads (staged through `.part`, or appended to
//! for resume) and staged writes for the local manifest: a rebuilt manifest goes to a `.part` file
//! that is fsynced and renamed over the old copy, an append is rolled back to
//! the previous length if it fails halfway.

mod destination;
mod staged;

pub use destination::{open_destination, Destination};
pub use staged::{append_or_rollback, replace_atomically, trailing_partial_line};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `history.txt` → `history.txt.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}
