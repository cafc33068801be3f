//! The remote publish history ("manifest") and its local mirror copy.
//!
//! The manifest is an append-only text file, one remote path per line
//! (`/<CODE>/<YYYYMMDD>/<filename>`). Its local copy is the only record of
//! how far the mirror has progressed: `sync` grows it by byte-offset resume
//! and turns the appended lines into the download set, or rebuilds it and
//! falls back to a date window when the two copies no longer line up.

mod entry;
mod lines;
mod sync;
mod window;

pub use entry::{parse_entries, ManifestEntry};
pub use lines::{appended_lines, split_lines};
pub use sync::{ManifestSync, ManifestUpdate};
pub use window::DateWindow;
