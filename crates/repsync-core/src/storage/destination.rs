//! Destination file for a single download.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::temp_path;

/// An open download destination. The handle is closed when this is dropped,
/// whichever way the download ends.
///
/// A full download is written to the `.part` sibling and only renamed over
/// the final path by [`Destination::finish`], so an existing copy survives a
/// failed or expired transfer. A resume appends to the final path directly.
pub struct Destination {
    file: File,
    path: PathBuf,
    /// Set when bytes go to a temp file that replaces `path` on finish.
    staged: Option<PathBuf>,
    /// Byte offset the download starts at (existing length when resuming).
    start: u64,
    /// True if this call created the file it writes to.
    fresh: bool,
}

/// Open `path` for a download.
///
/// With `resume` and an existing file, opens for append and reports the
/// current length as the start offset. With `resume` and no file, creates it
/// and starts at 0. Without `resume`, writes to a fresh temp file next to
/// `path` and leaves `path` alone until [`Destination::finish`].
pub fn open_destination(path: &Path, resume: bool) -> io::Result<Destination> {
    if resume {
        let (file, fresh) = match File::options().append(true).open(path) {
            Ok(file) => (file, false),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                (File::options().append(true).create(true).open(path)?, true)
            }
            Err(e) => return Err(e),
        };
        let start = file.metadata()?.len();
        return Ok(Destination {
            file,
            path: path.to_path_buf(),
            staged: None,
            start,
            fresh,
        });
    }
    let temp = temp_path(path);
    let file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp)?;
    Ok(Destination {
        file,
        path: path.to_path_buf(),
        staged: Some(temp),
        start: 0,
        fresh: true,
    })
}

impl Destination {
    /// Final path of the download.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    /// Current length of the file being written.
    pub fn len(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush to disk and, for a staged download, rename the temp file over
    /// the final path.
    pub fn finish(self) -> io::Result<()> {
        self.file.sync_all()?;
        drop(self.file);
        if let Some(temp) = self.staged {
            fs::rename(&temp, &self.path)?;
        }
        Ok(())
    }

    /// Close the handle after a failed download. A staged temp file is
    /// removed; a resumed file is kept unless this call created it and
    /// nothing was written.
    pub fn abandon(self) -> io::Result<()> {
        let remove_fresh = self.staged.is_none() && self.fresh && self.is_empty()?;
        drop(self.file);
        match self.staged {
            Some(temp) => fs::remove_file(&temp),
            None if remove_fresh => fs::remove_file(&self.path),
            None => Ok(()),
        }
    }
}

impl Write for Destination {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
