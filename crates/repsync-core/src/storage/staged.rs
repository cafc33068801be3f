//! Staged writes for the local manifest copy.
//!
//! The local manifest is the only bookmark of what has been fetched, so it is
//! never left half-written: full rewrites go through a temp file and rename,
//! appends are undone by truncating back to the previous length.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::temp_path;

/// How far back from the end to look for the last line break before falling
/// back to reading the whole file.
const TAIL_WINDOW: u64 = 64 * 1024;

/// Replace the file at `path` with `contents`: write `<path>.part`, fsync,
/// rename over `path`. On failure the previous file is untouched.
pub fn replace_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    let written = (|| {
        let mut f = File::create(&tmp)?;
        f.write_all(contents)?;
        f.sync_all()
    })();
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path)
}

/// Append `contents` to `path`, whose length must currently be `expected_len`.
/// If any write fails the file is truncated back to `expected_len`.
pub fn append_or_rollback(path: &Path, expected_len: u64, contents: &[u8]) -> io::Result<()> {
    let mut f = File::options().append(true).open(path)?;
    let actual = f.metadata()?.len();
    if actual != expected_len {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!(
                "{} changed during sync: expected {} bytes, found {}",
                path.display(),
                expected_len,
                actual
            ),
        ));
    }
    let appended = f.write_all(contents).and_then(|()| f.sync_all());
    if let Err(e) = appended {
        if let Err(rollback) = f.set_len(expected_len) {
            tracing::error!(
                path = %path.display(),
                "could not roll back partial append: {}",
                rollback
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Bytes after the last `\n` of the first `len` bytes of `path`: the
/// unterminated final line, or empty if the file ends with a newline.
pub fn trailing_partial_line(path: &Path, len: u64) -> io::Result<Vec<u8>> {
    if len == 0 {
        return Ok(Vec::new());
    }
    let mut f = File::open(path)?;
    let window_start = len.saturating_sub(TAIL_WINDOW);
    f.seek(SeekFrom::Start(window_start))?;
    let mut tail = Vec::with_capacity((len - window_start) as usize);
    Read::by_ref(&mut f).take(len - window_start).read_to_end(&mut tail)?;

    if let Some(pos) = tail.iter().rposition(|&b| b == b'\n') {
        return Ok(tail[pos + 1..].to_vec());
    }
    if window_start == 0 {
        return Ok(tail);
    }
    // One very long line: read it all.
    f.seek(SeekFrom::Start(0))?;
    let mut all = Vec::with_capacity(len as usize);
    f.take(len).read_to_end(&mut all)?;
    let start = all.iter().rposition(|&b| b == b'\n').map_or(0, |p| p + 1);
    Ok(all[start..].to_vec())
}
