use std::fmt;

use crate::paths;

/// One line of the manifest: `/<CODE>/<YYYYMMDD>/<filename>`.
///
/// Only the separator after the code is required to be well formed; the date
/// prefix is validated separately when a date window is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestEntry {
    raw: String,
}

impl ManifestEntry {
    /// Parse one manifest line, without its line terminator. Returns `None`
    /// for malformed lines (4th character not `/`).
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.as_bytes().get(3) != Some(&b'/') {
            return None;
        }
        Some(Self {
            raw: line.to_string(),
        })
    }

    /// The remote path exactly as listed.
    pub fn path(&self) -> &str {
        &self.raw
    }

    /// Report code between the first two separators (e.g. `EQ`).
    pub fn code(&self) -> &str {
        self.raw.get(1..3).unwrap_or("")
    }

    /// `YYYYMMDD` at positions 4..12, if those are eight ASCII digits.
    pub fn date_prefix(&self) -> Option<&str> {
        let prefix = self.raw.get(4..12)?;
        if prefix.bytes().all(|b| b.is_ascii_digit()) {
            Some(prefix)
        } else {
            None
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        paths::remote_basename(&self.raw)
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse lines into entries, skipping (and logging) malformed ones.
pub fn parse_entries<I, S>(lines: I) -> Vec<ManifestEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut skipped = 0usize;
    let entries: Vec<ManifestEntry> = lines
        .into_iter()
        .filter_map(|line| {
            let entry = ManifestEntry::parse(line.as_ref());
            if entry.is_none() {
                tracing::debug!(line = line.as_ref(), "skipping malformed manifest line");
                skipped += 1;
            }
            entry
        })
        .collect();
    if skipped > 0 {
        tracing::warn!(skipped, "manifest lines skipped as malformed");
    }
    entries
}
