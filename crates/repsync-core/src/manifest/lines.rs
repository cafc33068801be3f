//! Splitting manifest bytes into lines.
//!
//! Lines end with `\n`; a trailing `\r` is dropped. Blank lines are ignored.
//! Bytes are decoded lossily: paths are ASCII, and a stray legacy-codepage
//! byte must not abort a sync.

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn decode(line: &[u8]) -> Option<String> {
    let line = strip_cr(line);
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(String::from_utf8_lossy(line).into_owned())
}

/// All non-blank lines of `bytes`, including a final unterminated one.
pub fn split_lines(bytes: &[u8]) -> Vec<String> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n').filter_map(decode).collect()
}

/// Lines made new by appending `appended` to a file whose last line was
/// `partial_tail` (the bytes after its final `\n`, empty if it ended with one).
///
/// A non-empty tail was already reported as a line when it was first seen.
/// If the appended bytes continue it, the completed line is reported again;
/// if they only terminate it, it is not.
pub fn appended_lines(partial_tail: &[u8], appended: &[u8]) -> Vec<String> {
    if partial_tail.is_empty() {
        return split_lines(appended);
    }
    let (head, rest) = match appended.iter().position(|&b| b == b'\n') {
        Some(i) => (&appended[..i], &appended[i + 1..]),
        None => (appended, &appended[appended.len()..]),
    };

    let mut out = Vec::new();
    if !strip_cr(head).is_empty() {
        let mut completed = partial_tail.to_vec();
        completed.extend_from_slice(head);
        out.extend(decode(&completed));
    }
    out.extend(split_lines(rest));
    out
}
