//! In-memory transfer client.
//!
//! Serves a map of remote paths to byte contents with the same failure
//! surface as the FTPS client: missing or expired paths answer "file
//! unavailable", an unreachable server never answers, and failures can be
//! injected per path. Every request is recorded so callers can assert on
//! exactly which bytes were asked for.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use super::{TransferClient, TransferError};

/// Bytes handed to the sink per write call, to mimic a streamed transfer.
const CHUNK: usize = 4096;

/// CURLE_COULDNT_CONNECT, reported while the server is unreachable.
const COULDNT_CONNECT: curl_sys::CURLcode = curl_sys::CURLE_COULDNT_CONNECT;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Open,
    Size(String),
    Read { path: String, offset: u64 },
    Close,
}

#[derive(Debug, Clone, Copy)]
struct InjectedFailure {
    code: u32,
    /// `None` fails forever.
    remaining: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Interruption {
    after_bytes: u64,
    code: u32,
}

#[derive(Debug, Default)]
pub struct MemoryClient {
    files: HashMap<String, Vec<u8>>,
    expired: HashSet<String>,
    failures: HashMap<String, InjectedFailure>,
    interruptions: HashMap<String, Interruption>,
    login_reply: Option<u32>,
    unreachable: bool,
    open: bool,
    requests: Vec<Request>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `put`.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.put(path, contents);
        self
    }

    /// Create or replace `path`.
    pub fn put(&mut self, path: &str, contents: impl Into<Vec<u8>>) {
        self.expired.remove(path);
        self.files.insert(path.to_string(), contents.into());
    }

    /// Append bytes to `path`, creating it if needed.
    pub fn append(&mut self, path: &str, more: &[u8]) {
        self.files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(more);
    }

    /// Mark `path` as purged by retention: every request answers 550.
    pub fn expire(&mut self, path: &str) {
        self.files.remove(path);
        self.expired.insert(path.to_string());
    }

    /// Every request for `path` fails with reply `code`.
    pub fn fail(&mut self, path: &str, code: u32) {
        self.failures.insert(
            path.to_string(),
            InjectedFailure {
                code,
                remaining: None,
            },
        );
    }

    /// The next `times` requests for `path` fail with reply `code`.
    pub fn fail_times(&mut self, path: &str, code: u32, times: u32) {
        if times == 0 {
            return;
        }
        self.failures.insert(
            path.to_string(),
            InjectedFailure {
                code,
                remaining: Some(times),
            },
        );
    }

    /// The next read of `path` delivers at most `after_bytes` bytes and then
    /// fails with reply `code` (e.g. 426, connection closed; transfer aborted).
    pub fn interrupt_once(&mut self, path: &str, after_bytes: u64, code: u32) {
        self.interruptions
            .insert(path.to_string(), Interruption { after_bytes, code });
    }

    /// Reject `open` with reply `code` (e.g. 530, not logged in).
    pub fn reject_login(&mut self, code: u32) {
        self.login_reply = Some(code);
    }

    pub fn set_unreachable(&mut self, unreachable: bool) {
        self.unreachable = unreachable;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// `(path, offset)` of every read, in order.
    pub fn reads(&self) -> Vec<(String, u64)> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::Read { path, offset } => Some((path.clone(), *offset)),
                _ => None,
            })
            .collect()
    }

    fn check(&mut self, path: &str) -> Result<(), TransferError> {
        if !self.open {
            return Err(TransferError::NotOpen);
        }
        if self.unreachable {
            return Err(TransferError::NoResponse(curl::Error::new(COULDNT_CONNECT)));
        }
        if self.expired.contains(path) {
            return Err(TransferError::Expired {
                path: path.to_string(),
            });
        }
        if let Some(failure) = self.failures.get_mut(path) {
            let code = failure.code;
            let exhausted = match failure.remaining.as_mut() {
                None => false,
                Some(n) => {
                    *n = n.saturating_sub(1);
                    *n == 0
                }
            };
            if exhausted {
                self.failures.remove(path);
            }
            return Err(TransferError::Reply {
                path: path.to_string(),
                code,
            });
        }
        Ok(())
    }
}

impl TransferClient for MemoryClient {
    fn open(&mut self) -> Result<(), TransferError> {
        self.requests.push(Request::Open);
        if self.unreachable {
            return Err(TransferError::NoResponse(curl::Error::new(COULDNT_CONNECT)));
        }
        if let Some(code) = self.login_reply {
            return Err(TransferError::Reply {
                path: "/".to_string(),
                code,
            });
        }
        self.open = true;
        Ok(())
    }

    fn remote_size(&mut self, remote_path: &str) -> Result<u64, TransferError> {
        self.requests.push(Request::Size(remote_path.to_string()));
        self.check(remote_path)?;
        self.files
            .get(remote_path)
            .map(|b| b.len() as u64)
            .ok_or_else(|| TransferError::Expired {
                path: remote_path.to_string(),
            })
    }

    fn read_from(
        &mut self,
        remote_path: &str,
        offset: u64,
        sink: &mut dyn Write,
    ) -> Result<u64, TransferError> {
        self.requests.push(Request::Read {
            path: remote_path.to_string(),
            offset,
        });
        self.check(remote_path)?;
        let interruption = self.interruptions.remove(remote_path);
        let data = self
            .files
            .get(remote_path)
            .ok_or_else(|| TransferError::Expired {
                path: remote_path.to_string(),
            })?;
        if offset > data.len() as u64 {
            // REST beyond end of file.
            return Err(TransferError::Reply {
                path: remote_path.to_string(),
                code: 554,
            });
        }

        let mut body = &data[offset as usize..];
        if let Some(cut) = interruption {
            body = &body[..body.len().min(cut.after_bytes as usize)];
        }
        for chunk in body.chunks(CHUNK) {
            sink.write_all(chunk).map_err(TransferError::Sink)?;
        }
        if let Some(cut) = interruption {
            return Err(TransferError::Reply {
                path: remote_path.to_string(),
                code: cut.code,
            });
        }
        Ok(body.len() as u64)
    }

    fn close(&mut self) {
        if self.open {
            self.requests.push(Request::Close);
        }
        self.open = false;
    }
}
