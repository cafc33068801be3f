//! FTPS client over libcurl.
//!
//! One `Easy` handle is created by `open` and reused for every request, so
//! libcurl keeps the authenticated control connection alive between the
//! manifest probe and the file downloads. TLS is required on the control and
//! data channels.

use anyhow::{Context, Result};
use curl::easy::Easy;
use std::io::Write;
use std::os::raw::c_long;
use std::time::Duration;
use url::Url;

use super::classify::{classify_failure, classify_reply};
use super::{TransferClient, TransferError};
use crate::config::{ProxyConfig, ServerConfig};

/// `CURLUSESSL_ALL`: TLS on the control and data connections, or fail.
const CURLUSESSL_ALL: c_long = 3;

/// Set `CURLOPT_USE_SSL` to `CURLUSESSL_ALL`. In explicit mode libcurl then
/// sends AUTH before USER and gives up if the server will not upgrade, so
/// credentials never cross a plaintext connection. The `curl` crate has no
/// setter for this option.
fn require_tls(easy: &mut Easy) -> Result<(), TransferError> {
    // SAFETY: `easy.raw()` is the live handle owned by `easy`, and
    // CURLOPT_USE_SSL takes a `long` argument.
    let rc = unsafe {
        curl_sys::curl_easy_setopt(easy.raw(), curl_sys::CURLOPT_USE_SSL, CURLUSESSL_ALL)
    };
    if rc != curl_sys::CURLE_OK {
        return Err(TransferError::Curl(curl::Error::new(rc)));
    }
    Ok(())
}

pub struct FtpsClient {
    server: ServerConfig,
    proxy: Option<ProxyConfig>,
    base: Url,
    easy: Option<Easy>,
}

/// Full URL of `remote_path` under `base`. Backslashes are treated as path
/// separators and the path is percent-encoded by `Url`.
pub fn remote_url(base: &Url, remote_path: &str) -> Url {
    let normalized = remote_path.replace('\\', "/");
    let mut url = base.clone();
    if normalized.starts_with('/') {
        url.set_path(&normalized);
    } else {
        url.set_path(&format!("/{}", normalized));
    }
    url
}

impl FtpsClient {
    pub fn new(server: &ServerConfig, proxy: Option<&ProxyConfig>) -> Result<Self> {
        // Implicit TLS uses the ftps scheme; explicit TLS upgrades a plain ftp
        // control connection with AUTH TLS.
        let scheme = if server.implicit_tls { "ftps" } else { "ftp" };
        let base = Url::parse(&format!("{}://{}:{}/", scheme, server.host, server.port))
            .with_context(|| format!("invalid server address: {}:{}", server.host, server.port))?;
        Ok(Self {
            server: server.clone(),
            proxy: proxy.cloned(),
            base,
            easy: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn configure(&self, easy: &mut Easy) -> Result<(), TransferError> {
        easy.username(&self.server.username)?;
        easy.password(&self.server.password)?;
        require_tls(easy)?;
        if self.server.allow_untrusted_transport_certificate {
            tracing::warn!(
                host = %self.server.host,
                "server certificate verification is disabled (allow_untrusted_transport_certificate)"
            );
            easy.ssl_verify_peer(false)?;
            easy.ssl_verify_host(false)?;
        }
        easy.connect_timeout(Duration::from_secs(self.server.connect_timeout_secs))?;
        // Abort if throughput stays below 1 KiB/s for 60s; hard cap per request.
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(Duration::from_secs(self.server.transfer_timeout_secs))?;

        if let Some(proxy) = &self.proxy {
            easy.proxy(&proxy.url)?;
            easy.http_proxy_tunnel(true)?;
            if let Some(user) = &proxy.username {
                easy.proxy_username(user)?;
            }
            if let Some(pass) = &proxy.password {
                easy.proxy_password(pass)?;
            }
        }
        Ok(())
    }
}

impl TransferClient for FtpsClient {
    fn open(&mut self) -> Result<(), TransferError> {
        self.close();
        let mut easy = Easy::new();
        self.configure(&mut easy)?;

        // Log in and stop: a body-less request on the root directory.
        easy.url(self.base.as_str())?;
        easy.nobody(true)?;
        tracing::debug!(url = %self.base, "connecting");
        if let Err(e) = easy.perform() {
            let code = easy.response_code().unwrap_or(0);
            return Err(classify_failure("/", e, code));
        }
        let code = easy.response_code()?;
        if let Some(err) = classify_reply("/", code) {
            return Err(err);
        }
        tracing::debug!(code, "session open");
        self.easy = Some(easy);
        Ok(())
    }

    fn remote_size(&mut self, remote_path: &str) -> Result<u64, TransferError> {
        let url = remote_url(&self.base, remote_path);
        let easy = self.easy.as_mut().ok_or(TransferError::NotOpen)?;
        easy.url(url.as_str())?;
        easy.nobody(true)?;
        easy.resume_from(0)?;

        tracing::debug!(path = remote_path, "SIZE");
        if let Err(e) = easy.perform() {
            let code = easy.response_code().unwrap_or(0);
            return Err(classify_failure(remote_path, e, code));
        }
        let code = easy.response_code()?;
        if let Some(err) = classify_reply(remote_path, code) {
            return Err(err);
        }
        let len = easy.content_length_download()?;
        if len < 0.0 {
            // Server accepted the request but did not report a size.
            return Err(TransferError::Reply {
                path: remote_path.to_string(),
                code,
            });
        }
        tracing::debug!(path = remote_path, size = len as u64, "size reply");
        Ok(len as u64)
    }

    fn read_from(
        &mut self,
        remote_path: &str,
        offset: u64,
        sink: &mut dyn Write,
    ) -> Result<u64, TransferError> {
        let url = remote_url(&self.base, remote_path);
        let easy = self.easy.as_mut().ok_or(TransferError::NotOpen)?;
        easy.url(url.as_str())?;
        easy.nobody(false)?;
        easy.resume_from(offset)?;

        if offset > 0 {
            tracing::debug!(path = remote_path, offset, "RETR (resume)");
        } else {
            tracing::debug!(path = remote_path, "RETR");
        }

        let mut delivered = 0u64;
        let mut sink_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    delivered += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    sink_error = Some(e);
                    // Returning a short count makes libcurl abort with a write error.
                    Ok(0)
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_write_error() {
                if let Some(io_err) = sink_error.take() {
                    return Err(TransferError::Sink(io_err));
                }
            }
            let code = easy.response_code().unwrap_or(0);
            return Err(classify_failure(remote_path, e, code));
        }
        let code = easy.response_code()?;
        if let Some(err) = classify_reply(remote_path, code) {
            return Err(err);
        }
        Ok(delivered)
    }

    fn close(&mut self) {
        // Dropping the handle sends QUIT and closes the connection.
        if self.easy.take().is_some() {
            tracing::debug!(host = %self.server.host, "session closed");
        }
    }
}
