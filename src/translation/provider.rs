//! Provider adapter seam shared by the primary and fallback translation APIs.

use async_trait::async_trait;
use reqwest::Url;
use std::net::IpAddr;
use std::time::Duration;
use tracing::warn;

/// Longest response excerpt carried in an error or log line
const BODY_EXCERPT_CHARS: usize = 200;

/// One external translation API.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name used in logs and status reports
    fn name(&self) -> &'static str;

    /// Translate `text` between two normalized language codes.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError>;

    /// Languages the provider advertises as `(code, name)` pairs.
    ///
    /// Providers without a listing endpoint return `None`.
    async fn languages(&self) -> Option<Vec<(String, String)>> {
        None
    }
}

/// Why a provider attempt failed. Never leaves the gateway.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} rate limit exceeded (429)")]
    RateLimited { provider: &'static str },

    #[error("{provider} timed out after {timeout:?}")]
    Timeout {
        provider: &'static str,
        timeout: Duration,
    },

    #[error("{provider} connection error: {message}")]
    Connection {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} failed unexpectedly: {message}")]
    Unexpected {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Classify a reqwest transport error.
    pub fn from_reqwest(provider: &'static str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout { provider, timeout }
        } else if err.is_connect() || err.is_request() {
            ProviderError::Connection {
                provider,
                message: err.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            ProviderError::MalformedResponse {
                provider,
                reason: err.to_string(),
            }
        } else {
            ProviderError::Unexpected {
                provider,
                message: err.to_string(),
            }
        }
    }

    /// Build the error for a non-2xx HTTP answer. A 429 is classified from
    /// the status line alone; the body is read only for the excerpt.
    pub async fn from_response(provider: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        if status == 429 {
            return ProviderError::RateLimited { provider };
        }
        let body = response.text().await.unwrap_or_default();
        Self::from_status(provider, status, &body)
    }

    /// Build the error for a non-2xx status and its (possibly empty) body.
    pub fn from_status(provider: &'static str, status: u16, body: &str) -> Self {
        if status == 429 {
            ProviderError::RateLimited { provider }
        } else {
            ProviderError::Status {
                provider,
                status,
                body: excerpt(body),
            }
        }
    }

    pub fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }

    /// Only server-side errors get a second attempt; rate limits and timeouts fail over at once.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Status { status, .. } if *status >= 500)
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, ProviderError::Unexpected { .. })
    }
}

/// Rewrite an `http://` endpoint to `https://`.
///
/// Loopback hosts are left alone so a self-hosted instance on the same machine
/// keeps working. Unparseable endpoints are returned unchanged and fail at
/// request time.
pub fn enforce_https(endpoint: &str) -> String {
    let mut url = match Url::parse(endpoint) {
        Ok(url) => url,
        Err(_) => return endpoint.to_string(),
    };

    if url.scheme() != "http" || is_loopback(&url) {
        return endpoint.to_string();
    }

    if url.set_scheme("https").is_err() {
        return endpoint.to_string();
    }

    warn!("Translation endpoint must use HTTPS; rewrote {} to {}", endpoint, url);
    url.to_string()
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

/// Shorten a response body for logs and error messages.
pub fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Serve `status_line` with a body shorter than its `Content-Length`, then hang up.
#[cfg(test)]
pub(super) async fn spawn_truncated_server(status_line: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            // Drain the request so closing the socket does not reset it
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&request) {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: 100\r\nConnection: close\r\n\r\nslow down",
                status_line
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", address)
}

#[cfg(test)]
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}
