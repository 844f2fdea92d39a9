use std::time::Duration;

use reqwest::{Client, StatusCode};
use spotcast_common::config::RetryConfig;
use spotcast_common::retry::{backoff_duration, FailureKind};
use tracing::{debug, warn};

/// Maximum page body size; beyond this the response is truncated with a
/// marker so trimming still works and the downstream hash still detects
/// large changes (spec §4.3 "body cap").
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const TRUNCATION_MARKER: &str = "\n<!-- truncated: response exceeded size cap -->";

const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; spotcast/0.1; +https://example.invalid/bot)";

pub enum FetchOutcome {
    Success { bytes: Vec<u8>, truncated: bool },
    /// Response was well-formed but not acceptable content (e.g. binary) —
    /// non-fatal, just dropped.
    Rejected(String),
    Failed(FailureKind),
}

pub fn build_client(per_url_timeout_ms: u64) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .timeout(Duration::from_millis(per_url_timeout_ms))
        .build()
        .expect("reqwest client builder should never fail with these options")
}

/// Fetch a single URL with retry/backoff for transient failures (spec
/// §4.3, §9 "single reusable backoff specification").
pub async fn fetch_with_retry(client: &Client, url: &str, retry: &RetryConfig) -> FetchOutcome {
    let mut last_kind = FailureKind::Other;

    for attempt in 0..retry.max_attempts {
        match fetch_once(client, url).await {
            Ok(outcome) => return outcome,
            Err(kind) => {
                last_kind = kind;
                if !kind.is_retryable() || attempt + 1 >= retry.max_attempts {
                    break;
                }
                let delay = backoff_duration(retry, attempt);
                debug!(url, attempt, ?kind, delay_ms = delay.as_millis() as u64, "retrying fetch");
                tokio::time::sleep(delay).await;
            }
        }
    }

    FetchOutcome::Failed(last_kind)
}

async fn fetch_once(client: &Client, url: &str) -> Result<FetchOutcome, FailureKind> {
    let response = client.get(url).send().await.map_err(classify_transport)?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(retry_after) = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            tokio::time::sleep(Duration::from_secs(retry_after)).await;
        }
        return Err(FailureKind::Status429);
    }
    if status.is_client_error() {
        return Err(FailureKind::Status4xx);
    }
    if status.is_server_error() {
        return Err(FailureKind::Status5xx);
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_acceptable_content_type(&content_type) {
        return Ok(FetchOutcome::Rejected(format!(
            "unacceptable content-type: {content_type}"
        )));
    }

    let bytes = response.bytes().await.map_err(classify_transport)?;
    if bytes.len() <= MAX_BODY_BYTES {
        Ok(FetchOutcome::Success { bytes: bytes.to_vec(), truncated: false })
    } else {
        let mut truncated = bytes[..MAX_BODY_BYTES].to_vec();
        truncated.extend_from_slice(TRUNCATION_MARKER.as_bytes());
        warn!(url, len = bytes.len(), "response exceeded body cap, truncating");
        Ok(FetchOutcome::Success { bytes: truncated, truncated: true })
    }
}

fn is_acceptable_content_type(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    lower.is_empty() || lower.contains("text/html") || lower.contains("application/xhtml")
        || lower.contains("text/plain")
}

fn classify_transport(e: reqwest::Error) -> FailureKind {
    if e.is_timeout() {
        FailureKind::Timeout
    } else if e.is_connect() {
        FailureKind::Refused
    } else if e.to_string().to_lowercase().contains("dns") {
        FailureKind::Dns
    } else if e.to_string().to_lowercase().contains("ssl") || e.to_string().to_lowercase().contains("certificate") {
        FailureKind::Ssl
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_and_plain_text_accepted() {
        assert!(is_acceptable_content_type("text/html; charset=utf-8"));
        assert!(is_acceptable_content_type(""));
        assert!(!is_acceptable_content_type("image/png"));
        assert!(!is_acceptable_content_type("application/pdf"));
    }
}
