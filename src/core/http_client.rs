use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use tokio::time::sleep;
use tracing::warn;

pub const RETRY_ATTEMPTS: usize = 3;
pub const RETRY_DELAY_MS: u64 = 500;
const BODY_SNIPPET_CHARS: usize = 512;

pub fn build_http_client(disable_proxy: bool, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout);

    if disable_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}

/// Why an outbound call gave up. Callers map this onto their own error kind.
#[derive(Debug, Clone)]
pub enum RequestFailure {
    Status { status: StatusCode, body: String },
    Network(String),
}

impl RequestFailure {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(_) => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body.as_str()),
            Self::Network(_) => None,
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } if *status == StatusCode::TOO_MANY_REQUESTS => {
                write!(f, "rate limited ({status}): {body}")
            }
            Self::Status { status, body } => write!(f, "upstream returned {status}: {body}"),
            Self::Network(message) => write!(f, "network error: {message}"),
        }
    }
}

pub fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Sends the request built by `build_request`, retrying network failures,
/// 429s and 5xx responses with a linearly growing delay. Returns the body of
/// the first successful response.
pub async fn send_with_retry<F>(label: &str, build_request: F) -> Result<String, RequestFailure>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_failure: Option<RequestFailure> = None;

    for attempt in 0..RETRY_ATTEMPTS {
        match build_request().send().await {
            Ok(resp) if resp.status().is_success() => {
                return resp.text().await.map_err(|err| {
                    RequestFailure::Network(format!("failed to read response body: {err}"))
                });
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "<failed to read body>".to_string());
                let body = text.chars().take(BODY_SNIPPET_CHARS).collect::<String>();
                let failure = RequestFailure::Status { status, body };

                if !is_retryable(status) {
                    return Err(failure);
                }

                warn!(target: "http", label, attempt, %status, "retryable upstream status");
                last_failure = Some(failure);
            }
            Err(err) => {
                warn!(target: "http", label, attempt, error = %err, "request failed");
                last_failure = Some(RequestFailure::Network(err.to_string()));
            }
        }

        if attempt < RETRY_ATTEMPTS - 1 {
            sleep(Duration::from_millis(RETRY_DELAY_MS * (attempt as u64 + 1))).await;
        }
    }

    Err(last_failure.unwrap_or_else(|| RequestFailure::Network("request was not attempted".to_string())))
}
