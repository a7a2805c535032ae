//! Shared HTTP response helpers for record providers.

use crate::error::ProviderError;

/// Checks an HTTP response for a success status.
///
/// Non-success statuses (including 429) become [`ProviderError::Transient`]
/// carrying the status and response body, so the retry policy applies.
pub async fn check_response(
    provider: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        format!("rate limited: {}", body.trim())
    } else {
        format!("HTTP {}: {}", status.as_u16(), body.trim())
    };
    Err(ProviderError::Transient {
        provider: provider.to_string(),
        message,
        status: Some(status.as_u16()),
    })
}

/// Maps a transport error to [`ProviderError::Transient`].
pub fn transport_error(provider: &str, err: &reqwest::Error) -> ProviderError {
    ProviderError::Transient {
        provider: provider.to_string(),
        message: err.to_string(),
        status: err.status().map(|s| s.as_u16()),
    }
}

/// Builds the HTTP client for `provider` with a request timeout.
///
/// # Errors
///
/// [`ProviderError::InvalidRequest`] if the TLS backend cannot be
/// initialized.
pub fn client(
    provider: &str,
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::InvalidRequest {
            message: format!("cannot build HTTP client for {provider}: {e}"),
        })
}
