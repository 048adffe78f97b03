//! HTTP status classification shared by the search and completion backends

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::CallError;

/// Map a non-success HTTP response onto the closed error-kind enum.
pub(crate) fn error_for_status(
    service: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> CallError {
    match status.as_u16() {
        429 => {
            let message = format!("{} rate limit exceeded", service);
            match retry_after(headers) {
                Some(delay) => CallError::rate_limited_for(message, delay),
                None => CallError::rate_limited(message),
            }
        }
        408 | 500..=599 => {
            CallError::transient(format!("{} server error ({}): {}", service, status.as_u16(), body))
        }
        401 | 403 => CallError::fatal(format!("{} rejected credentials ({})", service, status.as_u16())),
        code => CallError::fatal(format!("{} HTTP error ({}): {}", service, code, body)),
    }
}

/// Server-advertised wait, from `Retry-After` or `X-RateLimit-Reset` (seconds).
///
/// Brave reports one reset value per window (`"1, 1419"`); the first, shortest
/// window is the one that matters for the next request.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    ["retry-after", "x-ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_seconds)
}

fn parse_seconds(value: &str) -> Option<Duration> {
    let first = value.split(',').next()?.trim();
    first
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
        .or_else(|| first.parse::<f64>().ok().filter(|s| *s >= 0.0).map(Duration::from_secs_f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_rate_limit_with_reset_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1, 1419"));

        let err = error_for_status("Brave", StatusCode::TOO_MANY_REQUESTS, &headers, "");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(1)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retry_after_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("12"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("3"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_server_errors_are_transient() {
        let headers = HeaderMap::new();
        let err = error_for_status("Venice", StatusCode::BAD_GATEWAY, &headers, "upstream");
        assert!(matches!(err, CallError::Transient(_)));
    }

    #[test]
    fn test_client_errors_are_fatal() {
        let headers = HeaderMap::new();
        assert!(matches!(
            error_for_status("Brave", StatusCode::UNAUTHORIZED, &headers, ""),
            CallError::Fatal(_)
        ));
        assert!(matches!(
            error_for_status("Brave", StatusCode::BAD_REQUEST, &headers, "bad q"),
            CallError::Fatal(_)
        ));
    }

    #[test]
    fn test_unparseable_reset_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }
}
