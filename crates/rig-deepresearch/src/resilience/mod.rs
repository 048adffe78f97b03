//! Resilience for external calls
//!
//! - `retry` - deadline + retry-with-backoff wrapper (`Resilience`)
//! - `rate_limit` - minimum-interval pacing per resource (`RateLimiter`)
//!
//! The limiter paces the success path; backoff paces the failure path. The
//! wrapper composes both by acquiring the limiter before every attempt.

pub mod rate_limit;
pub mod retry;

pub use rate_limit::RateLimiter;
pub use retry::{Resilience, RetryPolicy};
