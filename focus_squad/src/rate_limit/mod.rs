mod config;
mod errors;
mod limiter;

pub use errors::RateLimitError;
pub use limiter::{RateLimitDecision, RateLimiter, client_key};
