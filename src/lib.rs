//! # ratefetch
//!
//! A rate-limited HTTP client: throttles outgoing requests to a configured
//! requests-per-second ceiling, retries failures up to an attempt limit, and
//! lets callers intercept specific response status codes.
//!
//! ## Features
//!
//! - **Rate limiting**: a fixed-origin 1-second window caps how many
//!   dispatches may *start* per second; completions may straggle past the
//!   window boundary
//! - **Retries**: failed or intercepted requests re-enter the queue until
//!   their attempt budget is spent
//! - **Status interception**: per-status-code handlers decide
//!   resolve/reject/retry, plus a dedicated 429 cooldown hook
//! - **Timeouts**: per-request deadlines that cancel the in-flight call
//! - **Unlimited bypass**: per-request or global escape hatch that skips
//!   queueing and throttling entirely (and with them, retries)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ratefetch::{HttpClient, HttpClientConfig, LimiterConfig, RequestConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = HttpClient::with_config(
//!         HttpClientConfig::builder()
//!             .base_url("https://api.example.com")
//!             .limiter(LimiterConfig::builder().rps(5).build())
//!             .build(),
//!     );
//!
//!     let response = client.get("/users", RequestConfig::new().attempts(3)).await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ──▶ HttpClient ──▶ Limiter ──▶ queue ──▶ dispatch loop
//!                             │                      │
//!                             │ (unlimited bypass)   ├─▶ timeout guard ─▶ Transport
//!                             └──────────────────────┘        │
//!                                          status policy ◀────┘
//!                                  (resolve / reject / retry)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Error types
pub mod error;

/// Common types and request configuration
pub mod types;

/// URL joining and query-parameter helpers
pub mod url;

/// Transport seam and timeout guard
pub mod transport;

/// Rate limiter and dispatch scheduler
pub mod limiter;

/// HTTP client facade with verb helpers
pub mod client;

/// Response parsing helpers
pub mod parse;

pub use client::{HttpClient, HttpClientConfig};
pub use error::{Error, Result};
pub use limiter::{fetch, Limiter, LimiterConfig};
pub use transport::{HttpTransport, Transport};
pub use types::{Body, QueryParams, RequestConfig, StatusAction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
