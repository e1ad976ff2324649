//! vturls library
//!
//! Fetches, for a domain, the URLs VirusTotal has seen but not flagged
//! ("undetected URLs"), using a pool of API keys to ride out per-key rate
//! limits and transient failures.
//!
//! - [`credentials::CredentialPool`] rotates through the keys round-robin
//! - [`retry::RotatingExecutor`] retries one request across keys until a
//!   2xx response or a fixed deadline
//! - [`fetcher::DomainReportFetcher`] builds the domain report request and
//!   decodes the undetected URLs
//!
//! # Example
//!
//! ```rust,no_run
//! use tokio_util::sync::CancellationToken;
//! use vturls::{Config, DomainReportFetcher};
//!
//! # async fn demo() -> vturls::Result<()> {
//! let config = Config {
//!     credentials: vec!["key-1".into(), "key-2".into()],
//!     ..Config::default()
//! };
//! let mut fetcher = DomainReportFetcher::from_config(&config)?;
//! let urls = fetcher
//!     .fetch_undetected_urls("example.com", &CancellationToken::new())
//!     .await?;
//! for url in urls {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod domain_input;
pub mod errors;
pub mod fetcher;
pub mod output;
pub mod report;
pub mod retry;

// Re-export commonly used types and functions for convenience
pub use config::Config;
pub use credentials::CredentialPool;
pub use domain_input::{DomainSource, clean_domain};
pub use errors::{ErrorCategory, Result, VtUrlsError};
pub use fetcher::DomainReportFetcher;
pub use output::OutputFormat;
pub use report::{DomainReport, parse_undetected_urls};
pub use retry::{RetryConfig, RetryState, RotatingExecutor};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
