//! High-level application orchestration.
//!
//! `App::run` is what the binary calls:
//!   1. Config load (defaults, environment, CLI) and validation
//!   2. Domain ingestion (stdin, file or literal)
//!   3. Fetcher construction
//!   4. Sequential batch over the domains
//!
//! Per-domain failures are logged and the batch continues. A fatal error
//! (`ExhaustedRetries`, `Cancelled`) stops the whole batch: once every
//! credential has failed for a full deadline, the next domain would fail
//! the same way.

use std::io::Write;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::Cli;
use crate::clock::Clock;
use crate::config::Config;
use crate::domain_input::DomainSource;
use crate::errors::{Result, VtUrlsError};
use crate::fetcher::DomainReportFetcher;
use crate::output::{self, OutputFormat};

/// Counters describing a batch, finished or aborted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lookups attempted, including one that aborted the batch.
    pub processed: usize,
    pub with_urls: usize,
    pub empty: usize,
    pub failed: usize,
}

/// A batch stopped early by a fatal error, with the counts reached so far.
#[derive(Debug, Error)]
#[error("batch aborted after {} lookup(s): {error}", .summary.processed)]
pub struct BatchAborted {
    pub summary: BatchSummary,
    #[source]
    pub error: VtUrlsError,
}

/// Batch options that do not belong to the fetcher itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Proactive rotation interval (0 = never)
    pub rotate_every: usize,
    pub format: OutputFormat,
}

/// Exit code after Ctrl-C, as shells report a SIGINT death.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Application façade.
pub struct App;

impl App {
    /// Execute the end-to-end workflow.
    ///
    /// Returns: intended process exit code (0 = success, 1 = fatal error,
    /// 130 = interrupted).
    pub async fn run(cli: &Cli, cancel: CancellationToken) -> Result<i32> {
        let mut config = Config::from_env();
        config.merge_with_cli(cli);

        if let Err(e) = config.validate() {
            error!("Configuration error: {}", e);
            return Ok(1);
        }

        let source = DomainSource::from_arg(cli.input.as_deref());
        let domains = match source.load_until_cancelled(&cancel).await {
            Ok(domains) => domains,
            Err(VtUrlsError::Cancelled { .. }) => {
                warn!("Interrupted while reading domains");
                return Ok(EXIT_INTERRUPTED);
            }
            Err(e) => {
                error!("{}", e);
                return Ok(1);
            }
        };
        if domains.is_empty() {
            warn!("No domains to look up");
            return Ok(0);
        }

        let mut fetcher = DomainReportFetcher::from_config(&config)?;
        let options = BatchOptions {
            rotate_every: config.batch.rotate_every,
            format: cli.output_format(),
        };

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match run_batch(&mut fetcher, &domains, options, &mut out, &cancel).await {
            Ok(summary) => {
                info!(
                    processed = summary.processed,
                    with_urls = summary.with_urls,
                    empty = summary.empty,
                    failed = summary.failed,
                    "Batch complete"
                );
                Ok(0)
            }
            Err(BatchAborted { summary, error: e }) => {
                warn!(
                    processed = summary.processed,
                    with_urls = summary.with_urls,
                    empty = summary.empty,
                    failed = summary.failed,
                    "Batch aborted"
                );
                match e {
                    VtUrlsError::ExhaustedRetries { .. } => {
                        error!("None of the API keys succeeded: {}; exiting", e);
                        Ok(1)
                    }
                    VtUrlsError::Cancelled { .. } => {
                        warn!("Interrupted: {}", e);
                        Ok(EXIT_INTERRUPTED)
                    }
                    e => {
                        error!("Aborting batch: {}", e);
                        Ok(1)
                    }
                }
            }
        }
    }
}

/// Look up every domain in order, writing results to `out`.
///
/// Non-fatal errors are counted and logged. The first fatal error, or a
/// failure to write results, stops the batch and is returned together
/// with the counts reached so far.
pub async fn run_batch<C, W>(
    fetcher: &mut DomainReportFetcher<C>,
    domains: &[String],
    options: BatchOptions,
    out: &mut W,
    cancel: &CancellationToken,
) -> std::result::Result<BatchSummary, BatchAborted>
where
    C: Clock,
    W: Write,
{
    let mut summary = BatchSummary::default();
    let mut since_rotation = 0usize;

    for domain in domains {
        info!(
            "Fetching data for domain: {} (using API key #{})",
            domain,
            fetcher.pool().position()
        );
        summary.processed += 1;

        match fetcher.fetch_undetected_urls(domain, cancel).await {
            Ok(urls) => {
                if urls.is_empty() {
                    info!("No undetected URLs for domain: {}", domain);
                    summary.empty += 1;
                } else {
                    info!("Undetected URLs for domain {}: {}", domain, urls.len());
                    summary.with_urls += 1;
                }
                if let Err(e) = output::write_urls(out, options.format, domain, &urls) {
                    return Err(BatchAborted {
                        summary,
                        error: VtUrlsError::io("<stdout>", "write results", e),
                    });
                }
            }
            Err(e) if e.is_fatal() => {
                summary.failed += 1;
                return Err(BatchAborted { summary, error: e });
            }
            Err(e) => {
                error!(category = %e.category(), "Error fetching {}: {}", domain, e);
                summary.failed += 1;
            }
        }

        since_rotation += 1;
        if options.rotate_every > 0 && since_rotation >= options.rotate_every {
            since_rotation = 0;
            fetcher.pool_mut().rotate();
            info!("Rotated API key to #{}", fetcher.pool().position());
        }
    }

    Ok(summary)
}
