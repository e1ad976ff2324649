//! Output formatting for lookup results.
//!
//! Results go to stdout so they can be piped: plain mode writes one URL per
//! line, JSON mode writes one object per domain per line. Progress and
//! diagnostics go to stderr through `tracing`.

use std::io::{self, Write};

use serde::Serialize;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Bare URLs, one per line
    #[default]
    Plain,
    /// One JSON object per domain
    Json,
}

/// Lookup result for one domain, as serialized in JSON mode.
#[derive(Debug, Clone, Serialize)]
pub struct DomainUrls<'a> {
    pub domain: &'a str,
    pub undetected_urls: &'a [String],
}

/// Write the result for a single domain.
///
/// In plain mode an empty list writes nothing; the caller reports it on
/// stderr instead.
pub fn write_urls<W: Write>(
    out: &mut W,
    format: OutputFormat,
    domain: &str,
    urls: &[String],
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => {
            for url in urls {
                writeln!(out, "{url}")?;
            }
        }
        OutputFormat::Json => {
            let record = DomainUrls {
                domain,
                undetected_urls: urls,
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
    }
    out.flush()
}
