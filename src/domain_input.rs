//! Domain ingestion.
//!
//! Domains come from standard input, from a file (one per line) or from a
//! single literal argument. Every entry is trimmed and has a leading
//! `http://` or `https://` removed, and blank entries are skipped, so the
//! fetcher only ever sees non-empty, scheme-less domains.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::errors::{IoResultExt, Result, VtUrlsError};

/// Where the list of domains is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSource {
    Stdin,
    File(PathBuf),
    Literal(String),
}

impl DomainSource {
    /// Interpret the optional positional argument.
    ///
    /// No argument means stdin. An argument naming an existing regular file
    /// is read as a domain list; anything else is a single domain.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => DomainSource::Stdin,
            Some(value) => {
                let path = Path::new(value);
                if path.is_file() {
                    DomainSource::File(path.to_path_buf())
                } else {
                    DomainSource::Literal(value.to_string())
                }
            }
        }
    }

    /// Read and normalize every domain from this source.
    pub fn load(&self) -> Result<Vec<String>> {
        match self {
            DomainSource::Stdin => read_domains(io::stdin().lock()).with_path("<stdin>", "read"),
            DomainSource::File(path) => {
                let display = path.display().to_string();
                let file = File::open(path).with_path(&display, "open")?;
                read_domains(BufReader::new(file)).with_path(&display, "read")
            }
            DomainSource::Literal(value) => {
                let domain = clean_domain(value);
                if domain.is_empty() {
                    return Err(VtUrlsError::invalid_input(value, "no domain left after cleaning"));
                }
                Ok(vec![domain])
            }
        }
    }

    /// [`load`](Self::load) on the blocking pool, abandoned when `cancel` fires.
    ///
    /// A stdin read cannot be interrupted, so on cancellation the reading
    /// thread is left behind and the caller is expected to exit.
    pub async fn load_until_cancelled(self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let label = self.label();
        let reader = tokio::task::spawn_blocking(move || self.load());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VtUrlsError::cancelled(label)),
            joined = reader => joined
                .map_err(io::Error::other)
                .with_path(&label, "read")?,
        }
    }

    fn label(&self) -> String {
        match self {
            DomainSource::Stdin => "<stdin>".to_string(),
            DomainSource::File(path) => path.display().to_string(),
            DomainSource::Literal(value) => value.clone(),
        }
    }
}

/// Trim whitespace and strip a leading `http://` or `https://`.
pub fn clean_domain(input: &str) -> String {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix("http://").unwrap_or(trimmed);
    rest.strip_prefix("https://").unwrap_or(rest).to_string()
}

/// One domain per line; blank lines (after cleaning) are skipped.
pub fn read_domains<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut domains = Vec::new();
    for line in reader.lines() {
        let domain = clean_domain(&line?);
        if !domain.is_empty() {
            domains.push(domain);
        }
    }
    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_scheme_is_stripped() {
        assert_eq!(clean_domain("https://example.com"), "example.com");
        assert_eq!(clean_domain("http://example.com"), "example.com");
        assert_eq!(clean_domain("example.com"), "example.com");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(clean_domain("  https://example.com \t"), "example.com");
        assert_eq!(clean_domain("   "), "");
        assert_eq!(clean_domain("https://"), "");
    }

    #[test]
    fn test_only_leading_scheme_is_removed() {
        assert_eq!(
            clean_domain("sub.example.com/http://x"),
            "sub.example.com/http://x"
        );
    }

    #[test]
    fn test_read_domains_skips_blanks() {
        let input = "example.com\n\n  https://sub.example.org  \nhttp://\n   \nexample.net\n";
        let domains = read_domains(Cursor::new(input)).unwrap();
        assert_eq!(domains, vec!["example.com", "sub.example.org", "example.net"]);
    }

    #[test]
    fn test_from_arg_detects_files() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://a.example\nb.example").unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap();
        let source = DomainSource::from_arg(Some(path));
        assert_eq!(source, DomainSource::File(file.path().to_path_buf()));
        assert_eq!(source.load().unwrap(), vec!["a.example", "b.example"]);
    }

    #[test]
    fn test_from_arg_literal_and_stdin() {
        assert_eq!(DomainSource::from_arg(None), DomainSource::Stdin);
        let literal = DomainSource::from_arg(Some("https://example.com"));
        assert_eq!(
            literal,
            DomainSource::Literal("https://example.com".to_string())
        );
        assert_eq!(literal.load().unwrap(), vec!["example.com"]);
    }

    #[tokio::test]
    async fn test_cancelled_load_returns_immediately() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a.example").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = DomainSource::File(file.path().to_path_buf())
            .load_until_cancelled(&cancel)
            .await
            .unwrap_err();
        let expected = file.path().display().to_string();
        assert!(matches!(err, VtUrlsError::Cancelled { ref target } if *target == expected));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_load_until_cancelled_reads_source() {
        let domains = DomainSource::Literal("http://example.com".into())
            .load_until_cancelled(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(domains, vec!["example.com"]);
    }

    #[test]
    fn test_blank_literal_is_rejected() {
        let err = DomainSource::Literal("  ".into()).load().unwrap_err();
        assert!(matches!(err, VtUrlsError::InvalidInput { .. }));
    }
}
