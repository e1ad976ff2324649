use clap::Parser;

use crate::output::OutputFormat;

/// Command-line interface definition.
///
/// Verbosity levels:
/// 0 - silent (only results on stdout)
/// 1 - errors
/// 2 - warnings + errors
/// 3 - progress (default)
/// 4 - debug
/// 5 - trace
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Fetch undetected URLs for domains from VirusTotal, rotating across API keys"
)]
pub struct Cli {
    /// File with one domain per line, or a single domain. Reads stdin when omitted.
    pub input: Option<String>,

    /// Comma-separated VirusTotal API keys (falls back to VTURLS_API_KEYS)
    #[arg(short = 't', long = "tokens", value_name = "KEYS")]
    pub tokens: Option<String>,

    /// Emit one JSON object per domain instead of bare URLs
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (0-5)
    #[arg(long, default_value_t = 3)]
    pub verbose: u8,

    /// Advance to the next API key after this many lookups (0 disables)
    #[arg(long, value_name = "N")]
    pub rotate_every: Option<usize>,

    /// Override the domain report endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }

    /// Default tracing filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "off",
            1 => "error",
            2 => "warn",
            3 => "info",
            4 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["vturls"]);
        assert!(cli.input.is_none());
        assert!(cli.tokens.is_none());
        assert_eq!(cli.output_format(), OutputFormat::Plain);
        assert_eq!(cli.log_directive(), "info");
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "vturls",
            "-t",
            "a,b",
            "--json",
            "--verbose",
            "0",
            "domains.txt",
        ]);
        assert_eq!(cli.tokens.as_deref(), Some("a,b"));
        assert_eq!(cli.input.as_deref(), Some("domains.txt"));
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert_eq!(cli.log_directive(), "off");
    }
}
