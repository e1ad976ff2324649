//! Domain report lookups.
//!
//! [`DomainReportFetcher`] turns a domain into a list of undetected URLs:
//! it builds the `GET <endpoint>?apikey=..&domain=..` request for whichever
//! credential is current, lets the [`RotatingExecutor`] deliver it, then
//! decodes the report body. There is no caching; each call is a fresh
//! round trip.

use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::clock::{Clock, TokioClock};
use crate::config::Config;
use crate::credentials::CredentialPool;
use crate::errors::{Result, VtUrlsError};
use crate::report;
use crate::retry::RotatingExecutor;

pub struct DomainReportFetcher<C = TokioClock> {
    http: Client,
    endpoint: Url,
    pool: CredentialPool,
    executor: RotatingExecutor<C>,
}

impl DomainReportFetcher<TokioClock> {
    /// Build a fetcher from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pool = CredentialPool::new(config.credentials.iter().cloned())?;
        let endpoint = config.endpoint_url()?;
        let http = Client::builder()
            .timeout(config.network.request_timeout)
            .user_agent(config.network.user_agent.clone())
            .build()
            .map_err(|e| VtUrlsError::network("build http client", endpoint.as_str(), e))?;

        Ok(Self::with_parts(
            http,
            endpoint,
            pool,
            RotatingExecutor::new(config.retry_config()),
        ))
    }
}

impl<C: Clock> DomainReportFetcher<C> {
    pub fn with_parts(
        http: Client,
        endpoint: Url,
        pool: CredentialPool,
        executor: RotatingExecutor<C>,
    ) -> Self {
        Self {
            http,
            endpoint,
            pool,
            executor,
        }
    }

    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut CredentialPool {
        &mut self.pool
    }

    /// Fetch the undetected URLs recorded for `domain`.
    ///
    /// `domain` is passed through as given; callers normalize it first.
    /// An empty list is a valid answer. `ExhaustedRetries` and `Cancelled`
    /// come from the executor unchanged, a body that is not a report
    /// yields `DecodeFailure`.
    pub async fn fetch_undetected_urls(
        &mut self,
        domain: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let http = &self.http;
        let endpoint = &self.endpoint;

        let response = self
            .executor
            .execute(&mut self.pool, domain, cancel, |key| {
                http.get(endpoint.clone())
                    .query(&[("apikey", key), ("domain", domain)])
                    .send()
            })
            .await?;

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VtUrlsError::cancelled(domain)),
            body = response.text() => {
                body.map_err(|e| VtUrlsError::network("read domain report", domain, e))?
            }
        };

        let urls =
            report::parse_undetected_urls(&body).map_err(|e| VtUrlsError::decode(domain, e))?;
        debug!(domain, count = urls.len(), "decoded domain report");
        Ok(urls)
    }
}
