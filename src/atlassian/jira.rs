use serde::Deserialize;
use url::Url;

use super::{http_client, status_error};
use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::metrics::IssueQueryService;

/// Thin Jira REST client. One instance per run, shared connection pool,
/// basic auth with an API token.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct SearchTotal {
    total: u64,
}

impl JiraClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http: http_client()?,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(Error::from)
    }

    /// Verify the credentials up front so a bad token aborts the run
    /// before any counting starts.
    pub async fn authenticate(&self) -> Result<()> {
        let url = self.endpoint("/rest/api/2/myself")?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Jira authentication", status));
        }
        Ok(())
    }

    /// Total number of issues matching a JQL filter. Requests a minimal
    /// field projection and a single-result page; the service reports the
    /// full match count regardless of page size.
    pub async fn search_total(&self, jql: &str) -> Result<u64> {
        let url = self.endpoint("/rest/api/2/search")?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.token))
            .query(&[("jql", jql), ("fields", "key"), ("maxResults", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Jira search", status));
        }
        let body: SearchTotal = response.json().await?;
        Ok(body.total)
    }
}

impl IssueQueryService for JiraClient {
    async fn issue_count(&self, jql: &str) -> Result<u64> {
        self.search_total(jql).await
    }
}
