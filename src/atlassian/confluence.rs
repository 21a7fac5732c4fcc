use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{http_client, status_error};
use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::report::ReportPublisher;

/// Thin Confluence REST client. Pages are written in storage
/// representation; updates fetch the current version and increment it.
pub struct ConfluenceClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ContentSearch {
    results: Vec<ContentRef>,
}

#[derive(Debug, Deserialize)]
struct ContentRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ContentVersion {
    version: VersionNumber,
}

#[derive(Debug, Deserialize)]
struct VersionNumber {
    number: u64,
}

impl ConfluenceClient {
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

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.credentials.username, Some(&self.credentials.token))
    }

    /// Verify the credentials against the current-user endpoint.
    pub async fn authenticate(&self) -> Result<()> {
        let url = self.endpoint("/rest/api/user/current")?;
        let response = self.request(self.http.get(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Confluence authentication", status));
        }
        Ok(())
    }

    async fn find_page(&self, title: &str, space: &str) -> Result<Option<String>> {
        let url = self.endpoint("/rest/api/content")?;
        let response = self
            .request(self.http.get(url))
            .query(&[("spaceKey", space), ("title", title), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Confluence content lookup", status));
        }
        let body: ContentSearch = response.json().await?;
        Ok(body.results.into_iter().next().map(|r| r.id))
    }

    async fn current_version(&self, page_id: &str) -> Result<u64> {
        let url = self.endpoint(&format!("/rest/api/content/{page_id}"))?;
        let response = self
            .request(self.http.get(url))
            .query(&[("expand", "version")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error("Confluence version lookup", status));
        }
        let body: ContentVersion = response.json().await?;
        Ok(body.version.number)
    }
}

impl ReportPublisher for ConfluenceClient {
    async fn page_exists(&self, title: &str, space: &str) -> Result<bool> {
        Ok(self.find_page(title, space).await?.is_some())
    }

    async fn page_id_by_title(&self, title: &str, space: &str) -> Result<String> {
        self.find_page(title, space)
            .await?
            .ok_or_else(|| Error::Publish(format!("page not found: {title}")))
    }

    async fn create_page(
        &self,
        space: &str,
        title: &str,
        body_html: &str,
        parent_id: &str,
    ) -> Result<()> {
        let url = self.endpoint("/rest/api/content")?;
        let payload = json!({
            "type": "page",
            "title": title,
            "space": { "key": space },
            "ancestors": [{ "id": parent_id }],
            "body": {
                "storage": {
                    "value": body_html,
                    "representation": "storage",
                }
            },
        });
        let response = self
            .request(self.http.post(url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("create page: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Publish(format!("create page: HTTP {status}")));
        }
        log::info!("created page {title:?} in space {space}");
        Ok(())
    }

    async fn update_page(&self, page_id: &str, title: &str, body_html: &str) -> Result<()> {
        let next_version = self.current_version(page_id).await? + 1;
        let url = self.endpoint(&format!("/rest/api/content/{page_id}"))?;
        let payload = json!({
            "id": page_id,
            "type": "page",
            "title": title,
            "version": { "number": next_version },
            "body": {
                "storage": {
                    "value": body_html,
                    "representation": "storage",
                }
            },
        });
        let response = self
            .request(self.http.put(url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("update page {page_id}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Publish(format!(
                "update page {page_id}: HTTP {status}"
            )));
        }
        log::info!("updated page {page_id} ({title:?}) to version {next_version}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            username: "bot@example.com".to_string(),
            token: "secret".to_string(),
        }
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ConfluenceClient::new("://nope", credentials()).is_err());
    }

    #[test]
    fn test_content_endpoint_join() {
        let client =
            ConfluenceClient::new("https://example.atlassian.net", credentials()).unwrap();
        let url = client.endpoint("/rest/api/content/123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.atlassian.net/rest/api/content/123"
        );
    }
}
