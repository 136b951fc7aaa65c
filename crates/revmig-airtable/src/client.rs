//! HTTP client for the Airtable list-records endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use revmig_core::{retry_with_backoff, RetryPolicy, SourceRecord};

use crate::error::{is_retriable, AirtableError};
use crate::types::ListRecordsResponse;

const DEFAULT_BASE_URL: &str = "https://api.airtable.com";

/// Records per page; Airtable's maximum.
const PAGE_SIZE: &str = "100";

/// Guard against an offset cursor that never terminates.
pub(crate) const MAX_PAGES: usize = 500;

/// Airtable allows 5 requests per second per base.
const PAGE_INTERVAL: Duration = Duration::from_millis(200);

/// Reads every row of one table.
pub struct AirtableClient {
    client: Client,
    api_token: String,
    table_name: String,
    table_url: Url,
    retry: RetryPolicy,
}

impl AirtableClient {
    /// Creates a client for `base_id`/`table_name` against the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AirtableError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(
        api_token: &str,
        base_id: &str,
        table_name: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, AirtableError> {
        Self::with_base_url(
            api_token,
            base_id,
            table_name,
            timeout_secs,
            user_agent,
            retry,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AirtableError::Http`] if the `reqwest::Client` cannot be built
    /// or [`AirtableError::InvalidUrl`] if `base_url` cannot hold a path.
    pub fn with_base_url(
        api_token: &str,
        base_id: &str,
        table_name: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, AirtableError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let mut table_url = Url::parse(base_url)
            .map_err(|e| AirtableError::InvalidUrl(format!("'{base_url}': {e}")))?;
        table_url
            .path_segments_mut()
            .map_err(|()| AirtableError::InvalidUrl(format!("'{base_url}' cannot be a base")))?
            .pop_if_empty()
            .extend(["v0", base_id, table_name]);

        Ok(Self {
            client,
            api_token: api_token.to_owned(),
            table_name: table_name.to_owned(),
            table_url,
            retry,
        })
    }

    /// Fetches every record of the table, following `offset` cursors, in
    /// the table's default order.
    ///
    /// # Errors
    ///
    /// - [`AirtableError::PaginationLimit`] after [`MAX_PAGES`] pages.
    /// - Any error from [`AirtableClient::list_page`].
    pub async fn fetch_all_records(&self) -> Result<Vec<SourceRecord>, AirtableError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        for page in 0..MAX_PAGES {
            if page > 0 {
                tokio::time::sleep(PAGE_INTERVAL).await;
            }
            let response = self.list_page(offset.as_deref()).await?;
            tracing::debug!(
                table = %self.table_name,
                page,
                count = response.records.len(),
                "fetched Airtable page"
            );
            records.extend(response.records.into_iter().map(SourceRecord::from));

            match response.offset {
                Some(next) => offset = Some(next),
                None => {
                    tracing::info!(
                        table = %self.table_name,
                        total = records.len(),
                        "fetched all Airtable records"
                    );
                    return Ok(records);
                }
            }
        }

        Err(AirtableError::PaginationLimit {
            table: self.table_name.clone(),
            max_pages: MAX_PAGES,
        })
    }

    /// Fetches one page starting at `offset` (first page when `None`).
    ///
    /// # Errors
    ///
    /// - [`AirtableError::RateLimited`] on HTTP 429, after retries.
    /// - [`AirtableError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`AirtableError::Http`] on network failure.
    /// - [`AirtableError::Deserialize`] if the page does not match the expected shape.
    pub async fn list_page(
        &self,
        offset: Option<&str>,
    ) -> Result<ListRecordsResponse, AirtableError> {
        let url = self.page_url(offset);
        retry_with_backoff(self.retry, "airtable.list_records", is_retriable, || {
            self.request_page(&url)
        })
        .await
    }

    fn page_url(&self, offset: Option<&str>) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pageSize", PAGE_SIZE);
            if let Some(offset) = offset {
                pairs.append_pair("offset", offset);
            }
        }
        url
    }

    async fn request_page(&self, url: &Url) -> Result<ListRecordsResponse, AirtableError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AirtableError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AirtableError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AirtableError::Deserialize {
            context: format!("list records ({})", self.table_name),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str, table: &str) -> AirtableClient {
        AirtableClient::with_base_url("tok", "appX", table, 5, "ua", RetryPolicy::none(), base)
            .expect("client construction should not fail")
    }

    #[test]
    fn page_url_encodes_table_name() {
        let c = client("https://api.airtable.com", "Review Data");
        assert_eq!(
            c.page_url(None).as_str(),
            "https://api.airtable.com/v0/appX/Review%20Data?pageSize=100"
        );
    }

    #[test]
    fn page_url_carries_offset() {
        let c = client("https://api.airtable.com/", "Reviews");
        assert_eq!(
            c.page_url(Some("itr123/rec456")).as_str(),
            "https://api.airtable.com/v0/appX/Reviews?pageSize=100&offset=itr123%2Frec456"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result =
            AirtableClient::with_base_url("t", "b", "t", 5, "ua", RetryPolicy::none(), "nope");
        assert!(matches!(result, Err(AirtableError::InvalidUrl(_))));
    }

    #[test]
    fn classifies_retriable_errors() {
        assert!(is_retriable(&AirtableError::RateLimited));
        assert!(is_retriable(&AirtableError::UnexpectedStatus {
            status: 502,
            url: String::new(),
            body: String::new(),
        }));
        assert!(!is_retriable(&AirtableError::UnexpectedStatus {
            status: 401,
            url: String::new(),
            body: String::new(),
        }));
    }
}
