//! HTTP client for the Google Places Text Search API.
//!
//! One request per lookup: the query is the place name and address joined by
//! a space, and only the service's top-ranked candidate is used.

use std::time::Duration;

use reqwest::{Client, Url};
use revmig_core::{retry_with_backoff, ResolvedPlace, RetryPolicy};

use crate::error::{is_retriable, PlacesError};
use crate::types::{PlaceCandidate, TextSearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Client for the Places Text Search endpoint.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    retry: RetryPolicy,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, retry, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`PlacesError::ApiError`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::ApiError {
            status: "INVALID_BASE_URL".to_string(),
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            retry,
        })
    }

    /// Resolves a place by name and address.
    ///
    /// Returns `Ok(None)` when the search yields no candidates.
    ///
    /// # Errors
    ///
    /// Propagates every [`PlacesError`] from [`PlacesClient::text_search`].
    pub async fn resolve(
        &self,
        name: &str,
        address: &str,
    ) -> Result<Option<ResolvedPlace>, PlacesError> {
        let query = search_query(name, address);
        let candidates = self.text_search(&query).await?;

        let Some(best) = candidates.into_iter().next() else {
            tracing::info!(query = %query, "place search found nothing");
            return Ok(None);
        };

        tracing::info!(
            query = %query,
            matched_name = best.name.as_deref().unwrap_or(""),
            matched_address = best.formatted_address.as_deref().unwrap_or(""),
            place_id = %best.place_id,
            "place search matched"
        );
        Ok(Some(best.into()))
    }

    /// Runs one text search and returns the candidates in service order.
    ///
    /// `ZERO_RESULTS` is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::QuotaExceeded`] on `OVER_QUERY_LIMIT`.
    /// - [`PlacesError::ApiError`] on any other non-OK status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status,
    ///   after retries.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let url = self.build_url("textsearch/json", &[("query", query)])?;

        let body = retry_with_backoff(self.retry, "places.textsearch", is_retriable, || {
            self.request_json(&url)
        })
        .await?;

        let response: TextSearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("textsearch(query={query})"),
                source: e,
            })?;

        Self::check_status(&response)?;
        Ok(response.results)
    }

    /// Builds the request URL with `key` plus the given query parameters,
    /// percent-encoded via [`Url::query_pairs_mut`].
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PlacesError::ApiError {
                status: "INVALID_ENDPOINT".to_string(),
                message: format!("cannot join '{endpoint}': {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: "textsearch".to_string(),
            source: e,
        })
    }

    fn check_status(response: &TextSearchResponse) -> Result<(), PlacesError> {
        let message = || {
            response
                .error_message
                .clone()
                .unwrap_or_else(|| "no error message".to_string())
        };
        match response.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(()),
            "OVER_QUERY_LIMIT" => Err(PlacesError::QuotaExceeded(message())),
            other => Err(PlacesError::ApiError {
                status: other.to_string(),
                message: message(),
            }),
        }
    }
}

/// Search text for a row: non-empty name and address joined by one space.
fn search_query(name: &str, address: &str) -> String {
    [name.trim(), address.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
