use pulse_service::{
    apis::api_models::response::TokensPageResponse,
    utils::errors::error_payload::ErrorPayload,
};
use tracing::{debug, instrument};

use crate::{error::WatchError, settings::PageRequest};

/// Thin HTTP client for the token list endpoint.
#[derive(Clone)]
pub struct PulseClient {
    http: reqwest::Client,
    base_url: String,
}

impl PulseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// The socket endpoint served next to the REST api.
    pub fn ws_url(&self) -> String {
        let url = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        };
        format!("{}/ws", url)
    }

    #[instrument(skip(self), fields(page = request.pagination.page()))]
    pub async fn fetch_page(&self, request: &PageRequest) -> Result<TokensPageResponse, WatchError> {
        let response = self
            .http
            .get(format!("{}/api/tokens", self.base_url))
            .query(&query_pairs(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorPayload>().await {
                Ok(payload) => payload.message,
                Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
            };
            return Err(WatchError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let page: TokensPageResponse = response.json().await?;
        debug!(total = page.total, rows = page.data.len(), "Fetched token page");
        Ok(page)
    }
}

fn query_pairs(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("page", request.pagination.page().to_string()),
        ("pageSize", request.pagination.page_size().to_string()),
    ];
    if let Some(tab) = request.tab {
        pairs.push(("tab", tab.to_string()));
    }
    if let Some(search) = &request.search {
        pairs.push(("search", search.clone()));
    }
    if !request.sort.is_empty() {
        pairs.push(("sort", request.sort.to_string()));
    }
    pairs
}

#[cfg(test)]
mod tests {
    use pulse_service::models::{
        sorts::SortConfig, token_query::Pagination, tokens::TokenStatus,
    };
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("http://127.0.0.1:3000", "ws://127.0.0.1:3000/ws")]
    #[case("https://pulse.example.com", "wss://pulse.example.com/ws")]
    fn test_ws_url(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(PulseClient::new(base).ws_url(), expected);
    }

    #[test]
    fn test_query_pairs() {
        let request = PageRequest {
            tab: Some(TokenStatus::Final),
            pagination: Pagination::new(2, 25).unwrap(),
            search: Some("sol".to_string()),
            sort: SortConfig::parse("price:desc,rank").unwrap(),
        };

        assert_eq!(
            query_pairs(&request),
            vec![
                ("page", "2".to_string()),
                ("pageSize", "25".to_string()),
                ("tab", "final".to_string()),
                ("search", "sol".to_string()),
                ("sort", "price:desc,rank:asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_skip_unset_filters() {
        let request = PageRequest {
            tab: None,
            pagination: Pagination::new(1, 50).unwrap(),
            search: None,
            sort: SortConfig::default(),
        };

        assert_eq!(query_pairs(&request).len(), 2);
    }
}
