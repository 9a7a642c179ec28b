//! HTTP client for the Europeana Search API.

use std::time::Duration;

use heritage_map_record_models::{NormalizedRecord, RawItem};

use crate::normalize::normalize_items;
use crate::search::{SearchQuery, api_error_message, parse_search_response};
use crate::{ApiConfig, EuropeanaError};

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Europeana search client.
///
/// Holds no per-request state, so one client can serve any number of
/// fetches.
#[derive(Debug, Clone)]
pub struct EuropeanaClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl EuropeanaClient {
    /// Validates `config` and builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiConfig::validate`] error, or
    /// [`EuropeanaError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, EuropeanaError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("heritage_map/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches up to `rows` records of `provider_name` that have a place
    /// latitude, and normalizes them.
    ///
    /// Input is validated before any request is made. Zero matches yield
    /// an empty vector.
    ///
    /// # Errors
    ///
    /// Returns [`EuropeanaError::EmptyProviderName`] or
    /// [`EuropeanaError::InvalidRowLimit`] for bad input, and a fetch
    /// error (`Http`, `Status`, `Api`, `Payload`) if the request fails.
    pub async fn fetch(
        &self,
        provider_name: &str,
        rows: u32,
    ) -> Result<Vec<NormalizedRecord>, EuropeanaError> {
        let query = SearchQuery::for_provider(provider_name, rows)?;
        let items = self.search(&query).await?;

        log::info!(
            "Retrieved {} items for data provider \"{}\"",
            items.len(),
            query.provider_name()
        );

        Ok(normalize_items(&items))
    }

    /// Issues the search request and returns the raw items.
    ///
    /// # Errors
    ///
    /// Returns a fetch error if the request fails, the API reports an
    /// error, or the body is not a search response.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<RawItem>, EuropeanaError> {
        log::debug!(
            "Searching Europeana: provider=\"{}\", rows={}",
            query.provider_name(),
            query.rows()
        );

        let resp = self.search_request(query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        let json = serde_json::from_str::<serde_json::Value>(&body);

        if !status.is_success() {
            log::warn!(
                "Europeana search returned {status}: {}",
                preview(&body, BODY_PREVIEW_LEN)
            );
            return match json.ok().as_ref().and_then(api_error_message) {
                Some(message) => Err(EuropeanaError::Api { message }),
                None => Err(EuropeanaError::Status { status }),
            };
        }

        let json = json.map_err(|e| EuropeanaError::Payload {
            message: format!("response is not JSON: {e}"),
        })?;

        parse_search_response(&json)
    }

    /// Builds the search request without sending it.
    #[must_use]
    pub fn search_request(&self, query: &SearchQuery) -> reqwest::RequestBuilder {
        self.http
            .get(self.config.search_url())
            .query(&[("wskey", self.config.api_key.as_str())])
            .query(&query.params())
    }
}

fn preview(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
    use tokio::net::TcpListener;

    use super::*;

    fn client(base_url: &str) -> EuropeanaClient {
        EuropeanaClient::new(
            ApiConfig::new("test-key")
                .with_base_url(base_url)
                .with_timeout_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn refuses_invalid_config() {
        let err = EuropeanaClient::new(ApiConfig::new("")).unwrap_err();
        assert!(matches!(err, EuropeanaError::MissingApiKey));
    }

    #[test]
    fn builds_search_url() {
        let client = client("https://api.europeana.eu/record/v2/");
        let query = SearchQuery::for_provider("Rijksmuseum", 25).unwrap();
        let request = client.search_request(&query).build().unwrap();

        assert_eq!(request.url().path(), "/record/v2/search.json");
        let params: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("wskey".to_string(), "test-key".to_string()),
                ("query".to_string(), "pl_wgs84_pos_lat:(*)".to_string()),
                ("qf".to_string(), "DATA_PROVIDER:\"Rijksmuseum\"".to_string()),
                ("rows".to_string(), "25".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn rejects_empty_provider_before_any_request() {
        // Nothing listens on the discard port; reaching the network would
        // surface as an Http error instead.
        let client = client("http://127.0.0.1:9");
        let err = client.fetch("", 10).await.unwrap_err();
        assert!(matches!(err, EuropeanaError::EmptyProviderName));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_fetch_error() {
        let client = client("http://127.0.0.1:9");
        let err = client.fetch("Rijksmuseum", 10).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Fetch);
    }

    /// Answers one request on an ephemeral port with `status` and `body`.
    /// The handle yields the request head that was received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/record/v2"), handle)
    }

    #[tokio::test]
    async fn fetch_normalizes_list_wrapped_items() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{
                "success": true,
                "itemsCount": 2,
                "items": [
                    {
                        "id": "/1/paris",
                        "edmPlaceLatitude": ["48.85"],
                        "edmPlaceLongitude": ["2.35"],
                        "country": ["france"],
                        "dataProvider": ["Louvre"],
                        "dcCreator": ["Anon"]
                    },
                    { "id": "/1/none", "edmPlaceLatitude": ["n/a"] }
                ]
            }"#,
        )
        .await;

        let records = client(&base_url).fetch(" Louvre ", 20).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].latitude, Some(48.85));
        assert_eq!(records[0].longitude, Some(2.35));
        assert_eq!(records[0].country.as_deref(), Some("france"));
        assert_eq!(records[0].creator.as_deref(), Some("Anon"));
        assert_eq!(records[1].id, "/1/none");
        assert!(records[1].latitude.is_none());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /record/v2/search.json?wskey=test-key&"));
        assert!(request.contains("rows=20"));
    }

    #[tokio::test]
    async fn error_status_without_body_is_a_status_error() {
        let (base_url, server) = serve_once("500 Internal Server Error", "").await;

        let err = client(&base_url).fetch("Louvre", 10).await.unwrap_err();
        server.await.unwrap();

        match err {
            EuropeanaError::Status { status } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_with_api_message_is_an_api_error() {
        let (base_url, server) = serve_once(
            "401 Unauthorized",
            r#"{"success":false,"error":"Invalid API key"}"#,
        )
        .await;

        let err = client(&base_url).fetch("Louvre", 10).await.unwrap_err();
        server.await.unwrap();

        match err {
            EuropeanaError::Api { message } => assert_eq!(message, "Invalid API key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_status_with_reported_failure_is_an_api_error() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"success":false,"error":"Query too long"}"#).await;

        let err = client(&base_url).fetch("Louvre", 10).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, EuropeanaError::Api { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Fetch);
    }

    #[tokio::test]
    async fn non_json_body_is_a_payload_error() {
        let (base_url, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = client(&base_url).fetch("Louvre", 10).await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, EuropeanaError::Payload { .. }));
    }

    #[tokio::test]
    async fn zero_results_is_an_empty_fetch() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"success":true,"itemsCount":0,"totalResults":0}"#).await;

        let records = client(&base_url).fetch("Louvre", 10).await.unwrap();
        server.await.unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("ok", 10), "ok");
    }
}
