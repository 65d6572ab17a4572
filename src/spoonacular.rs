use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::recipes::{RecipeDetail, RecipeService, RecipeSummary, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.spoonacular.com";

// The key travels as a query parameter and reqwest errors carry the request
// URL, so every reqwest error is stripped of its URL before it leaves here.
pub struct SpoonacularClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.unwrap_or_default().to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/recipes/complexSearch", self.base_url)
    }

    fn details_url(&self, id: i64) -> String {
        format!("{}/recipes/{}/information", self.base_url, id)
    }
}

#[async_trait]
impl RecipeService for SpoonacularClient {
    async fn search(&self, query: &str, number: u32) -> Result<Vec<RecipeSummary>> {
        debug!(query, number, "searching recipes");

        let number = number.to_string();
        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("query", query),
                ("number", number.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            return Err(anyhow!("Search API failed with status: {}", response.status()));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(search.results)
    }

    async fn details(&self, id: i64) -> Result<RecipeDetail> {
        debug!(id, "fetching recipe details");

        let response = self
            .client
            .get(self.details_url(id))
            .query(&[("apiKey", &self.api_key)])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            return Err(anyhow!("Details API failed with status: {}", response.status()));
        }

        let detail: RecipeDetail = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const KEY: &str = "SECRETKEY123";

    /// Client for a local responder, bypassing any proxy from the environment
    fn local_client(base_url: &str) -> SpoonacularClient {
        SpoonacularClient {
            client: Client::builder().no_proxy().build().unwrap(),
            ..SpoonacularClient::new(base_url, Some(KEY))
        }
    }

    /// Answer a single HTTP request with `status` and `body`.
    /// The handle resolves to the request line that was received.
    async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            let request = String::from_utf8_lossy(&request).into_owned();
            request.lines().next().unwrap_or_default().to_string()
        });

        (base_url, handle)
    }

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let client = SpoonacularClient::new("https://api.spoonacular.com/", Some("k"));
        assert_eq!(client.search_url(), "https://api.spoonacular.com/recipes/complexSearch");
        assert_eq!(client.details_url(42), "https://api.spoonacular.com/recipes/42/information");
    }

    #[test]
    fn test_missing_key_is_empty() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL, None);
        assert!(client.api_key.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_error_hides_key() {
        // Port 9 (discard) on localhost is not expected to speak HTTP
        let client = local_client("http://127.0.0.1:9");

        let err = client.search("pasta", 1).await.unwrap_err();
        assert!(!format!("{err:#}").contains(KEY));
        assert!(!format!("{err:?}").contains(KEY));

        let err = client.details(42).await.unwrap_err();
        assert!(!format!("{err:#}").contains(KEY));
    }

    #[tokio::test]
    async fn test_search_sends_one_candidate_request() {
        let (base_url, server) =
            respond_once("200 OK", r#"{"results":[{"id":42,"title":"Pasta"}],"totalResults":1}"#).await;
        let client = local_client(&base_url);

        let results = client.search("green curry", 1).await.unwrap();
        assert_eq!(results, vec![RecipeSummary { id: 42, title: Some("Pasta".to_string()) }]);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /recipes/complexSearch?"));
        assert!(request_line.contains("query=green+curry"));
        assert!(request_line.contains("number=1"));
        assert!(request_line.contains(&format!("apiKey={KEY}")));
    }

    #[tokio::test]
    async fn test_details_requests_by_id() {
        let (base_url, server) = respond_once(
            "200 OK",
            r#"{"id":42,"title":"Pasta","readyInMinutes":20,"servings":2,"instructions":"<p>Boil</p>"}"#,
        )
        .await;
        let client = local_client(&base_url);

        let detail = client.details(42).await.unwrap();
        assert_eq!(detail.title, "Pasta");
        assert_eq!(detail.ready_in_minutes, 20);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /recipes/42/information?"));
        assert!(request_line.contains(&format!("apiKey={KEY}")));
    }

    #[tokio::test]
    async fn test_search_rejected_status_is_an_error() {
        let (base_url, server) = respond_once("401 Unauthorized", r#"{"status":"failure"}"#).await;
        let client = local_client(&base_url);

        let err = client.search("pasta", 1).await.unwrap_err();
        let text = format!("{err:#}");
        assert!(text.contains("401"));
        assert!(!text.contains(KEY));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_details_server_error_is_an_error() {
        let (base_url, server) = respond_once("500 Internal Server Error", "{}").await;
        let client = local_client(&base_url);

        let err = client.details(42).await.unwrap_err();
        assert!(format!("{err:#}").contains("500"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_error_hides_key() {
        let (base_url, server) = respond_once("200 OK", "not json").await;
        let client = local_client(&base_url);

        let err = client.search("pasta", 1).await.unwrap_err();
        assert!(!format!("{err:#}").contains(KEY));
        server.await.unwrap();
    }
}
