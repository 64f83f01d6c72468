use async_trait::async_trait;
use purge_config::{Config, API_TOKEN_ENV, REQUEST_TIMEOUT_SECS};
use purge_models::{Category, ItemId};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::torbox::api;
use crate::traits::{DeleteOutcome, DownloadService, Page};

#[derive(Clone)]
pub struct TorboxClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl TorboxClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let client = Client::builder()
            .user_agent(concat!("torbox-purge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        if api_token.is_none() {
            warn!(
                operation = "client_init",
                env = API_TOKEN_ENV,
                "No API token configured; requests to the service will fail. Set the variable or run 'torbox-purge config token'"
            );
        }

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
            timeout,
        })
    }

    pub fn from_config(config: &Config, api_token: Option<String>) -> Result<Self, ClientError> {
        Self::new(config.api.base_url.clone(), api_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DownloadService for TorboxClient {
    fn service_name(&self) -> &str {
        "torbox"
    }

    async fn list_page(
        &self,
        category: Category,
        offset: usize,
        limit: usize,
    ) -> Result<Page, ClientError> {
        let url = self.url(category.list_path());
        debug!(url = %url, offset, limit, "Requesting list page");

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        api::parse_list_body(&body, category)
    }

    async fn delete_item(&self, id: &ItemId, category: Category) -> DeleteOutcome {
        let url = self.url(category.control_path());
        let payload = api::delete_payload(id, category);
        debug!(url = %url, id = %id, category = %category, "Sending delete request");

        let response = match self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return DeleteOutcome::Failed {
                    reason: ClientError::from_reqwest(e, self.timeout).to_string(),
                }
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => api::interpret_delete_response(status, body),
            Err(e) => DeleteOutcome::Failed {
                reason: ClientError::from_reqwest(e, self.timeout).to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answer a single HTTP request with a canned response and hand back the
    /// raw request text.
    async fn respond_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}/v1/api", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_urls_are_joined_without_double_slash() {
        let client = TorboxClient::new("https://api.torbox.app/v1/api/", Some("t".to_string())).unwrap();
        assert_eq!(
            client.url(Category::Torrent.list_path()),
            "https://api.torbox.app/v1/api/torrents/mylist"
        );
        assert_eq!(
            client.url(Category::WebDownload.control_path()),
            "https://api.torbox.app/v1/api/webdl/controlwebdownload"
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:8080/v1/api".to_string();
        let client = TorboxClient::from_config(&config, None).unwrap();
        assert!(client.api_token.is_none());
        assert_eq!(client.timeout, Duration::from_secs(300));
        assert_eq!(client.url("x"), "http://localhost:8080/v1/api/x");
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_failures() {
        // Port 9 (discard) on localhost is closed on test machines
        let client = TorboxClient::new("http://127.0.0.1:9/v1/api", None).unwrap();

        let page = client.list_page(Category::Torrent, 0, 10).await;
        assert!(matches!(page, Err(ref e) if e.is_transient()));

        let outcome = client.delete_item(&ItemId::Numeric(1), Category::Torrent).await;
        assert!(!outcome.is_deleted());
    }

    #[tokio::test]
    async fn test_list_page_sends_paging_and_auth() {
        let (base, server) = respond_once(
            "200 OK",
            r#"{"success": true, "data": [{"id": 7, "created_at": "2024-05-01T10:00:00Z", "download_state": "checking"}]}"#,
        )
        .await;
        let client = TorboxClient::new(base, Some("secret".to_string())).unwrap();

        let page = client.list_page(Category::Torrent, 20, 10).await.unwrap();
        assert_eq!(page.entries, 1);
        assert_eq!(page.items[0].id, ItemId::Numeric(7));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1/api/torrents/mylist?offset=20&limit=10 "));
        assert!(request.to_lowercase().contains("authorization: bearer secret"));
    }

    #[tokio::test]
    async fn test_list_page_maps_error_status() {
        let (base, server) = respond_once("401 Unauthorized", r#"{"detail": "bad token"}"#).await;
        let client = TorboxClient::new(base, None).unwrap();

        let result = client.list_page(Category::WebDownload, 0, 10).await;
        match result {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, r#"{"detail": "bad token"}"#);
            }
            other => panic!("expected a status error, got {:?}", other.map(|p| p.entries)),
        }

        let request = server.await.unwrap();
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_delete_item_posts_control_payload() {
        let (base, server) = respond_once("200 OK", r#"{"success": true, "detail": "deleted"}"#).await;
        let client = TorboxClient::new(base, Some("secret".to_string())).unwrap();

        let outcome = client.delete_item(&ItemId::Numeric(42), Category::Torrent).await;
        assert!(outcome.is_deleted());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/api/torrents/controltorrent "));
        assert!(request.contains(r#""torrent_id":42"#));
        assert!(request.contains(r#""operation":"delete""#));
    }

    #[tokio::test]
    async fn test_delete_item_refused_by_service() {
        let (base, server) = respond_once("200 OK", r#"{"success": false, "detail": "unknown id"}"#).await;
        let client = TorboxClient::new(base, Some("secret".to_string())).unwrap();

        let outcome = client
            .delete_item(&ItemId::Text("abc".to_string()), Category::WebDownload)
            .await;
        assert_eq!(outcome, DeleteOutcome::Failed { reason: "unknown id".to_string() });

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/api/webdl/controlwebdownload "));
        assert!(request.contains(r#""webdl_id":"abc""#));
    }
}
