//! Hephora REST client
//!
//! Every endpoint is a GET carrying a JSON body (`{"profile": .., "id": ..}`).
//! Responses come either wrapped (`{"nodes": [...]}` / `{"node": {...}}`) or bare.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{NodeRepository, Result};
use crate::error::RemoteError;
use crate::model::{ChildRef, NodeRecord, NodeSummary, Profile};

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Wrapped { nodes: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_inner(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { nodes } => nodes,
            ListEnvelope::Bare(nodes) => nodes,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NodeEnvelope {
    Wrapped { node: NodeRecord },
    Bare(NodeRecord),
}

pub struct HttpNodeRepository {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpNodeRepository {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport {
                url: base_url.to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, %body, "GET");

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| RemoteError::Transport {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| RemoteError::Transport {
            url: url.clone(),
            message: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(RemoteError::Status {
                url,
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::Decode {
            url,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl NodeRepository for HttpNodeRepository {
    async fn list_nodes(&self, profile: Profile) -> Result<Vec<NodeSummary>> {
        let envelope: ListEnvelope<NodeSummary> = self
            .fetch("/nodes/list", json!({ "profile": profile.as_str() }))
            .await?;
        Ok(envelope.into_inner())
    }

    async fn get_node(&self, profile: Profile, id: &str) -> Result<NodeRecord> {
        let envelope: NodeEnvelope = self
            .fetch("/nodes", json!({ "profile": profile.as_str(), "id": id }))
            .await?;
        Ok(match envelope {
            NodeEnvelope::Wrapped { node } => node,
            NodeEnvelope::Bare(node) => node,
        })
    }

    async fn list_children(&self, profile: Profile, id: &str) -> Result<Vec<ChildRef>> {
        let envelope: ListEnvelope<ChildRef> = self
            .fetch(
                "/nodes/children",
                json!({ "profile": profile.as_str(), "id": id }),
            )
            .await?;
        Ok(envelope.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Request as seen by the stub server
    #[derive(Debug)]
    struct Captured {
        path: String,
        authorization: Option<String>,
        body: serde_json::Value,
    }

    /// Serves one request with `status` and `body`, handing back what it received
    async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            let header_end = loop {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                raw.extend_from_slice(&buf[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
            let header = |name: &str| {
                head.lines().find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.eq_ignore_ascii_case(name).then(|| value.trim().to_string())
                })
            };
            let length: usize = header("content-length")
                .map(|v| v.parse().unwrap())
                .unwrap_or(0);
            while raw.len() < header_end + length {
                let n = socket.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before body");
                raw.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            Captured {
                path: head.split_whitespace().nth(1).unwrap_or_default().to_string(),
                authorization: header("authorization"),
                body: serde_json::from_slice(&raw[header_end..header_end + length]).unwrap(),
            }
        });
        (base_url, handle)
    }

    fn repo(base_url: &str, token: Option<&str>) -> HttpNodeRepository {
        HttpNodeRepository::new(base_url, token.map(String::from), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_nodes_sends_profile_and_bearer_token() {
        let (url, server) = serve_once(200, r#"{"nodes": [{"id": "c1", "label": "Engine"}]}"#).await;

        let nodes = repo(&url, Some("secret"))
            .list_nodes(Profile::SwComponent)
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "c1");
        assert_eq!(request.path, "/nodes/list");
        assert_eq!(request.authorization.as_deref(), Some("Bearer secret"));
        assert_eq!(request.body, json!({ "profile": "sw_component" }));
    }

    #[tokio::test]
    async fn test_get_node_sends_profile_and_id() {
        let (url, server) = serve_once(200, r#"{"id": "u1", "label": "Brake", "fields": {}}"#).await;

        let node = repo(&url, None).get_node(Profile::SwUnit, "u1").await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(node.label, "Brake");
        assert_eq!(request.path, "/nodes");
        assert_eq!(request.authorization, None);
        assert_eq!(request.body, json!({ "profile": "sw_unit", "id": "u1" }));
    }

    #[tokio::test]
    async fn test_list_children_sends_profile_and_id() {
        let (url, server) = serve_once(200, r#"[{"_id": "a1", "_profile": "attachment"}]"#).await;

        let children = repo(&url, Some("t"))
            .list_children(Profile::SwUnit, "u1")
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert_eq!(children[0].id, "a1");
        assert_eq!(request.path, "/nodes/children");
        assert_eq!(request.authorization.as_deref(), Some("Bearer t"));
        assert_eq!(request.body, json!({ "profile": "sw_unit", "id": "u1" }));
    }

    #[tokio::test]
    async fn test_error_status_keeps_truncated_body() {
        let long = "x".repeat(500);
        let (url, server) = serve_once(500, &long).await;

        let err = repo(&url, None).list_nodes(Profile::SwUnit).await.unwrap_err();
        server.await.unwrap();

        match err {
            RemoteError::Status { status, body, url } => {
                assert_eq!(status, 500);
                assert_eq!(body.chars().count(), ERROR_BODY_LIMIT);
                assert!(url.ends_with("/nodes/list"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let (url, server) = serve_once(200, "{not json").await;

        let err = repo(&url, None)
            .get_node(Profile::SwUnit, "u1")
            .await
            .unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, RemoteError::Decode { .. }), "{:?}", err);
    }

    #[test]
    fn test_list_envelope_accepts_both_shapes() {
        let wrapped: ListEnvelope<NodeSummary> =
            serde_json::from_str(r#"{"nodes": [{"id": "c1", "label": "Engine"}]}"#).unwrap();
        let bare: ListEnvelope<NodeSummary> =
            serde_json::from_str(r#"[{"id": "c1", "label": "Engine"}]"#).unwrap();
        assert_eq!(wrapped.into_inner(), bare.into_inner());
    }

    #[test]
    fn test_node_envelope_accepts_both_shapes() {
        let wrapped: NodeEnvelope =
            serde_json::from_str(r#"{"node": {"id": "c1", "label": "Engine"}}"#).unwrap();
        assert!(matches!(wrapped, NodeEnvelope::Wrapped { ref node } if node.id == "c1"));

        let bare: NodeEnvelope =
            serde_json::from_str(r#"{"id": "c1", "label": "Engine", "fields": {}}"#).unwrap();
        assert!(matches!(bare, NodeEnvelope::Bare(ref node) if node.label == "Engine"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let repo =
            HttpNodeRepository::new("http://localhost:8080/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(repo.base_url(), "http://localhost:8080");
    }
}
