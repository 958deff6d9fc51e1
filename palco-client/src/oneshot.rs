//! In-process transport - drives an axum Router directly.
//!
//! Requires the "in-process" feature.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::Request;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::http::{HttpClient, error_from_response};
use crate::{ClientError, ClientResult};

/// In-process HTTP transport
///
/// Uses Tower's oneshot to call a Router without sockets. Intended for
/// tests and same-process embedding; behaves like the network transport
/// including error mapping.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use palco_client::OneshotHttpClient;
///
/// let router: Router = mock_marketplace().with_state(state);
/// let client = OneshotHttpClient::new(router);
/// let stages: Vec<WorkflowStage> = client.get("/api/companies/1/workflow-stages").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OneshotHttpClient {
    router: Arc<RwLock<Router>>,
    token: Arc<RwLock<Option<String>>>,
}

impl OneshotHttpClient {
    /// Create a new in-process transport over an already-built Router
    /// (`with_state` applied).
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(RwLock::new(router)),
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the bearer token
    pub async fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().await;
        *guard = token;
    }

    /// Current bearer token
    pub async fn get_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn build_request(
        &self,
        method: http::Method,
        path: &str,
    ) -> Result<Request<Body>, ClientError> {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = self.get_token().await {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        builder
            .header("Content-Type", "application/json")
            .body(Body::empty())
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))
    }

    async fn build_request_with_body<B: serde::Serialize>(
        &self,
        method: http::Method,
        path: &str,
        body: &B,
    ) -> Result<Request<Body>, ClientError> {
        let body_bytes = serde_json::to_vec(body)?;

        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = self.get_token().await {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        builder
            .header("Content-Type", "application/json")
            .body(Body::from(body_bytes))
            .map_err(|e| ClientError::Internal(format!("Failed to build request: {}", e)))
    }

    /// Run the request through the router and read the full body.
    async fn dispatch(&self, request: Request<Body>) -> ClientResult<(http::StatusCode, Vec<u8>)> {
        let router = self.router.read().await.clone();

        let response = router
            .oneshot(request)
            .await
            .map_err(|e| ClientError::Internal(format!("Oneshot call failed: {}", e)))?;

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| ClientError::Internal(format!("Failed to read body: {}", e)))?;

        Ok((status, body_bytes.to_vec()))
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request<Body>) -> ClientResult<T> {
        let (status, body_bytes) = self.dispatch(request).await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body_bytes);
            return Err(error_from_response(status, &text));
        }

        serde_json::from_slice(&body_bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    async fn execute_unit(&self, request: Request<Body>) -> ClientResult<()> {
        let (status, body_bytes) = self.dispatch(request).await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body_bytes);
            return Err(error_from_response(status, &text));
        }

        Ok(())
    }
}

#[async_trait]
impl HttpClient for OneshotHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self.build_request(http::Method::GET, path).await?;
        self.execute(request).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self
            .build_request_with_body(http::Method::PATCH, path, body)
            .await?;
        self.execute(request).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.build_request(http::Method::DELETE, path).await?;
        self.execute_unit(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn token_roundtrip() {
        let client = OneshotHttpClient::new(Router::new());
        assert!(client.get_token().await.is_none());
        client.set_token(Some("abc".into())).await;
        assert_eq!(client.get_token().await.as_deref(), Some("abc"));
    }
}
