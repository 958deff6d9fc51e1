//! HTTP transport - network communication

use crate::config::ClientConfig;
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Error body the marketplace returns on non-2xx responses.
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Map a non-2xx response to a `ClientError`.
///
/// The marketplace reports failures as `{"message": "..."}`; when the body
/// carries something else the raw text (or the status reason) stands in.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                trimmed.to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(message)
        }
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// HTTP transport trait
///
/// The verbs the marketplace surface needs: JSON GET, JSON PATCH, and a
/// body-less DELETE (the server answers 204).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T>;
    async fn patch<T: DeserializeOwned, B: serde::Serialize + std::marker::Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete(&self, path: &str) -> ClientResult<()>;
}

/// Network HTTP transport
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Attach the auth header and a fresh request id for correlation.
    fn decorate(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req.header("x-request-id", Uuid::new_v4().to_string())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(error_from_response(status, &text));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.decorate(self.client.get(&url));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize + std::marker::Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.decorate(self.client.patch(&url).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let url = format!("{}{}", self.base_url, path);
        let req = self.decorate(self.client.delete(&url));
        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(error_from_response(status, &text));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_parses_message_body() {
        let err = error_from_response(StatusCode::NOT_FOUND, r#"{"message":"Application not found"}"#);
        match err {
            ClientError::NotFound(msg) => assert_eq!(msg, "Application not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_mapping_falls_back_to_status_reason() {
        let err = error_from_response(StatusCode::INTERNAL_SERVER_ERROR, "");
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_request_maps_to_validation() {
        let err = error_from_response(StatusCode::BAD_REQUEST, r#"{"message":"workflowStatus is required"}"#);
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
