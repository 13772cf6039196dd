use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{Map, Value};
use tracing::debug;

use super::IntegrationApi;
use crate::config::ClientConfig;
use crate::error::RemoteOperationError;
use crate::model::IntegrationPayload;

/// Header carrying the human-readable reason recorded in the server's audit log.
pub const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";

/// HTTP implementation of [`IntegrationApi`].
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, RemoteOperationError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.api.user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: config.auth.token.clone(),
        })
    }

    fn integrations_url(&self, server_id: &str) -> String {
        format!("{}/guilds/{}/integrations", self.base_url, server_id)
    }

    fn integration_url(&self, server_id: &str, integration_id: &str) -> String {
        format!("{}/{}", self.integrations_url(server_id), integration_id)
    }

    fn request(&self, method: Method, url: &str, reason: Option<&str>) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.token));
        if let Some(reason) = reason {
            req = req.header(AUDIT_LOG_REASON_HEADER, urlencoding::encode(reason).into_owned());
        }
        req
    }

    /// Send a request and turn any non-2xx status into [`RemoteOperationError::Status`].
    async fn send(&self, req: RequestBuilder) -> Result<Response, RemoteOperationError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!(%status, body = %body, "integration API call failed");
            return Err(RemoteOperationError::Status { status, body });
        }
        debug!(%status, "integration API call succeeded");
        Ok(resp)
    }
}

#[async_trait]
impl IntegrationApi for RestClient {
    async fn list_integrations(
        &self,
        server_id: &str,
    ) -> Result<Vec<IntegrationPayload>, RemoteOperationError> {
        let url = self.integrations_url(server_id);
        let resp = self.send(self.request(Method::GET, &url, None)).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn sync_integration(
        &self,
        server_id: &str,
        integration_id: &str,
    ) -> Result<(), RemoteOperationError> {
        let url = format!("{}/sync", self.integration_url(server_id, integration_id));
        self.send(self.request(Method::POST, &url, None)).await?;
        Ok(())
    }

    async fn edit_integration(
        &self,
        server_id: &str,
        integration_id: &str,
        body: &Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<(), RemoteOperationError> {
        let url = self.integration_url(server_id, integration_id);
        self.send(self.request(Method::PATCH, &url, reason).json(body))
            .await?;
        Ok(())
    }

    async fn delete_integration(
        &self,
        server_id: &str,
        integration_id: &str,
        reason: Option<&str>,
    ) -> Result<(), RemoteOperationError> {
        let url = self.integration_url(server_id, integration_id);
        self.send(self.request(Method::DELETE, &url, reason)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RestClient {
        let mut config = ClientConfig::default();
        config.api.base_url = format!("{}/", server.uri());
        config.auth.token = "secret".into();
        RestClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_integrations_decodes_payloads() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/guilds/1/integrations"))
            .and(header("Authorization", "Bot secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "77",
                "name": "streamer",
                "type": "twitch",
                "enabled": true,
                "account": { "id": "acc", "name": "Streamer" },
                "expire_behavior": 0,
                "expire_grace_period": 3
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let listed = client_for(&mock_server).list_integrations("1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "77");
        assert_eq!(listed[0].kind, "twitch");
    }

    #[tokio::test]
    async fn test_sync_posts_without_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/guilds/1/integrations/77/sync"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .sync_integration("1", "77")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_edit_sends_body_and_encoded_reason() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/guilds/1/integrations/77"))
            .and(header(AUDIT_LOG_REASON_HEADER, "longer%20grace%20period"))
            .and(body_json(json!({ "expire_grace_period": 7 })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut body = Map::new();
        body.insert("expire_grace_period".into(), json!(7));
        client_for(&mock_server)
            .edit_integration("1", "77", &body, Some("longer grace period"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_failure_surfaces_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/guilds/1/integrations/77"))
            .and(header_exists(AUDIT_LOG_REASON_HEADER))
            .respond_with(ResponseTemplate::new(404).set_body_string("Unknown Integration"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .delete_integration("1", "77", Some("cleanup"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Unknown Integration"));
    }

    #[tokio::test]
    async fn test_malformed_listing_is_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/guilds/1/integrations"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .list_integrations("1")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteOperationError::Decode(_)));
    }
}
