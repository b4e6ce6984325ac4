//! reqwest-backed implementation of [`ChatTransport`].

use crate::error::{ChatError, Result};
use crate::traits::ChatTransport;
use crate::transport::config::TransportConfig;
use crate::types::{ChatId, Message, MessageId, PostId, ResolvedSession, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OpenChatRequest {
    seller_id: UserId,
    buyer_id: UserId,
    post_id: PostId,
}

#[derive(Deserialize)]
struct OpenChatResponse {
    chat: ChatRef,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ChatRef {
    id: ChatId,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_id: Option<Uuid>,
}

/// The HTTP chat transport. Stateless beyond the connection pool; safe to
/// clone and share.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: TransportConfig,
    credential: String,
}

impl HttpTransport {
    pub fn new(config: TransportConfig, credential: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| ChatError::Config(e.to_string()))?;

        Ok(HttpTransport {
            http,
            config,
            credential: credential.into(),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Send one request with the session credential attached and map the
    /// response status into the error taxonomy. No retries here.
    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response> {
        tracing::debug!(endpoint, "chat api request");
        let response = builder.bearer_auth(&self.credential).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ChatError::Auth(format!(
                "{} returned {}",
                endpoint,
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn resolve_session(
        &self,
        seller_id: UserId,
        buyer_id: UserId,
        post_id: PostId,
    ) -> Result<ResolvedSession> {
        let body = OpenChatRequest {
            seller_id,
            buyer_id,
            post_id,
        };
        let response = self
            .execute(self.http.post(self.url("open-chat")).json(&body), "open-chat")
            .await?;
        let resolved: OpenChatResponse = response.json().await?;
        Ok(ResolvedSession {
            chat_id: resolved.chat.id,
            history: resolved.messages,
        })
    }

    async fn fetch_history(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        let path = format!("chats/{chat_id}");
        let response = self.execute(self.http.get(self.url(&path)), &path).await?;
        let history: HistoryResponse = response.json().await?;
        Ok(history.messages)
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        body: &str,
        local_id: Option<Uuid>,
    ) -> Result<()> {
        let payload = SendMessageRequest {
            chat_id,
            message: body,
            local_id,
        };
        // Fire-and-forget: the authoritative message arrives on the push
        // channel, so the response body is deliberately ignored.
        self.execute(
            self.http.post(self.url("send-message")).json(&payload),
            "send-message",
        )
        .await?;
        Ok(())
    }

    async fn acknowledge_seen(&self, message_id: MessageId) -> Result<()> {
        let path = format!("messages/{message_id}/seen");
        self.execute(self.http.post(self.url(&path)), &path).await?;
        Ok(())
    }
}
