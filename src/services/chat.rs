//! Course chat

use std::sync::Arc;

use reqwest::Method;

use super::models::{Conversation, Message, NewMessage};
use super::path_segment;
use crate::http::{ApiClient, ApiError, Empty, RequestOptions};

#[derive(Clone)]
pub struct ChatService {
    client: Arc<ApiClient>,
}

impl ChatService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Conversations the student takes part in
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        self.client.get("/chat/conversations").await
    }

    /// Messages of one conversation
    pub async fn messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let path = format!("/chat/conversations/{}/messages", path_segment(conversation_id)?);
        self.client.get(&path).await
    }

    /// Posts a message; blank text is rejected without a request
    pub async fn send_message(&self, conversation_id: &str, text: &str) -> Result<Message, ApiError> {
        let body = text.trim();
        if body.is_empty() {
            return Err(ApiError::unknown("Message text cannot be empty"));
        }
        let path = format!("/chat/conversations/{}/messages", path_segment(conversation_id)?);
        self.client
            .post(
                &path,
                &NewMessage {
                    body: body.to_string(),
                },
            )
            .await
    }

    /// Marks every message in the conversation as read
    pub async fn mark_read(&self, conversation_id: &str) -> Result<Empty, ApiError> {
        let path = format!("/chat/conversations/{}/read", path_segment(conversation_id)?);
        self.client
            .request::<Empty, ()>(Method::POST, &path, None, RequestOptions::default())
            .await
    }
}
