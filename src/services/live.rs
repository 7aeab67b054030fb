//! Live classes: discovery, join/leave and in-class signals

use std::sync::Arc;

use reqwest::Method;

use super::models::{JoinTicket, LiveSession, LiveSignal};
use super::path_segment;
use crate::http::{ApiClient, ApiError, Empty, RequestOptions};

#[derive(Clone)]
pub struct LiveClassService {
    client: Arc<ApiClient>,
}

impl LiveClassService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Live classes currently running for the student's courses
    pub async fn active_sessions(&self) -> Result<Vec<LiveSession>, ApiError> {
        self.client.get("/live/sessions").await
    }

    /// Joins a live class
    pub async fn join(&self, session_id: &str) -> Result<JoinTicket, ApiError> {
        let path = format!("/live/sessions/{}/join", path_segment(session_id)?);
        tracing::info!("Joining live session {}", session_id);
        self.client
            .request::<JoinTicket, ()>(Method::POST, &path, None, RequestOptions::default())
            .await
    }

    /// Raises or lowers a hand, or sends a reaction
    pub async fn send_signal(&self, session_id: &str, signal: &LiveSignal) -> Result<Empty, ApiError> {
        let path = format!("/live/sessions/{}/signals", path_segment(session_id)?);
        tracing::debug!("Sending {} to live session {}", signal.kind(), session_id);
        self.client.post(&path, signal).await
    }

    pub async fn leave(&self, session_id: &str) -> Result<Empty, ApiError> {
        let path = format!("/live/sessions/{}/leave", path_segment(session_id)?);
        tracing::info!("Leaving live session {}", session_id);
        self.client
            .request::<Empty, ()>(Method::POST, &path, None, RequestOptions::default())
            .await
    }
}
