//! Reqwest-backed [`AssistantThread`] adapter.
//!
//! Posts user messages to `{endpoint}/threads/{thread_id}/messages` with an
//! optional bearer key. Only transport concerns live here: URL building,
//! timeout, status mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::ThreadId;
use crate::domain::ports::{AssistantThread, AssistantThreadError};

const USER_AGENT: &str = concat!("quillboard/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct MessageBody<'a> {
    role: &'static str,
    content: [TextPart<'a>; 1],
}

#[derive(Serialize)]
struct TextPart<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Assistant thread adapter for one HTTP endpoint.
pub struct HttpAssistantThread {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpAssistantThread {
    /// Adapter with a per-request `timeout`.
    ///
    /// # Errors
    /// When the reqwest client cannot be built.
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn messages_url(&self, thread: &ThreadId) -> Result<Url, AssistantThreadError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AssistantThreadError::transport(format!(
                    "assistant endpoint {} cannot carry a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(["threads", thread.as_ref(), "messages"]);
        Ok(url)
    }
}

#[async_trait]
impl AssistantThread for HttpAssistantThread {
    async fn send_message(
        &self,
        thread: &ThreadId,
        text: &str,
    ) -> Result<(), AssistantThreadError> {
        let mut request = self
            .client
            .post(self.messages_url(thread)?)
            .json(&MessageBody {
                role: "user",
                content: [TextPart { kind: "text", text }],
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> AssistantThreadError {
    if error.is_timeout() {
        AssistantThreadError::transport(format!("timed out: {error}"))
    } else {
        AssistantThreadError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> AssistantThreadError {
    AssistantThreadError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > LIMIT {
        format!("{}...", compact.chars().take(LIMIT).collect::<String>())
    } else {
        compact
    }
}
