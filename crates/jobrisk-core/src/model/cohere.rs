use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CallingConvention, ChatTransport, InvocationError, ModelRequest};

#[derive(Debug, Clone)]
pub struct CohereTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CohereTransport {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn chat_structured(
        &self,
        model: &str,
        request: &ModelRequest,
    ) -> Result<String, InvocationError> {
        let payload = StructuredChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
        };

        let body = self
            .post(&format!("{}/v2/chat", self.base_url), &payload)
            .await?;
        let response = serde_json::from_value::<StructuredChatResponse>(body)
            .map_err(|error| InvocationError::InterfaceMismatch(error.to_string()))?;

        extract_message_content(&response.message.content).ok_or_else(|| {
            InvocationError::InterfaceMismatch("structured reply carried no text".to_owned())
        })
    }

    async fn chat_combined(
        &self,
        model: &str,
        request: &ModelRequest,
    ) -> Result<String, InvocationError> {
        let message = request.combined();
        let payload = CombinedChatRequest {
            model,
            message: &message,
        };

        let body = self
            .post(&format!("{}/v1/chat", self.base_url), &payload)
            .await?;
        let response = serde_json::from_value::<CombinedChatResponse>(body)
            .map_err(|error| InvocationError::InterfaceMismatch(error.to_string()))?;

        extract_message_content(&response.text).ok_or_else(|| {
            InvocationError::InterfaceMismatch("combined reply carried no text".to_owned())
        })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<Value, InvocationError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = format!("{url} returned {status}: {}", truncate(&detail, 300));
            return Err(if is_interface_mismatch(status) {
                InvocationError::InterfaceMismatch(message)
            } else {
                InvocationError::Failed(anyhow::anyhow!(message))
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| InvocationError::InterfaceMismatch(error.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct StructuredChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct StructuredChatResponse {
    message: StructuredChatMessage,
}

#[derive(Debug, Deserialize)]
struct StructuredChatMessage {
    content: Value,
}

#[derive(Debug, Serialize)]
struct CombinedChatRequest<'a> {
    model: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct CombinedChatResponse {
    text: Value,
}

#[async_trait]
impl ChatTransport for CohereTransport {
    async fn chat(
        &self,
        model: &str,
        convention: CallingConvention,
        request: &ModelRequest,
    ) -> Result<String, InvocationError> {
        match convention {
            CallingConvention::Structured => self.chat_structured(model, request).await,
            CallingConvention::Combined => self.chat_combined(model, request).await,
        }
    }
}

fn is_interface_mismatch(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NOT_FOUND
            | StatusCode::METHOD_NOT_ALLOWED
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY
    )
}

fn extract_message_content(content: &Value) -> Option<String> {
    if let Some(text) = content.as_str() {
        return Some(text.to_owned());
    }

    let array = content.as_array()?;
    let joined = array
        .iter()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("");

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn truncate(input: &str, max_chars: usize) -> String {
    let mut result = input.chars().take(max_chars).collect::<String>();
    if input.chars().count() > max_chars {
        result.push_str("...");
    }
    result
}
