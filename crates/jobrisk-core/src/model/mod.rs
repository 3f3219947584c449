mod cohere;
mod fallback;

use async_trait::async_trait;
use thiserror::Error;

pub use cohere::CohereTransport;
pub use fallback::FallbackChain;

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl ModelRequest {
    /// Single-string form used by the combined calling convention.
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system_prompt, self.user_prompt)
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// System and user turns sent as separate chat messages.
    Structured,
    /// System and user text joined into one message string.
    Combined,
}

impl CallingConvention {
    pub fn as_str(self) -> &'static str {
        match self {
            CallingConvention::Structured => "structured",
            CallingConvention::Combined => "combined",
        }
    }
}

#[derive(Debug, Error)]
pub enum InvocationError {
    /// The endpoint rejected the shape of the request or answered in a shape
    /// we could not read. Worth retrying under the other convention.
    #[error("calling convention rejected: {0}")]
    InterfaceMismatch(String),

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// One request to one model identifier under one calling convention.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn chat(
        &self,
        model: &str,
        convention: CallingConvention,
        request: &ModelRequest,
    ) -> Result<String, InvocationError>;
}
