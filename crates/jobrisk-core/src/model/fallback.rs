use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{CallingConvention, ChatTransport, InvocationError, ModelProvider, ModelRequest};

/// Tries each model identifier in order. Every identifier gets the structured
/// convention first and the combined convention only after an interface
/// mismatch. The first reply wins.
pub struct FallbackChain {
    transport: Arc<dyn ChatTransport>,
    models: Vec<String>,
}

impl FallbackChain {
    pub fn new(transport: Arc<dyn ChatTransport>, models: Vec<String>) -> Self {
        Self { transport, models }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[async_trait]
impl ModelProvider for FallbackChain {
    async fn complete(&self, request: ModelRequest) -> anyhow::Result<String> {
        let mut last_error: Option<String> = None;

        for model in &self.models {
            let mut convention = CallingConvention::Structured;
            let mut rejected_shape: Option<String> = None;
            loop {
                debug!(model = %model, convention = convention.as_str(), "calling model");
                match self.transport.chat(model, convention, &request).await {
                    Ok(text) => {
                        info!(
                            model = %model,
                            convention = convention.as_str(),
                            reply_chars = text.chars().count(),
                            "model call succeeded"
                        );
                        return Ok(text);
                    }
                    Err(InvocationError::InterfaceMismatch(reason))
                        if convention == CallingConvention::Structured =>
                    {
                        debug!(
                            model = %model,
                            reason = %reason,
                            "structured call rejected; retrying with combined message"
                        );
                        rejected_shape = Some(reason);
                        convention = CallingConvention::Combined;
                    }
                    Err(error) => {
                        warn!(
                            model = %model,
                            convention = convention.as_str(),
                            error = %error,
                            "model attempt failed"
                        );
                        last_error = Some(match rejected_shape.take() {
                            Some(reason) => {
                                format!("{error} (structured call rejected: {reason})")
                            }
                            None => error.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        Err(anyhow::anyhow!(
            "all model attempts failed; last error: {}",
            last_error.unwrap_or_else(|| "no model identifiers configured".to_owned())
        ))
    }
}
