//! Remote model gateway.
//!
//! Handlers talk to the model through [`ModelGateway`] so tests can swap in a
//! scripted implementation. [`GatewayHandle`] carries the "not configured"
//! state explicitly instead of an optional global client.

pub mod bedrock;
#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::models::MediaType;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway not configured: {0}")]
    Unavailable(String),

    #[error("request to model failed: {0}")]
    Network(String),

    #[error("model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("could not decode model response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

/// One user turn: instructions plus an optional image.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub instructions: String,
    pub image: Option<ImageAttachment>,
}

impl Prompt {
    pub fn text(instructions: String) -> Self {
        Prompt {
            instructions,
            image: None,
        }
    }

    pub fn with_image(instructions: String, image: ImageAttachment) -> Self {
        Prompt {
            instructions,
            image: Some(image),
        }
    }
}

/// Text segments of a completion, in the order the model returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub segments: Vec<String>,
}

impl Completion {
    pub fn text(&self) -> String {
        self.segments.join("\n").trim().to_string()
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, prompt: Prompt) -> Result<Completion, GatewayError>;
}

#[derive(Clone)]
pub enum GatewayHandle {
    Available(Arc<dyn ModelGateway>),
    /// Permanent for the life of the process; the string says why.
    Unavailable(String),
}

impl GatewayHandle {
    pub fn from_config(config: &Config) -> Self {
        let Some(token) = config.bedrock_token.as_deref() else {
            tracing::warn!(
                "{} is not set; OCR and quiz endpoints will answer 503",
                crate::config::TOKEN_VAR
            );
            return GatewayHandle::Unavailable(format!("{} not set", crate::config::TOKEN_VAR));
        };

        match bedrock::BedrockGateway::new(token) {
            Ok(gateway) => {
                tracing::info!(
                    region = bedrock::REGION,
                    model = bedrock::MODEL_ID,
                    "Bedrock gateway initialized"
                );
                GatewayHandle::Available(Arc::new(gateway))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize Bedrock gateway");
                GatewayHandle::Unavailable(e.to_string())
            }
        }
    }

    pub fn get(&self) -> Result<&Arc<dyn ModelGateway>, GatewayError> {
        match self {
            GatewayHandle::Available(gateway) => Ok(gateway),
            GatewayHandle::Unavailable(reason) => Err(GatewayError::Unavailable(reason.clone())),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, GatewayHandle::Available(_))
    }
}
