//! Anthropic Messages API served through Amazon Bedrock, authenticated with a
//! Bedrock API key sent as a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Completion, GatewayError, ModelGateway, Prompt};

pub const REGION: &str = "us-west-2";
pub const MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const MAX_TOKENS: u32 = 4096;
const USER_AGENT: &str = "ocr-quiz-relay/0.1";

pub struct BedrockGateway {
    client: reqwest::Client,
    invoke_url: Url,
}

impl BedrockGateway {
    pub fn new(token: &str) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            GatewayError::Unavailable("bearer token is not a valid header value".to_string())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        Ok(BedrockGateway {
            client,
            invoke_url: invoke_url(REGION, MODEL_ID)?,
        })
    }
}

/// `https://bedrock-runtime.<region>.amazonaws.com/model/<model-id>/invoke`,
/// with the `:` in versioned model ids percent-encoded.
fn invoke_url(region: &str, model_id: &str) -> Result<Url, GatewayError> {
    let raw = format!(
        "https://bedrock-runtime.{region}.amazonaws.com/model/{}/invoke",
        model_id.replace(':', "%3A")
    );
    Url::parse(&raw)
        .map_err(|e| GatewayError::Unavailable(format!("invalid endpoint {raw}: {e}")))
}

#[async_trait]
impl ModelGateway for BedrockGateway {
    async fn complete(&self, prompt: Prompt) -> Result<Completion, GatewayError> {
        let has_image = prompt.image.is_some();
        let body = MessagesRequest::from_prompt(&prompt);

        tracing::info!(
            model = MODEL_ID,
            has_image,
            media_type = prompt.image.as_ref().map(|i| i.media_type.as_mime()),
            "sending request to Bedrock"
        );

        let response = self
            .client
            .post(self.invoke_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Network(format!("TimeoutError: {e}"))
                } else if e.is_connect() {
                    GatewayError::Network(format!("ConnectError: {e}"))
                } else {
                    GatewayError::Network(format!("RequestError: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        tracing::info!(stop_reason = ?payload.stop_reason, "Bedrock response received");
        Ok(payload.into_completion())
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentBlock<'a> {
    Text { text: &'a str },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: String,
}

impl<'a> MessagesRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        let mut content = vec![ContentBlock::Text {
            text: &prompt.instructions,
        }];
        if let Some(image) = &prompt.image {
            content.push(ContentBlock::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type: image.media_type.as_mime(),
                    data: BASE64.encode(&image.bytes),
                },
            });
        }

        MessagesRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn into_completion(self) -> Completion {
        let segments = self
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.unwrap_or_default())
            .collect();
        Completion { segments }
    }
}
