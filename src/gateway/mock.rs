//! Scripted gateway for handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, GatewayError, ModelGateway, Prompt};

enum Reply {
    Text(String),
    Fail(String),
}

pub struct MockGateway {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl MockGateway {
    /// Answers every call with `text` as a single segment.
    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Text(text.to_string()))
    }

    /// Fails every call with a network error.
    pub fn failing(message: &str) -> Self {
        Self::with(Reply::Fail(message.to_string()))
    }

    fn with(reply: Reply) -> Self {
        MockGateway {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn complete(&self, prompt: Prompt) -> Result<Completion, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt);
        match &self.reply {
            Reply::Text(text) => Ok(Completion {
                segments: vec![text.clone()],
            }),
            Reply::Fail(message) => Err(GatewayError::Network(message.clone())),
        }
    }
}
