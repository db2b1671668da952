//! The generation collaborator boundary.
//!
//! Everything that asks a model for text goes through `GenerationCollaborator`,
//! so pipelines can be exercised against scripted implementations in tests.
//! The production implementation is `LlmClient`.

use async_trait::async_trait;
use thiserror::Error;

use crate::llm_client::LlmError;

/// One prompt whose reply must be a single JSON object.
#[derive(Debug, Clone)]
pub struct CollaboratorRequest {
    pub system: String,
    pub prompt: String,
}

impl CollaboratorRequest {
    pub fn json(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait GenerationCollaborator: Send + Sync {
    /// One completion, no retries beyond what the implementation does
    /// internally for transport errors.
    async fn complete(&self, request: CollaboratorRequest) -> Result<String, CollaboratorError>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted collaborators for pipeline tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    /// Replies from a queue, optionally after a per-reply delay, and records
    /// every request it saw.
    #[derive(Default)]
    pub struct ScriptedCollaborator {
        replies: Mutex<VecDeque<(Duration, Result<String, String>)>>,
        pub requests: Mutex<Vec<CollaboratorRequest>>,
    }

    impl ScriptedCollaborator {
        pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
            let script = Self::default();
            for reply in replies {
                script.push(Duration::ZERO, Ok(reply.to_string()));
            }
            script
        }

        pub fn push(&self, delay: Duration, reply: Result<String, String>) {
            self.replies.lock().unwrap().push_back((delay, reply));
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.requests
                .lock()
                .unwrap()
                .last()
                .map(|r| r.prompt.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl GenerationCollaborator for ScriptedCollaborator {
        async fn complete(&self, request: CollaboratorRequest) -> Result<String, CollaboratorError> {
            self.requests.lock().unwrap().push(request);
            let next = self.replies.lock().unwrap().pop_front();
            let Some((delay, reply)) = next else {
                return Err(CollaboratorError::Unavailable("script exhausted".to_string()));
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            reply.map_err(CollaboratorError::Unavailable)
        }
    }
}
