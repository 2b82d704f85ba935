pub mod gemini;

pub use gemini::{extract_text, GeminiClient};

use async_trait::async_trait;

use crate::error::RemoteError;

/// One prompt in, one block of text out. Every call is independent: no
/// conversation state lives on the remote side.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records the prompts it saw
    pub struct MockGenerator {
        outcomes: Vec<Result<String, RemoteError>>,
        calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockGenerator {
        pub fn new(outcomes: Vec<Result<String, RemoteError>>) -> Self {
            Self {
                outcomes,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes.get(idx).cloned().unwrap_or_else(|| {
                Err(RemoteError::UnexpectedResponseShape("no more mock outcomes".to_string()))
            })
        }
    }
}
