//! Deterministic provider for tests — no network, pre-programmed replies.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::provider::{Document, GenerativeProvider};

/// What the mock saw for one generate call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub prompt: String,
    pub document_names: Vec<String>,
}

/// Mock provider that returns pre-programmed responses in sequence and
/// records every call for assertions.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a mock that always has this one reply queued first.
    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// Convenience: a mock whose first call fails.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock poisoned").len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        documents: &[Document],
    ) -> Result<String, ProviderError> {
        self.calls.lock().expect("mock lock poisoned").push(RecordedCall {
            prompt: prompt.to_string(),
            document_names: documents.iter().map(|d| d.name.clone()).collect(),
        });
        self.responses
            .lock()
            .expect("mock lock poisoned")
            .pop_front()
            .unwrap_or(Err(ProviderError::InvalidRequest(
                "mock has no response queued".into(),
            )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_sequence_and_records_calls() {
        let mock = MockProvider::new(vec![Ok("first".into()), Ok("second".into())]);

        let docs = vec![Document::text("report.txt", "r")];
        assert_eq!(mock.generate("p1", &docs).await.unwrap(), "first");
        assert_eq!(mock.generate("p2", &[]).await.unwrap(), "second");

        assert_eq!(mock.call_count(), 2);
        let calls = mock.calls();
        assert_eq!(calls[0].prompt, "p1");
        assert_eq!(calls[0].document_names, vec!["report.txt"]);
        assert!(calls[1].document_names.is_empty());
    }

    #[tokio::test]
    async fn exhausted_mock_errors() {
        let mock = MockProvider::replying("only one");
        mock.generate("p", &[]).await.unwrap();
        assert!(mock.generate("p", &[]).await.is_err());
    }

    #[tokio::test]
    async fn failing_mock_surfaces_the_error() {
        let mock = MockProvider::failing(ProviderError::RateLimited);
        assert!(matches!(
            mock.generate("p", &[]).await,
            Err(ProviderError::RateLimited)
        ));
    }
}
