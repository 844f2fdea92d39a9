use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ChatProvider, ChatRequest, LlmError};

/// A provider that returns pre-programmed responses in order, recording
/// every request it received. Used to unit-test the extractor and
/// confidence reviewer without a live LLM call.
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, String>>>,
    received: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_results(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.received.lock().unwrap().push(request.clone());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(msg)) => Err(LlmError::Api(msg)),
            None => Err(LlmError::Api("mock exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    #[tokio::test]
    async fn returns_programmed_responses_in_order() {
        let mock = MockProvider::new(vec!["first".to_string(), "second".to_string()]);
        let req = ChatRequest::new("gpt-4o-mini", vec![Message::user("hi")], 0.0);
        assert_eq!(mock.chat(&req).await.unwrap(), "first");
        assert_eq!(mock.chat(&req).await.unwrap(), "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausted_mock_errors() {
        let mock = MockProvider::new(vec![]);
        let req = ChatRequest::new("gpt-4o-mini", vec![Message::user("hi")], 0.0);
        assert!(mock.chat(&req).await.is_err());
    }
}
