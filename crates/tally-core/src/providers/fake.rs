//! Scripted provider for tests and offline smoke runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::LlmClient;
use crate::errors::{ProviderError, ProviderResult};

/// Plays back queued responses in order; once the script is exhausted every
/// call returns a canned consistent verdict. Queued entries may be errors,
/// which makes the failure paths drivable without a network.
pub struct FakeClient {
    script: Mutex<Vec<ProviderResult<String>>>,
    calls: AtomicUsize,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a raw response text.
    pub fn with_response(self, raw: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("fake client script lock")
            .push(Ok(raw.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.script
            .lock()
            .expect("fake client script lock")
            .push(Err(error));
        self
    }

    /// Number of completed calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned() -> String {
        r#"{"is_consistent": true, "justification": "fake provider verdict", "confidence_score": 1.0}"#
            .to_string()
    }
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, _system: &str, _user: &str) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("fake client script lock");
        if script.is_empty() {
            Ok(Self::canned())
        } else {
            script.remove(0)
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
