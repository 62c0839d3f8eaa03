use thiserror::Error;

/// A single provider's failure. Routine: absorbed by the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("rejected payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return ProviderError::Transport(format!("request timed out: {value}"));
        }
        match value.status() {
            Some(status) => ProviderError::Http {
                status: status.as_u16(),
            },
            None if value.is_decode() => ProviderError::Decode(value.to_string()),
            None => ProviderError::Transport(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(value: serde_json::Error) -> Self {
        ProviderError::Decode(value.to_string())
    }
}

/// Every provider of one capability failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct AggregatedError {
    pub capability: String,
    /// `(provider name, failure)` in the order the providers were tried.
    pub failures: Vec<(String, ProviderError)>,
}

impl AggregatedError {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, provider: impl Into<String>, error: ProviderError) {
        self.failures.push((provider.into(), error));
    }

    /// `"A: reason; B: reason"`, or a fixed note when no provider was configured.
    pub fn reasons(&self) -> String {
        if self.failures.is_empty() {
            return "no providers configured".to_string();
        }
        self.failures
            .iter()
            .map(|(name, err)| format!("{name}: {err}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl std::fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "all {} providers failed: {}",
            self.capability,
            self.reasons()
        )
    }
}
