use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::ProviderError;

/// Thin JSON-over-HTTP client shared by all providers.
///
/// The client-level timeout is a backstop; the fallback interpreter applies
/// the per-call bound.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ltc-wallet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self { inner })
    }

    pub async fn get_json(&self, url: &str) -> Result<Value, ProviderError> {
        let response = self
            .inner
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.json::<Value>().await?)
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, ProviderError> {
        let response = self.inner.post(url).json(body).send().await?;
        let response = check_status(response)?;
        Ok(response.json::<Value>().await?)
    }

    pub async fn post_text(&self, url: &str, body: String) -> Result<String, ProviderError> {
        let response = self
            .inner
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.text().await?)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Http {
            status: status.as_u16(),
        });
    }
    Ok(response)
}
