//! Fallback provider: the MyMemory public API (no key required).
//!
//! Request: `GET ?q=<text>&langpair=<src>|<tgt>`. The HTTP status is usually
//! 200 even on failure; the real outcome is the `responseStatus` field of the
//! envelope, which MyMemory sends either as a number or as a numeric string.

use super::provider::{enforce_https, excerpt, ProviderError, TranslationProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "MyMemory";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default)]
    response_status: Value,
    #[serde(default)]
    response_details: Option<String>,
    #[serde(default)]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    translated_text: Option<String>,
}

pub struct MyMemory {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl MyMemory {
    pub fn new(client: reqwest::Client, endpoint: &str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: enforce_https(endpoint.trim()),
            timeout,
        }
    }
}

#[async_trait]
impl TranslationProvider for MyMemory {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let langpair = format!("{}|{}", source, target);
        debug!("Calling {} fallback: langpair={}", PROVIDER, langpair);

        let response = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.timeout, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(PROVIDER, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.timeout, e))?;

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            ProviderError::malformed(PROVIDER, format!("invalid JSON ({}): {}", e, excerpt(&body)))
        })?;

        match response_status(&envelope.response_status) {
            Some(200) => {}
            Some(429) => return Err(ProviderError::RateLimited { provider: PROVIDER }),
            Some(code) => {
                return Err(ProviderError::Status {
                    provider: PROVIDER,
                    status: code,
                    body: excerpt(envelope.response_details.as_deref().unwrap_or_default()),
                })
            }
            None => {
                return Err(ProviderError::malformed(
                    PROVIDER,
                    format!("missing responseStatus: {}", excerpt(&body)),
                ))
            }
        }

        let translated = envelope
            .response_data
            .and_then(|data| data.translated_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::malformed(PROVIDER, "no translatedText in responseData"))?;

        if translated == text {
            info!("{} returned the original text (no translation found)", PROVIDER);
        } else {
            info!("{} translation succeeded ({})", PROVIDER, langpair);
        }
        Ok(translated)
    }
}

/// `200` and `"200"` both count as a status code.
fn response_status(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
