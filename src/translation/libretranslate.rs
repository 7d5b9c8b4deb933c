//! Primary provider: a LibreTranslate-compatible endpoint.
//!
//! Request: `POST {q, source, target, api_key?}` as JSON. Different
//! deployments name the result field `translatedText`, `result`, or
//! `translation`; all three are accepted.

use super::provider::{enforce_https, excerpt, ProviderError, TranslationProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const PROVIDER: &str = "LibreTranslate";

/// Fields that may carry the translated text, in order of preference
const RESULT_FIELDS: [&str; 3] = ["translatedText", "result", "translation"];

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    code: String,
    name: String,
}

pub struct LibreTranslate {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LibreTranslate {
    pub fn new(
        client: reqwest::Client,
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: enforce_https(endpoint.trim()),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout,
        }
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslate {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            q: text,
            source,
            target,
            api_key: self.api_key.as_deref(),
        };

        if self.api_key.is_some() {
            debug!("Using API key for {} request (key hidden in logs)", PROVIDER);
        }
        debug!("Calling {}: {} ({} -> {})", PROVIDER, self.endpoint, source, target);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
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

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            ProviderError::malformed(PROVIDER, format!("invalid JSON ({}): {}", e, excerpt(&body)))
        })?;

        match extract_translation(&value) {
            Some(translated) => {
                info!("{} translation successful ({} -> {})", PROVIDER, source, target);
                Ok(translated)
            }
            None => Err(ProviderError::malformed(
                PROVIDER,
                format!("no translation in response: {}", excerpt(&body)),
            )),
        }
    }

    async fn languages(&self) -> Option<Vec<(String, String)>> {
        let url = languages_url(&self.endpoint);
        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} language listing failed: {}", PROVIDER, e);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("{} language listing returned {}", PROVIDER, response.status());
            return None;
        }

        match response.json::<Vec<LanguageEntry>>().await {
            Ok(entries) => Some(
                entries
                    .into_iter()
                    .map(|entry| (entry.code, entry.name))
                    .collect(),
            ),
            Err(e) => {
                warn!("{} language listing was not understood: {}", PROVIDER, e);
                None
            }
        }
    }
}

/// Pull the first non-empty translation field out of a response object.
fn extract_translation(value: &Value) -> Option<String> {
    RESULT_FIELDS
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// `.../translate` → `.../languages`
fn languages_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    match trimmed.strip_suffix("/translate") {
        Some(base) => format!("{}/languages", base),
        None => format!("{}/languages", trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::provider::spawn_truncated_server;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider(server: &MockServer, api_key: Option<&str>) -> LibreTranslate {
        LibreTranslate::new(
            reqwest::Client::new(),
            &format!("{}/translate", server.uri()),
            api_key.map(str::to_string),
            Duration::from_millis(500),
        )
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_extract_translation_field_variants() {
        let cases = [
            serde_json::json!({"translatedText": "Hola"}),
            serde_json::json!({"result": "Hola"}),
            serde_json::json!({"translation": "Hola"}),
        ];
        for case in cases {
            assert_eq!(extract_translation(&case).as_deref(), Some("Hola"));
        }
    }

    #[test]
    fn test_extract_translation_skips_empty_field() {
        let value = serde_json::json!({"translatedText": "", "result": "Hola"});
        assert_eq!(extract_translation(&value).as_deref(), Some("Hola"));
    }

    #[test]
    fn test_extract_translation_missing() {
        assert!(extract_translation(&serde_json::json!({"error": "bad"})).is_none());
        assert!(extract_translation(&serde_json::json!({"translatedText": 42})).is_none());
        assert!(extract_translation(&serde_json::json!(["Hola"])).is_none());
    }

    #[test]
    fn test_languages_url() {
        assert_eq!(
            languages_url("https://libretranslate.de/translate"),
            "https://libretranslate.de/languages"
        );
        assert_eq!(
            languages_url("https://lt.example.com/api/"),
            "https://lt.example.com/api/languages"
        );
    }

    #[test]
    fn test_new_drops_blank_api_key() {
        let provider = LibreTranslate::new(
            reqwest::Client::new(),
            "https://lt.example.com/translate",
            Some("  ".to_string()),
            Duration::from_secs(1),
        );
        assert!(provider.api_key.is_none());
    }

    #[test]
    fn test_new_upgrades_insecure_endpoint() {
        let provider = LibreTranslate::new(
            reqwest::Client::new(),
            "http://lt.example.com/translate",
            None,
            Duration::from_secs(1),
        );
        assert_eq!(provider.endpoint, "https://lt.example.com/translate");
    }

    // ==================== HTTP Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success_sends_expected_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({
                "q": "Hello World",
                "source": "en",
                "target": "es",
                "api_key": "secret"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translatedText": "Hola Mundo"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server, Some("secret"))
            .translate("Hello World", "en", "es")
            .await
            .expect("Should succeed");

        assert_eq!(result, "Hola Mundo");
    }

    #[tokio::test]
    async fn test_translate_omits_missing_api_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(serde_json::json!({
                "q": "Hello",
                "source": "en",
                "target": "de"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "Hallo"})),
            )
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server, None)
            .translate("Hello", "en", "de")
            .await
            .expect("Should succeed");

        assert_eq!(result, "Hallo");
    }

    #[tokio::test]
    async fn test_translate_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, None)
            .translate("Hello", "en", "es")
            .await
            .unwrap_err();

        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_translate_rate_limited_with_truncated_body() {
        let base = spawn_truncated_server("429 Too Many Requests").await;
        let provider = LibreTranslate::new(
            reqwest::Client::new(),
            &format!("{}/translate", base),
            None,
            Duration::from_millis(500),
        );

        let err = provider.translate("Hello", "en", "es").await.unwrap_err();

        assert!(err.is_rate_limit(), "expected a rate limit, got {:?}", err);
    }

    #[tokio::test]
    async fn test_translate_server_error_with_truncated_body() {
        let base = spawn_truncated_server("503 Service Unavailable").await;
        let provider = LibreTranslate::new(
            reqwest::Client::new(),
            &format!("{}/translate", base),
            None,
            Duration::from_millis(500),
        );

        let err = provider.translate("Hello", "en", "es").await.unwrap_err();

        assert!(
            matches!(err, ProviderError::Status { status: 503, .. }),
            "expected a 503 status error, got {:?}",
            err
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_translate_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, None)
            .translate("Hello", "en", "es")
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_translate_non_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, None)
            .translate("Hello", "en", "es")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_translate_missing_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error": "Invalid request"})),
            )
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, None)
            .translate("Hello", "en", "es")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse { .. }));
        assert!(err.to_string().contains("no translation"));
    }

    #[tokio::test]
    async fn test_translate_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translatedText": "late"}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let err = provider(&mock_server, None)
            .translate("Hello", "en", "es")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_languages_listing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"code": "en", "name": "English", "targets": ["es"]},
                {"code": "es", "name": "Spanish", "targets": ["en"]}
            ])))
            .mount(&mock_server)
            .await;

        let languages = provider(&mock_server, None)
            .languages()
            .await
            .expect("Should list languages");

        assert_eq!(
            languages,
            vec![
                ("en".to_string(), "English".to_string()),
                ("es".to_string(), "Spanish".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_languages_listing_failure_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/languages"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        assert!(provider(&mock_server, None).languages().await.is_none());
    }
}
