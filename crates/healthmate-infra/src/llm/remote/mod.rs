//! Remote backend: an OpenAI-compatible text completions server.
//!
//! Works with vLLM, llama.cpp's server, TGI and similar. "Loading" checks
//! the endpoint answers `GET {base_url}/models`; every generation is a
//! single non-streaming `POST {base_url}/completions`.
//!
//! The optional API key is wrapped in [`SecretString`] and only exposed
//! when building the `Authorization` header.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use healthmate_core::llm::box_generator::BoxTextGenerator;
use healthmate_core::llm::generator::TextGenerator;
use healthmate_core::llm::provider::ModelLoader;
use healthmate_types::error::{GenerationError, LoadError};
use healthmate_types::llm::{GenerationConfig, GenerationResult};

use self::types::{CompletionRequest, CompletionResponse, ErrorResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Connects to a completions server.
#[derive(Debug, Clone)]
pub struct RemoteModelLoader {
    base_url: String,
    model: String,
    api_key_env: Option<String>,
}

impl RemoteModelLoader {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key_env: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key_env,
        }
    }

    fn api_key(&self) -> Result<Option<SecretString>, LoadError> {
        let Some(var) = &self.api_key_env else {
            return Ok(None);
        };
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(SecretString::from(key))),
            _ => Err(LoadError::Backend(format!(
                "API key environment variable {var} is not set"
            ))),
        }
    }
}

impl ModelLoader for RemoteModelLoader {
    fn describe(&self) -> String {
        format!("remote:{} ({})", self.base_url, self.model)
    }

    async fn load(&self) -> Result<BoxTextGenerator, LoadError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| LoadError::InvalidConfig(format!("invalid base_url {}: {e}", self.base_url)))?;
        let api_key = self.api_key()?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LoadError::Backend(e.to_string()))?;

        let generator = RemoteGenerator {
            client,
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        };
        generator.check_endpoint().await?;

        Ok(BoxTextGenerator::new(generator))
    }
}

/// [`TextGenerator`] backed by `POST /completions`.
pub struct RemoteGenerator {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl RemoteGenerator {
    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    async fn check_endpoint(&self) -> Result<(), LoadError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .timeout(CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| LoadError::Backend(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Backend(format!("{url} returned {status}")));
        }
        tracing::debug!(url = %url, "Completions endpoint reachable");
        Ok(())
    }
}

impl TextGenerator for RemoteGenerator {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult, GenerationError> {
        let url = format!("{}/completions", self.base_url);
        let body = CompletionRequest::new(&self.model, prompt, config);

        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Backend {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(GenerationError::Backend {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed: CompletionResponse =
            response.json().await.map_err(|e| GenerationError::Decode(e.to_string()))?;
        let continuation = parsed.first_text().ok_or_else(|| GenerationError::Backend {
            status: Some(status.as_u16()),
            message: "response contained no choices".to_string(),
        })?;

        Ok(GenerationResult {
            generated_text: format!("{prompt}{continuation}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const PROMPT: &str = "<|user|>\nHello</s>\n<|assistant|>\n";

    fn generator(server: &MockServer, api_key: Option<&str>) -> RemoteGenerator {
        RemoteGenerator {
            client: reqwest::Client::new(),
            api_key: api_key.map(|key| SecretString::from(key.to_string())),
            base_url: server.uri(),
            model: "tinyllama".to_string(),
        }
    }

    /// Fail any request that carries an `Authorization` header.
    async fn reject_auth_header(server: &MockServer) {
        Mock::given(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(401))
            .expect(0)
            .mount(server)
            .await;
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let loader = RemoteModelLoader::new("http://localhost:8080/v1/", "tinyllama", None);
        assert_eq!(loader.describe(), "remote:http://localhost:8080/v1 (tinyllama)");
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let loader = RemoteModelLoader::new("not a url", "tinyllama", None);
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_env() {
        let loader = RemoteModelLoader::new(
            "http://127.0.0.1:8080/v1",
            "tinyllama",
            Some("HEALTHMATE_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
        );
        let err = loader.load().await.unwrap_err();
        match err {
            LoadError::Backend(msg) => assert!(msg.contains("HEALTHMATE_TEST_KEY_THAT_IS_NEVER_SET")),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Port 1 is reserved and refuses connections.
        let loader = RemoteModelLoader::new("http://127.0.0.1:1/v1", "tinyllama", None);
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Backend(_)));
    }

    #[tokio::test]
    async fn test_load_checks_models_endpoint() {
        let server = MockServer::start().await;
        reject_auth_header(&server).await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let loader = RemoteModelLoader::new(server.uri(), "tinyllama", None);
        let generator = loader.load().await.unwrap();
        assert_eq!(generator.name(), "remote");
    }

    #[tokio::test]
    async fn test_models_check_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        match generator(&server, None).check_endpoint().await {
            Err(LoadError::Backend(msg)) => assert!(msg.contains("503"), "{msg}"),
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_models_check_sends_bearer_when_key_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .and(header("authorization", "Bearer sk-local-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;

        generator(&server, Some("sk-local-test")).check_endpoint().await.unwrap();
    }

    #[tokio::test]
    async fn test_generate_echoes_prompt() {
        let server = MockServer::start().await;
        reject_auth_header(&server).await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .and(body_partial_json(json!({
                "model": "tinyllama",
                "prompt": PROMPT,
                "max_tokens": 250,
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "text": "Drink plenty of fluids.", "finish_reason": "stop" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = generator(&server, None)
            .generate(PROMPT, &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(result.generated_text, format!("{PROMPT}Drink plenty of fluids."));
    }

    #[tokio::test]
    async fn test_generate_error_status_uses_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "rate limit reached" }
            })))
            .mount(&server)
            .await;

        let err = generator(&server, None)
            .generate(PROMPT, &GenerationConfig::default())
            .await
            .unwrap_err();
        match err {
            GenerationError::Backend { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "rate limit reached");
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_error_status_with_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream crashed"))
            .mount(&server)
            .await;

        let err = generator(&server, None)
            .generate(PROMPT, &GenerationConfig::default())
            .await
            .unwrap_err();
        match err {
            GenerationError::Backend { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "upstream crashed");
            }
            other => panic!("expected Backend, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let err = generator(&server, None)
            .generate(PROMPT, &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Backend { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn test_generate_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = generator(&server, None)
            .generate(PROMPT, &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }
}
