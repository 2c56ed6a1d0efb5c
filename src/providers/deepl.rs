use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use super::{http_client, map_request_error, map_status_error, Provider};

/// DeepL client for the v2 translate API
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL (free and pro accounts use different hosts)
    endpoint: String,
}

/// DeepL translate request
#[derive(Debug, Serialize)]
pub struct DeepLRequest {
    /// Texts to translate
    text: Vec<String>,

    /// Target language, upper case (`FR`, `EN-US`)
    target_lang: String,

    /// Source language, detected by DeepL when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

/// A single translated text
#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

impl DeepLRequest {
    pub fn new(text: impl Into<String>, target_language: &str) -> Self {
        Self {
            text: vec![text.into()],
            target_lang: language_utils::deepl_target_code(target_language),
            source_lang: None,
        }
    }

    /// Set the source language; undetermined or unknown codes leave detection to DeepL
    pub fn source_language(mut self, source_language: &str) -> Self {
        self.source_lang = language_utils::source_language_hint(source_language).map(|code| code.to_uppercase());
        self
    }
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: http_client(60),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = http_client(timeout_secs);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Send a translate request
    pub async fn complete(&self, request: &DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        let response = self.client.post(self.url("translate"))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("DeepL API error ({}): {}", status, error_text);
            return Err(map_status_error(status.as_u16(), error_text));
        }

        response.json::<DeepLResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL response: {}", e)))
    }
}

#[async_trait]
impl Provider for DeepL {
    fn name(&self) -> &str {
        "deepl"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let mut request = DeepLRequest::new(text, target_language);
        if let Some(source) = source_language {
            request = request.source_language(source);
        }

        let response = self.complete(&request).await?;
        response.translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or_else(|| ProviderError::ParseError("DeepL returned no translations".to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self.client.get(self.url("usage"))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(map_status_error(status.as_u16(), message))
        }
    }
}
