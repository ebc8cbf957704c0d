//! One-shot generation calls: chat titles, devotionals, study enrichment.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::client::{ApiError, GeminiClient};
use crate::api::schema::{devotional_schema, enrichment_schema, validate};
use crate::api::{title_safety_settings, GenerateContentRequest, GenerationConfig};
use crate::core::constants::{devotional_prompt, enrichment_prompt, title_prompt};
use crate::core::devotional::DevotionalContent;
use crate::core::study::Enrichment;
use crate::core::text::clean_title;

#[derive(Debug)]
pub enum GenerationError {
    Api(ApiError),
    InvalidDevotional,
    InvalidEnrichment,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Api(err) => write!(f, "{err}"),
            GenerationError::InvalidDevotional => write!(f, "Invalid devotional format."),
            GenerationError::InvalidEnrichment => write!(f, "Invalid enrichment data."),
        }
    }
}

impl StdError for GenerationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            GenerationError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for GenerationError {
    fn from(err: ApiError) -> Self {
        GenerationError::Api(err)
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    /// A short cleaned title for a conversation's first message. May be empty.
    async fn generate_title(&self, first_message: &str, language: &str)
        -> Result<String, GenerationError>;

    async fn generate_devotional(
        &self,
        language: &str,
        seed: &str,
    ) -> Result<DevotionalContent, GenerationError>;

    async fn enrich(
        &self,
        content: &str,
        bible_version: &str,
        language: &str,
    ) -> Result<Enrichment, GenerationError>;
}

/// Parse model output as JSON, check it against a Gemini schema and
/// deserialize it.
pub fn parse_structured<T: DeserializeOwned>(text: &str, schema: &Value) -> Result<T, String> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|err| err.to_string())?;
    validate(schema, &value)?;
    serde_json::from_value(value).map_err(|err| err.to_string())
}

pub struct GeminiGenerator {
    client: GeminiClient,
}

impl GeminiGenerator {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    async fn structured<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: Value,
    ) -> Result<T, String> {
        let request = GenerateContentRequest::prompt(prompt)
            .with_generation_config(GenerationConfig::json(schema.clone()));
        let text = self
            .client
            .generate_text(&request)
            .await
            .map_err(|err| err.to_string())?;
        parse_structured(&text, &schema)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate_title(
        &self,
        first_message: &str,
        language: &str,
    ) -> Result<String, GenerationError> {
        let request = GenerateContentRequest::prompt(title_prompt(first_message, language))
            .with_safety_settings(title_safety_settings())
            .with_generation_config(GenerationConfig::without_thinking());
        let raw = self.client.generate_text(&request).await?;
        debug!(raw = %raw, "title generated");
        Ok(clean_title(&raw))
    }

    async fn generate_devotional(
        &self,
        language: &str,
        seed: &str,
    ) -> Result<DevotionalContent, GenerationError> {
        self.structured(devotional_prompt(language, seed), devotional_schema())
            .await
            .map_err(|cause| {
                error!("failed to parse devotional JSON: {cause}");
                GenerationError::InvalidDevotional
            })
    }

    async fn enrich(
        &self,
        content: &str,
        bible_version: &str,
        language: &str,
    ) -> Result<Enrichment, GenerationError> {
        self.structured(
            enrichment_prompt(content, bible_version, language),
            enrichment_schema(),
        )
        .await
        .map_err(|cause| {
            error!("failed to parse study item enrichment JSON: {cause}");
            GenerationError::InvalidEnrichment
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_devotional_parses_after_validation() {
        let text = r#"
            {"reading":{"reference":"Isaiah 40:31","text":"They shall mount up with wings as eagles."},
             "reflection":"Waiting renews strength.","prayer":"Lord, renew me."}
        "#;
        let parsed: DevotionalContent =
            parse_structured(text, &devotional_schema()).expect("valid devotional");
        assert_eq!(parsed.reading.reference, "Isaiah 40:31");
        assert_eq!(parsed.prayer, "Lord, renew me.");
    }

    #[test]
    fn structured_output_rejects_non_json() {
        let result = parse_structured::<Enrichment>("Sure! Here you go.", &enrichment_schema());
        assert!(result.is_err());
    }

    #[test]
    fn structured_output_rejects_schema_violations() {
        let text = r#"{"keywords":"hope","aiReflection":"x","crossReferences":[]}"#;
        assert!(parse_structured::<Enrichment>(text, &enrichment_schema()).is_err());
    }

    #[test]
    fn errors_display_user_facing_messages() {
        assert_eq!(
            GenerationError::InvalidDevotional.to_string(),
            "Invalid devotional format."
        );
        assert_eq!(
            GenerationError::InvalidEnrichment.to_string(),
            "Invalid enrichment data."
        );
    }
}
