//! Gemini-based SRT translation using the Generative AI API.

use crate::error::Result;
use crate::gemini::{GeminiClient, GenerateContentRequest, GenerationConfig, SafetySetting};
use crate::translate::{Translation, Translator};
use async_trait::async_trait;
use tracing::debug;

pub const DEFAULT_MODEL: &str = crate::config::DEFAULT_TRANSLATE_MODEL;

/// Low temperature keeps the output close to a pure data transformation.
const TEMPERATURE: f32 = 0.2;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Translator using Google Gemini API.
pub struct GeminiTranslator {
    client: GeminiClient,
    model: String,
    source_language: String,
}

impl GeminiTranslator {
    /// Create a new Gemini translator with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_client(GeminiClient::new(api_key))
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            source_language: "Chinese".to_string(),
        }
    }

    /// Set a different model (e.g., "gemini-2.0-flash").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Language the source transcripts are written in.
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the translation prompt.
    fn build_prompt(&self, transcript: &str, target_language: &str) -> String {
        let source_language = &self.source_language;
        format!(
            r#"Your task is to act as an automated SRT file translation service.
You will be provided with an SRT transcript in {source_language}. You must translate the text content into {target_language}.

**CRITICAL RULES:**
1.  **RAW OUTPUT ONLY:** Your entire response, from the very first character to the very last, MUST be the raw content of the translated .srt file.
2.  **NO EXTRA TEXT:** DO NOT include any explanations, introductory sentences, closing remarks, apologies, or any text whatsoever that is not part of the translated SRT data.
3.  **NO MARKDOWN:** DO NOT wrap your response in ```srt or any other markdown code blocks.
4.  **PRESERVE STRUCTURE:** You MUST preserve the original index numbers and timecodes exactly as they appear in the input. Only translate the subtitle text itself.
5.  **TRANSLATE ALL:** Translate all text segments completely into {target_language}.

**Input SRT Transcript:**
{transcript}
"#
        )
    }

    fn build_request(&self, transcript: &str, target_language: &str) -> GenerateContentRequest {
        let mut request =
            GenerateContentRequest::user_text(self.build_prompt(transcript, target_language));
        request.generation_config = Some(GenerationConfig {
            temperature: Some(TEMPERATURE),
            ..Default::default()
        });
        request.safety_settings = HARM_CATEGORIES
            .iter()
            .map(|category| SafetySetting {
                category: category.to_string(),
                threshold: "BLOCK_NONE".to_string(),
            })
            .collect();
        request
    }
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate_srt(&self, document: &str, target_language: &str) -> Result<Translation> {
        debug!(
            "Translating {} chars to {} with {}",
            document.len(),
            target_language,
            self.model
        );

        let request = self.build_request(document, target_language);
        let response = self.client.generate_content(&self.model, &request).await?;
        let raw = response.text();

        debug!("Gemini returned {} chars", raw.len());
        Ok(Translation::from_raw(raw))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
