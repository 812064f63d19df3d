//! Speech synthesis with the Gemini TTS models.

use crate::error::{Result, VoxpipeError};
use crate::gemini::{
    GeminiClient, GenerateContentRequest, GenerationConfig, MultiSpeakerVoiceConfig,
    SpeakerVoiceConfig, SpeechConfig, VoiceConfig,
};
use crate::tts::{AudioClip, SpeechSynthesizer, VoiceSelection};
use async_trait::async_trait;
use base64::Engine;
use tracing::debug;

pub const DEFAULT_MODEL: &str = crate::config::DEFAULT_TTS_MODEL;

pub struct GeminiSpeech {
    client: GeminiClient,
    model: String,
    voice: VoiceSelection,
    temperature: f32,
}

impl GeminiSpeech {
    pub fn new(api_key: String) -> Self {
        Self::with_client(GeminiClient::new(api_key))
    }

    pub fn with_client(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            voice: VoiceSelection::default(),
            temperature: 1.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_voice(mut self, voice: VoiceSelection) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn voice(&self) -> &VoiceSelection {
        &self.voice
    }

    fn speech_config(&self) -> SpeechConfig {
        match &self.voice {
            VoiceSelection::Single(voice) => SpeechConfig {
                voice_config: Some(VoiceConfig::prebuilt(voice.clone())),
                multi_speaker_voice_config: None,
            },
            VoiceSelection::MultiSpeaker(speakers) => SpeechConfig {
                voice_config: None,
                multi_speaker_voice_config: Some(MultiSpeakerVoiceConfig {
                    speaker_voice_configs: speakers
                        .iter()
                        .map(|s| SpeakerVoiceConfig {
                            speaker: s.speaker.clone(),
                            voice_config: VoiceConfig::prebuilt(s.voice.clone()),
                        })
                        .collect(),
                }),
            },
        }
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        let mut request = GenerateContentRequest::user_text(text);
        request.generation_config = Some(GenerationConfig {
            temperature: Some(self.temperature),
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(self.speech_config()),
        });
        request
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeech {
    async fn synthesize(&self, text: &str) -> Result<AudioClip> {
        debug!("Synthesizing {} chars with {}", text.chars().count(), self.model);

        let request = self.build_request(text);
        let response = self.client.generate_content(&self.model, &request).await?;

        let mut data = Vec::new();
        let mut mime_type = None;
        for inline in response.parts().iter().filter_map(|p| p.inline_data.as_ref()) {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .map_err(|e| VoxpipeError::Api(format!("Invalid base64 audio payload: {}", e)))?;
            if bytes.is_empty() {
                continue;
            }
            mime_type.get_or_insert_with(|| inline.mime_type.clone());
            data.extend_from_slice(&bytes);
        }

        match mime_type {
            Some(mime_type) => {
                debug!("Received {} bytes of {}", data.len(), mime_type);
                Ok(AudioClip { data, mime_type })
            }
            None => {
                let text = response.text();
                Err(VoxpipeError::Api(if text.is_empty() {
                    "No audio was generated".to_string()
                } else {
                    format!("No audio was generated; model replied: {}", text)
                }))
            }
        }
    }

    fn name(&self) -> &'static str {
        "Google Gemini TTS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::SpeakerVoice;

    #[test]
    fn test_gemini_speech_defaults() {
        let speech = GeminiSpeech::new("test-key".to_string());
        assert_eq!(speech.model(), DEFAULT_MODEL);
        assert_eq!(speech.voice(), &VoiceSelection::Single("Zephyr".to_string()));
        assert_eq!(speech.name(), "Google Gemini TTS");
    }

    #[test]
    fn test_single_voice_request() {
        let speech = GeminiSpeech::new("test-key".to_string())
            .with_voice(VoiceSelection::Single("Puck".to_string()))
            .with_temperature(0.7);
        let json = serde_json::to_value(speech.build_request("Hello.")).unwrap();

        let config = &json["generationConfig"];
        assert_eq!(config["responseModalities"][0], "AUDIO");
        assert_eq!(
            config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
        assert!(config["speechConfig"].get("multiSpeakerVoiceConfig").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello.");
    }

    #[test]
    fn test_multi_speaker_request() {
        let speech = GeminiSpeech::new("test-key".to_string()).with_voice(
            VoiceSelection::MultiSpeaker(vec![
                SpeakerVoice {
                    speaker: "Speaker 1".to_string(),
                    voice: "Zephyr".to_string(),
                },
                SpeakerVoice {
                    speaker: "Speaker 2".to_string(),
                    voice: "Puck".to_string(),
                },
            ]),
        );
        let json = serde_json::to_value(speech.build_request("Speaker 1: Hi.")).unwrap();

        let configs = &json["generationConfig"]["speechConfig"]["multiSpeakerVoiceConfig"]
            ["speakerVoiceConfigs"];
        assert_eq!(configs.as_array().unwrap().len(), 2);
        assert_eq!(configs[1]["speaker"], "Speaker 2");
        assert_eq!(
            configs[1]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Puck"
        );
    }
}
