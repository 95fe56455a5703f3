use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::debug;

use super::types::*;
use crate::traits::{SpeechSynthesizer, TextGenerator};

const GENERATE_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const TTS_API_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Client for Google generative text and text-to-speech, keyed by a single
/// API key. Construct once at startup and share.
pub struct GeminiClient {
    api_key: String,
    model: String,
    http: reqwest::Client,
    generate_base_url: String,
    tts_base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
            generate_base_url: GENERATE_API_URL.to_string(),
            tts_base_url: TTS_API_URL.to_string(),
        }
    }

    /// Point both endpoints at a different host. For tests.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.generate_base_url = url.to_string();
        self.tts_base_url = url.to_string();
        self
    }

    /// Voice-profile names used by authored events map onto concrete
    /// Wavenet voices here; unknown profiles get the default narrator.
    fn voice_name(profile: &str) -> &'static str {
        match profile {
            "Charon" => "en-US-Wavenet-F",
            _ => "en-US-Wavenet-E",
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.generate_base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt.to_string() }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.4),
                max_output_tokens: None,
            }),
        };

        debug!(model = %self.model, "Gemini generate request");

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize(&self, text: &str, voice_profile: &str) -> Result<Vec<u8>> {
        let url = format!("{}/text:synthesize?key={}", self.tts_base_url, self.api_key);
        let request = SynthesizeRequest {
            input: SynthesisInput { text: text.to_string() },
            voice: VoiceSelection {
                language_code: "en-US".to_string(),
                name: Self::voice_name(voice_profile).to_string(),
            },
            audio_config: AudioConfig {
                audio_encoding: "LINEAR16".to_string(),
            },
        };

        debug!(voice = voice_profile, "TTS synthesize request");

        let response = self.http.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("TTS API error ({}): {}", status, error_text));
        }

        let body: SynthesizeResponse = response.json().await?;
        let encoded = body
            .audio_content
            .ok_or_else(|| anyhow!("TTS response contained no audioContent"))?;
        Ok(BASE64.decode(encoded)?)
    }
}
