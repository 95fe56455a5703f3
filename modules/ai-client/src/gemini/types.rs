//! Wire types for the Gemini generateContent and Cloud TTS synthesize APIs.

use serde::{Deserialize, Serialize};

// --- generateContent ---

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

// --- text:synthesize ---

#[derive(Debug, Serialize)]
pub(crate) struct SynthesizeRequest {
    pub input: SynthesisInput,
    pub voice: VoiceSelection,
    #[serde(rename = "audioConfig")]
    pub audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct SynthesisInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoiceSelection {
    #[serde(rename = "languageCode")]
    pub language_code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AudioConfig {
    #[serde(rename = "audioEncoding")]
    pub audio_encoding: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    pub audio_content: Option<String>,
}
