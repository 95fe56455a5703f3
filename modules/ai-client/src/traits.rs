use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// TextGenerator Trait
// =============================================================================

/// A provider that turns a prompt into generated text. May fail; callers are
/// expected to substitute a clearly-labeled stub rather than surface a blank
/// field (see `stub::stub_reply`).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// =============================================================================
// SpeechSynthesizer Trait
// =============================================================================

/// A provider that renders text as raw audio bytes for a voice profile.
/// May fail; callers are expected to substitute a valid silent placeholder
/// clip (see `stub::silent_wav`) so downstream consumers never receive a
/// malformed file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice_profile: &str) -> Result<Vec<u8>>;
}
