//! Offline fallbacks used whenever a provider call fails or no API key is
//! configured. The narrative must keep moving: text fields get a labeled
//! stub (never left blank) and audio gets a valid, correctly-headered
//! silent clip (never a malformed file).

use chrono::Utc;

/// Duration of the silent placeholder clip.
pub const SILENT_WAV_MS: u32 = 500;

const SAMPLE_RATE: u32 = 16_000;
const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;

/// A clearly-labeled substitute for generated text.
pub fn stub_reply(prompt: &str) -> String {
    let preview: String = prompt.chars().take(120).collect();
    format!(
        "STUB_RESPONSE: ({}) {} ... [generator unavailable]",
        Utc::now().to_rfc3339(),
        preview
    )
}

/// A playable 16 kHz 16-bit mono PCM WAV of silence, `duration_ms` long.
/// Hand-assembled RIFF header so no audio dependency is needed for a file
/// that is all zeroes anyway.
pub fn silent_wav(duration_ms: u32) -> Vec<u8> {
    let num_samples = SAMPLE_RATE * duration_ms / 1000;
    let data_len = num_samples * (BITS_PER_SAMPLE as u32 / 8) * CHANNELS as u32;
    let byte_rate = SAMPLE_RATE * (BITS_PER_SAMPLE as u32 / 8) * CHANNELS as u32;
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;

    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // PCM chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}
