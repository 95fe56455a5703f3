pub mod gemini;
pub mod stub;
mod traits;

pub use gemini::GeminiClient;
pub use stub::{silent_wav, stub_reply, SILENT_WAV_MS};
pub use traits::{SpeechSynthesizer, TextGenerator};
