use serde::{Deserialize, Serialize};

/// Keys that must be present (possibly null) on every authored event.
/// Matches the columns an ingest file is expected to spell out explicitly.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "event_order",
    "delay",
    "action",
    "actor",
    "static_text",
    "voice",
    "api_prompt",
    "misc_data",
];

/// One candidate narrative beat, as submitted by an ingest file or the
/// runtime insertion endpoint. `event_order` is optional: authored files
/// carry it, runtime submissions let the allocator assign one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub event_order: Option<i32>,
    #[serde(default)]
    pub delay: i32,
    pub action: String,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub static_text: Option<String>,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub api_prompt: Option<String>,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub generated_content: Option<String>,
    #[serde(default)]
    pub misc_data: Option<serde_json::Value>,
}

impl EventDraft {
    /// Minimal draft for programmatic appends (batch audio logs, tests).
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            event_order: None,
            delay: 0,
            action: action.into(),
            actor: None,
            static_text: None,
            voice: None,
            api_prompt: None,
            is_generated: false,
            generated_content: None,
            misc_data: None,
        }
    }
}
