pub mod config;
pub mod events;
pub mod validate;

pub use config::Config;
pub use events::{EventDraft, REQUIRED_FIELDS};
pub use validate::{validate_batch, Strictness, ValidationReport, Violation};
