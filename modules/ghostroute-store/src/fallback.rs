//! Degraded-mode artifact writer.
//!
//! When the store is unreachable the runtime insertion endpoint renders the
//! whole batch as a literal SQL script instead of dropping it. The script
//! must replay cleanly with `psql -f`, so this module owns the one place
//! where free text is escaped into a serialized command.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use ghostroute_common::EventDraft;

/// Quote a string as a SQL literal, doubling embedded single quotes.
pub fn sql_string_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn opt_text(value: &Option<String>) -> String {
    match value {
        Some(s) => sql_string_literal(s),
        None => "NULL".to_string(),
    }
}

fn opt_int(value: Option<i32>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => "NULL".to_string(),
    }
}

fn misc_literal(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(v) => format!("{}::jsonb", sql_string_literal(&v.to_string())),
        None => "NULL".to_string(),
    }
}

/// Order expression for one row. Authored orders are used verbatim; rows
/// without one allocate at replay time from the partition maximum, which is
/// correct because the statements execute sequentially.
fn order_expr(draft: &EventDraft, chapter: Option<i32>) -> String {
    match draft.event_order {
        Some(order) => order.to_string(),
        None => format!(
            "(SELECT COALESCE(MAX(event_order), 0) + 1 FROM events WHERE COALESCE(chapter, 0) = {})",
            chapter.unwrap_or(0)
        ),
    }
}

/// Render one event as a complete INSERT statement.
pub fn render_insert(draft: &EventDraft, chapter: Option<i32>) -> String {
    format!(
        "INSERT INTO events (chapter, event_order, delay, action, actor, static_text, voice, api_prompt, is_generated, generated_content, misc_data) VALUES ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {});",
        opt_int(chapter),
        order_expr(draft, chapter),
        draft.delay,
        sql_string_literal(&draft.action),
        opt_text(&draft.actor),
        opt_text(&draft.static_text),
        opt_text(&draft.voice),
        opt_text(&draft.api_prompt),
        if draft.is_generated { "TRUE" } else { "FALSE" },
        opt_text(&draft.generated_content),
        misc_literal(&draft.misc_data),
    )
}

/// Render the whole batch, one statement per line.
pub fn render_script(drafts: &[EventDraft], chapter: Option<i32>) -> String {
    let mut lines = vec![format!(
        "-- replay script written {} after a failed ingest; apply with psql -f",
        Utc::now().to_rfc3339()
    )];
    lines.extend(drafts.iter().map(|d| render_insert(d, chapter)));
    lines.join("\n") + "\n"
}

/// Write the batch to a timestamped artifact under `dir`.
pub fn write_insert_script(
    dir: &Path,
    drafts: &[EventDraft],
    chapter: Option<i32>,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let name = format!(
        "events_fallback_{}.sql",
        Utc::now().format("%Y%m%dT%H%M%S%3f")
    );
    let path = dir.join(name);
    fs::write(&path, render_script(drafts, chapter))?;
    warn!(path = %path.display(), events = drafts.len(), "store unreachable, wrote fallback insert script");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(text: &str) -> EventDraft {
        let mut d = EventDraft::new("comms");
        d.actor = Some("KNOX".to_string());
        d.static_text = Some(text.to_string());
        d.delay = 500;
        d
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(sql_string_literal("it's warm"), "'it''s warm'");
        assert_eq!(sql_string_literal("''"), "''''''");
        assert_eq!(sql_string_literal("plain"), "'plain'");
    }

    #[test]
    fn insert_with_authored_order() {
        let mut d = draft("Shouldn't be.");
        d.event_order = Some(3);
        let sql = render_insert(&d, Some(1));
        assert!(sql.starts_with("INSERT INTO events (chapter, event_order"));
        assert!(sql.contains("VALUES (1, 3, 500, 'comms', 'KNOX', 'Shouldn''t be.'"));
        assert!(sql.ends_with(");"));
    }

    #[test]
    fn insert_without_order_allocates_at_replay_time() {
        let sql = render_insert(&draft("x"), None);
        assert!(sql.contains(
            "(SELECT COALESCE(MAX(event_order), 0) + 1 FROM events WHERE COALESCE(chapter, 0) = 0)"
        ));
    }

    #[test]
    fn nulls_and_booleans_render_as_sql() {
        let d = EventDraft::new("marketShock");
        let sql = render_insert(&d, None);
        assert!(sql.contains("'marketShock', NULL, NULL, NULL, NULL, FALSE, NULL, NULL);"));
    }

    #[test]
    fn misc_data_renders_as_escaped_jsonb() {
        let mut d = EventDraft::new("ledger");
        d.misc_data = Some(json!({"domain": "INFRA", "desc": "it's warm"}));
        let sql = render_insert(&d, None);
        assert!(sql.contains("::jsonb"));
        assert!(sql.contains("it''s warm"));
    }

    #[test]
    fn script_has_one_statement_per_event() {
        let drafts = vec![draft("a"), draft("b"), draft("c")];
        let script = render_script(&drafts, Some(2));
        let statements: Vec<&str> = script
            .lines()
            .filter(|l| l.starts_with("INSERT INTO events"))
            .collect();
        assert_eq!(statements.len(), 3);
        assert!(script.lines().next().unwrap().starts_with("--"));
    }

    #[test]
    fn artifact_is_written_and_replayable_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_insert_script(dir.path(), &[draft("it's warm")], None).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("it''s warm"));
        assert!(path.file_name().unwrap().to_string_lossy().ends_with(".sql"));
    }
}
