//! Append research results to a plain-text archive file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use thiserror::Error;

use scout_protocol::AgentResponse;

pub const DEFAULT_ARCHIVE_FILE: &str = "Research_Output.txt";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Format one archive entry.
pub fn format_entry(timestamp: DateTime<Local>, data: &str) -> String {
    format!(
        "--- Research Output ---\nTimestamp: {}\n\n{}\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        data
    )
}

/// Append `response` as JSON to the archive at `path`, creating it if needed.
pub fn append_result(path: &Path, response: &AgentResponse) -> Result<(), ArchiveError> {
    let data = serde_json::to_string(response)?;
    let entry = format_entry(Local::now(), &data);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(entry.as_bytes())?;

    tracing::info!(path = %path.display(), topic = %response.topic, "Result archived");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> AgentResponse {
        AgentResponse {
            topic: "Tunisia".into(),
            summary: "Tunis is the capital.".into(),
            sources: vec!["https://a.com".into()],
            tools_used: None,
        }
    }

    #[test]
    fn entry_layout() {
        let ts = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            format_entry(ts, "{}"),
            "--- Research Output ---\nTimestamp: 2026-03-04 05:06:07\n\n{}\n\n"
        );
    }

    #[test]
    fn append_accumulates_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        append_result(&path, &sample()).unwrap();
        append_result(&path, &sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("--- Research Output ---").count(), 2);
        assert!(content.contains(r#""topic":"Tunisia""#));
        assert!(!content.contains("tools_used"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(append_result(&path, &sample()), Err(ArchiveError::Io(_))));
    }
}
