use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ResearchError;

/// Normalized answer of the research agent.
///
/// Only ever built through [`AgentResponse::from_value`] (or deserialized from
/// a payload that went through it), so `topic` and `summary` are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub topic: String,
    pub summary: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_used: Option<Vec<String>>,
}

impl AgentResponse {
    /// Normalize a raw JSON payload.
    ///
    /// - `topic` and `summary` must be non-empty strings, otherwise
    ///   [`ResearchError::Shape`].
    /// - `sources` falls back to an empty list when missing or not an array.
    /// - `tools_used` is `None` when missing or not an array.
    ///
    /// Non-string entries inside either array are dropped.
    pub fn from_value(raw: &Value) -> Result<Self, ResearchError> {
        let topic = non_empty_str(raw.get("topic")).ok_or(ResearchError::Shape)?;
        let summary = non_empty_str(raw.get("summary")).ok_or(ResearchError::Shape)?;

        let sources = string_array(raw.get("sources")).unwrap_or_default();
        let tools_used = string_array(raw.get("tools_used"));

        Ok(Self {
            topic: topic.to_string(),
            summary: summary.to_string(),
            sources,
            tools_used,
        })
    }

    /// Parse a response body and normalize it.
    pub fn from_json(body: &str) -> Result<Self, ResearchError> {
        let raw: Value =
            serde_json::from_str(body).map_err(|e| ResearchError::Decode(e.to_string()))?;
        Self::from_value(&raw)
    }

    /// Tools the agent reported, if the list is present and non-empty.
    pub fn tools(&self) -> Option<&[String]> {
        self.tools_used
            .as_deref()
            .filter(|tools| !tools.is_empty())
    }

    /// Sources paired with their 1-based position.
    pub fn numbered_sources(&self) -> impl Iterator<Item = (usize, &str)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, s)| (i + 1, s.as_str()))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_payload_is_kept() {
        let raw = json!({
            "topic": "Rust",
            "summary": "A systems language.",
            "sources": ["https://rust-lang.org", "https://doc.rust-lang.org"],
            "tools_used": ["Search", "Wikipedia"],
        });
        let resp = AgentResponse::from_value(&raw).unwrap();
        assert_eq!(resp.topic, "Rust");
        assert_eq!(resp.sources.len(), 2);
        assert_eq!(resp.tools(), Some(&["Search".to_string(), "Wikipedia".to_string()][..]));
    }

    #[test]
    fn missing_or_empty_required_fields_are_shape_errors() {
        for raw in [
            json!({}),
            json!({"topic": "x"}),
            json!({"summary": "x"}),
            json!({"topic": "", "summary": "x"}),
            json!({"topic": "x", "summary": ""}),
            json!({"topic": null, "summary": "x"}),
            json!({"topic": 42, "summary": "x"}),
            json!([1, 2, 3]),
            json!("topic"),
        ] {
            assert_eq!(AgentResponse::from_value(&raw), Err(ResearchError::Shape), "{raw}");
        }
    }

    #[test]
    fn empty_tools_list_is_present_but_not_rendered() {
        let raw = json!({"topic": "t", "summary": "s", "tools_used": []});
        let resp = AgentResponse::from_value(&raw).unwrap();
        assert_eq!(resp.tools_used, Some(vec![]));
        assert!(resp.tools().is_none());
    }

    #[test]
    fn non_string_entries_are_dropped() {
        let raw = json!({"topic": "t", "summary": "s", "sources": ["https://a.com", 7, null]});
        let resp = AgentResponse::from_value(&raw).unwrap();
        assert_eq!(resp.sources, vec!["https://a.com".to_string()]);
    }

    #[test]
    fn numbered_sources_start_at_one() {
        let raw = json!({"topic": "t", "summary": "s", "sources": ["a", "b"]});
        let resp = AgentResponse::from_value(&raw).unwrap();
        let numbered: Vec<_> = resp.numbered_sources().collect();
        assert_eq!(numbered, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = AgentResponse::from_json("{not json").unwrap_err();
        assert!(matches!(err, ResearchError::Decode(_)));
    }

    #[test]
    fn serialization_omits_absent_tools() {
        let resp = AgentResponse::from_value(&json!({"topic": "t", "summary": "s"})).unwrap();
        let out = serde_json::to_value(&resp).unwrap();
        assert_eq!(out, json!({"topic": "t", "summary": "s", "sources": []}));
    }
}
