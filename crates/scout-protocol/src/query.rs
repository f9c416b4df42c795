use std::fmt;

use crate::ResearchError;

/// A trimmed, non-empty research query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Trim `raw` and reject it if nothing is left.
    pub fn parse(raw: &str) -> Result<Self, ResearchError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResearchError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Percent-encode the query for use as a query-string value.
    ///
    /// Spaces become `%20`, never `+`.
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let q = Query::parse("  What is Rust?\n").unwrap();
        assert_eq!(q.as_str(), "What is Rust?");
    }

    #[test]
    fn parse_rejects_blank_input() {
        for raw in ["", " ", "\t\n", "   \r\n  "] {
            assert_eq!(Query::parse(raw), Err(ResearchError::EmptyQuery), "{raw:?}");
        }
    }

    #[test]
    fn encoded_uses_percent_twenty_for_spaces() {
        let q = Query::parse("capital of Tunisia?").unwrap();
        assert_eq!(q.encoded(), "capital%20of%20Tunisia%3F");
    }

    #[test]
    fn encoded_handles_multibyte_characters() {
        let q = Query::parse("café & crème").unwrap();
        assert_eq!(q.encoded(), "caf%C3%A9%20%26%20cr%C3%A8me");
    }
}
