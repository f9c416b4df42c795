//! The query view: input text, loading flag, error and result.
//!
//! A submission is split into [`QueryView::begin_submit`] and
//! [`QueryView::complete`] so the console can run the request on a
//! background task. Every issued request carries a sequence number and only
//! the latest one may change the view when it finishes.

use scout_client::AgentClient;
use scout_protocol::{AgentResponse, Query, ResearchError};

/// Maximum number of remembered queries.
const MAX_HISTORY: usize = 100;

/// A validated query ready to be sent, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub query: Query,
}

#[derive(Debug, Default)]
pub struct QueryView {
    /// Current text in the input field.
    query: String,
    /// Cursor position within the input field, in characters.
    cursor: usize,
    loading: bool,
    error: Option<String>,
    result: Option<AgentResponse>,
    /// Sequence number of the most recently issued request.
    latest_seq: u64,
    /// Previously submitted queries, oldest first.
    history: Vec<String>,
    /// Current position in history (None = editing fresh input).
    history_pos: Option<usize>,
}

impl QueryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&AgentResponse> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Input is editable and submittable only when no request is in flight.
    pub fn input_enabled(&self) -> bool {
        !self.loading
    }

    /// Replace the input text and move the cursor to its end.
    pub fn set_query(&mut self, text: &str) {
        self.query = text.to_string();
        self.cursor = self.query.chars().count();
        self.history_pos = None;
    }

    /// The clear affordance: empty the input. Error and result stay visible.
    pub fn clear_query(&mut self) {
        self.query.clear();
        self.cursor = 0;
        self.history_pos = None;
    }

    /// Forget the last error and result.
    pub fn reset_output(&mut self) {
        self.error = None;
        self.result = None;
    }

    /// Validate the input and start a submission.
    ///
    /// Error and result are cleared first. Returns `None` with the validation
    /// message set when the trimmed input is empty; `loading` is left as is
    /// in that case.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        self.reset_output();

        let query = match Query::parse(&self.query) {
            Ok(query) => query,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        self.latest_seq += 1;
        self.loading = true;
        self.remember(query.as_str());

        tracing::info!(seq = self.latest_seq, query = %query, "Submitting research query");
        Some(Submission {
            seq: self.latest_seq,
            query,
        })
    }

    /// Apply the outcome of request `seq`.
    ///
    /// Returns `false` and changes nothing when `seq` is not the latest
    /// in-flight request.
    pub fn complete(&mut self, seq: u64, outcome: Result<AgentResponse, ResearchError>) -> bool {
        if seq != self.latest_seq || !self.loading {
            tracing::debug!(seq, latest = self.latest_seq, "Discarding stale research outcome");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(response) => {
                tracing::info!(seq, topic = %response.topic, "Research result ready");
                self.result = Some(response);
            }
            Err(e) => {
                tracing::info!(seq, error = %e, "Research failed");
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Run a whole submission against `client`.
    ///
    /// Does not touch the network when validation fails.
    pub async fn submit(&mut self, client: &AgentClient) {
        let Some(submission) = self.begin_submit() else {
            return;
        };
        let outcome = client.research(&submission.query).await;
        self.complete(submission.seq, outcome);
    }

    // ── Editing ────────────────────────────────────────────────────────────
    //
    // All edits are ignored while a request is in flight.

    pub fn insert_char(&mut self, c: char) {
        if self.loading {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.query.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.loading || self.cursor == 0 {
            return;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.query.remove(at);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.loading || self.cursor >= self.query.chars().count() {
            return;
        }
        let at = self.byte_offset(self.cursor);
        self.query.remove(at);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.query.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.query.chars().count();
    }

    /// Recall the previous query from history.
    pub fn history_prev(&mut self) {
        if self.loading || self.history.is_empty() {
            return;
        }
        let pos = match self.history_pos {
            Some(p) if p > 0 => p - 1,
            Some(p) => p,
            None => self.history.len() - 1,
        };
        self.history_pos = Some(pos);
        self.query = self.history[pos].clone();
        self.cursor = self.query.chars().count();
    }

    /// Move forward in history, ending on an empty input.
    pub fn history_next(&mut self) {
        if self.loading {
            return;
        }
        if let Some(pos) = self.history_pos {
            if pos + 1 < self.history.len() {
                self.history_pos = Some(pos + 1);
                self.query = self.history[pos + 1].clone();
                self.cursor = self.query.chars().count();
            } else {
                self.clear_query();
            }
        }
    }

    fn remember(&mut self, query: &str) {
        if self.history.last().map(String::as_str) != Some(query) {
            self.history.push(query.to_string());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }
        self.history_pos = None;
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.query
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }
}
