//! What the view shows, derived from [`QueryView`] state.
//!
//! Both the interactive console and the `ask` command draw from a
//! [`RenderModel`], so the visibility rules live in one place.

use crate::view::QueryView;

/// A numbered link in the sources list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLink<'a> {
    /// 1-based position.
    pub position: usize,
    pub url: &'a str,
}

/// The result block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBlock<'a> {
    pub topic: &'a str,
    pub summary: &'a str,
    /// Present only when the agent reported at least one tool.
    pub tools: Option<&'a [String]>,
    /// Empty means the sources list is not rendered.
    pub sources: Vec<SourceLink<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel<'a> {
    pub query: &'a str,
    /// Input and submit control accept interaction.
    pub input_enabled: bool,
    pub show_clear: bool,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub result: Option<ResultBlock<'a>>,
}

impl<'a> RenderModel<'a> {
    pub fn from_view(view: &'a QueryView) -> Self {
        let result = view.result().map(|resp| ResultBlock {
            topic: &resp.topic,
            summary: &resp.summary,
            tools: resp.tools(),
            sources: resp
                .numbered_sources()
                .map(|(position, url)| SourceLink { position, url })
                .collect(),
        });

        Self {
            query: view.query(),
            input_enabled: view.input_enabled(),
            show_clear: !view.query().is_empty(),
            loading: view.is_loading(),
            error: view.error(),
            result,
        }
    }
}

impl ResultBlock<'_> {
    /// Plain-text rendering, one line per entry.
    pub fn plain_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Topic: {}", self.topic), String::new()];
        lines.extend(self.summary.lines().map(str::to_string));

        if let Some(tools) = self.tools {
            lines.push(String::new());
            lines.push(format!("Tools used: {}", tools.join(", ")));
        }

        if !self.sources.is_empty() {
            lines.push(String::new());
            lines.push(format!("Sources ({}):", self.sources.len()));
            for link in &self.sources {
                lines.push(format!("  {}. {}", link.position, link.url));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_protocol::AgentResponse;

    fn view_with(response: AgentResponse) -> QueryView {
        let mut view = QueryView::new();
        view.set_query("q");
        let s = view.begin_submit().unwrap();
        view.complete(s.seq, Ok(response));
        view
    }

    #[test]
    fn empty_view_renders_nothing_optional() {
        let view = QueryView::new();
        let model = RenderModel::from_view(&view);
        assert!(model.input_enabled);
        assert!(!model.show_clear);
        assert!(model.error.is_none());
        assert!(model.result.is_none());
    }

    #[test]
    fn clear_affordance_follows_query_text() {
        let mut view = QueryView::new();
        view.set_query("x");
        assert!(RenderModel::from_view(&view).show_clear);
        view.clear_query();
        assert!(!RenderModel::from_view(&view).show_clear);
    }

    #[test]
    fn loading_disables_input() {
        let mut view = QueryView::new();
        view.set_query("q");
        view.begin_submit().unwrap();
        let model = RenderModel::from_view(&view);
        assert!(model.loading);
        assert!(!model.input_enabled);
    }

    #[test]
    fn sources_are_numbered_and_tools_hidden_when_empty() {
        let view = view_with(AgentResponse {
            topic: "Tunisia".into(),
            summary: "Tunis.".into(),
            sources: vec!["https://a.com".into(), "https://b.com".into()],
            tools_used: Some(vec![]),
        });
        let model = RenderModel::from_view(&view);
        let block = model.result.unwrap();
        assert!(block.tools.is_none());
        assert_eq!(
            block.sources,
            vec![
                SourceLink { position: 1, url: "https://a.com" },
                SourceLink { position: 2, url: "https://b.com" },
            ]
        );
    }

    #[test]
    fn plain_lines_skip_absent_sections() {
        let view = view_with(AgentResponse {
            topic: "Rust".into(),
            summary: "Fast.\nSafe.".into(),
            sources: vec![],
            tools_used: None,
        });
        let model = RenderModel::from_view(&view);
        let lines = model.result.unwrap().plain_lines();
        assert_eq!(lines, vec!["Topic: Rust", "", "Fast.", "Safe."]);
    }

    #[test]
    fn plain_lines_include_tools_and_sources() {
        let view = view_with(AgentResponse {
            topic: "Rust".into(),
            summary: "Fast.".into(),
            sources: vec!["https://rust-lang.org".into()],
            tools_used: Some(vec!["Search".into(), "Wikipedia".into()]),
        });
        let model = RenderModel::from_view(&view);
        let lines = model.result.unwrap().plain_lines();
        assert!(lines.contains(&"Tools used: Search, Wikipedia".to_string()));
        assert!(lines.contains(&"  1. https://rust-lang.org".to_string()));
    }
}
