//! `scout ask`: a single submission rendered to a writer.

use std::io::Write;
use std::path::PathBuf;

use scout_client::AgentClient;

use crate::archive;
use crate::render::RenderModel;
use crate::view::QueryView;

#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    /// Print the normalized response as JSON instead of plain lines.
    pub json: bool,
    /// Append the result to this archive file.
    pub save_to: Option<PathBuf>,
}

/// Submit `query` and write the rendered result to `out`.
///
/// Any failure, validation included, is returned as an error carrying the
/// message the view would display.
pub async fn ask<W: Write>(
    client: &AgentClient,
    query: &str,
    options: &AskOptions,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut view = QueryView::new();
    view.set_query(query);
    view.submit(client).await;

    let model = RenderModel::from_view(&view);
    if let Some(error) = model.error {
        anyhow::bail!("{error}");
    }
    let (Some(result), Some(block)) = (view.result(), &model.result) else {
        anyhow::bail!("no result received");
    };

    if options.json {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
    } else {
        for line in block.plain_lines() {
            writeln!(out, "{line}")?;
        }
    }

    if let Some(path) = &options.save_to {
        archive::append_result(path, result)?;
        tracing::debug!(path = %path.display(), "Saved one-shot result");
    }
    Ok(())
}
