use anyhow::Result;
use html2text::from_read;

use super::html::{Folding, detail_view_html_with, summary_list_html};
use super::{DetailView, SummaryList};

pub const DEFAULT_WIDTH: usize = 100;

/// Plain terminal text for an HTML fragment.
pub fn to_terminal(html: &str, width: usize) -> Result<String> {
    let text = from_read(html.as_bytes(), width.max(20))?;
    Ok(text)
}

pub fn summary_list_text(list: &SummaryList, width: usize) -> Result<String> {
    if list.is_empty() {
        return Ok("No results.\n".to_string());
    }
    to_terminal(&summary_list_html(list), width)
}

pub fn detail_view_text(view: &DetailView, width: usize) -> Result<String> {
    to_terminal(&detail_view_html_with(view, Folding::Expanded), width)
}
