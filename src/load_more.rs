//! "Load more" pagination.
//!
//! A `.load-more` button carries `data-url`, `data-page` (the next page to
//! fetch, default 2) and optionally `data-target` (selector of the container
//! that receives the fragment). Each click fetches one page and appends it.

use tracing::{debug, warn};

use crate::ajax::{AjaxRequest, Transport};
use crate::dom::{Document, NodeId, Selector, SelectorError};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadMoreConfig {
    pub button_selector: String,
    pub default_target: String,
    pub status_selector: String,
    pub loading_label: String,
}

impl Default for LoadMoreConfig {
    fn default() -> Self {
        Self {
            button_selector: ".load-more".to_string(),
            default_target: "#projects-grid".to_string(),
            status_selector: ".load-more-status".to_string(),
            loading_label: "Loading...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended { page: u32, has_more: bool },
    Failed(String),
    Skipped,
}

#[derive(Debug, Clone)]
pub struct LoadMore {
    button: Selector,
    default_target: Selector,
    status: Selector,
    config: LoadMoreConfig,
}

fn page_url(url: &str, page: u32) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}page={page}")
}

impl LoadMore {
    pub fn new(config: LoadMoreConfig) -> Result<Self, SelectorError> {
        Ok(Self {
            button: Selector::parse(&config.button_selector)?,
            default_target: Selector::parse(&config.default_target)?,
            status: Selector::parse(&config.status_selector)?,
            config,
        })
    }

    pub fn button_selector(&self) -> &Selector {
        &self.button
    }

    fn target(&self, doc: &Document, button: NodeId) -> Option<NodeId> {
        match doc.attr(button, "data-target") {
            Some(sel) => match Selector::parse(sel) {
                Ok(sel) => doc.query(&sel),
                Err(err) => {
                    warn!(%err, "bad load-more target");
                    None
                }
            },
            None => doc.query(&self.default_target),
        }
    }

    fn show_status(&self, doc: &mut Document, button: NodeId, text: &str) {
        let slot = doc
            .parent(button)
            .and_then(|p| doc.query_selector(p, &self.status));
        if let Some(slot) = slot {
            doc.set_text(slot, text);
        }
    }

    /// Fetch and append the next page for `button`.
    pub fn load(
        &self,
        doc: &mut Document,
        button: NodeId,
        transport: &mut dyn Transport,
    ) -> LoadOutcome {
        if doc.has_attr(button, "disabled") {
            return LoadOutcome::Skipped;
        }
        let Some(url) = doc.attr(button, "data-url").map(str::to_string) else {
            warn!(button = %button, "load-more button has no data-url");
            return LoadOutcome::Skipped;
        };
        let Some(target) = self.target(doc, button) else {
            warn!(button = %button, "load-more target not found");
            return LoadOutcome::Skipped;
        };
        let page = doc
            .attr(button, "data-page")
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(2);

        let label = doc.text_content(button);
        doc.set_attr(button, "disabled", "");
        doc.set_text(button, &self.config.loading_label);

        let request = AjaxRequest::get(page_url(&url, page));
        let outcome = match transport.send(&request) {
            Ok(resp) if resp.success => {
                if let Some(html) = resp.html.as_deref() {
                    doc.append_html(target, html);
                }
                let has_more = resp.has_more.unwrap_or(true);
                doc.set_attr(button, "data-page", &(page + 1).to_string());
                LoadOutcome::Appended { page, has_more }
            }
            Ok(resp) => LoadOutcome::Failed(
                resp.error
                    .unwrap_or_else(|| "Could not load more items.".to_string()),
            ),
            Err(err) => {
                warn!(%err, url = %request.url, "load-more request failed");
                LoadOutcome::Failed(err.user_message())
            }
        };

        doc.remove_attr(button, "disabled");
        doc.set_text(button, &label);
        match &outcome {
            LoadOutcome::Appended { has_more: false, .. } => {
                doc.set_attr(button, "hidden", "");
                self.show_status(doc, button, "");
            }
            LoadOutcome::Appended { .. } => self.show_status(doc, button, ""),
            LoadOutcome::Failed(msg) => self.show_status(doc, button, msg),
            LoadOutcome::Skipped => {}
        }
        debug!(?outcome, "load more finished");
        outcome
    }
}
