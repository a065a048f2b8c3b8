//! View state for the search page: which regions are visible, the current
//! result set, and the search currently in flight.

use thiserror::Error;

use crate::client::SearchError;
use crate::data_models::SearchResponse;
use crate::render::{DetailView, SummaryList, render_detail_view, render_summary_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    SearchForm,
    ResultsHeading,
    ResultsList,
    Loading,
    Detail,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::SearchForm,
        Region::ResultsHeading,
        Region::ResultsList,
        Region::Loading,
        Region::Detail,
    ];

    /// Stable element id of the region in the rendered page.
    pub fn element_id(self) -> &'static str {
        match self {
            Region::SearchForm => "searchForm",
            Region::ResultsHeading => "resultsHeading",
            Region::ResultsList => "results",
            Region::Loading => "loading",
            Region::Detail => "detail",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Shown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Detail(usize),
}

/// Handed out by [`ViewState::begin_search`]; only the newest ticket may
/// deliver results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The result set was replaced; carries the number of results.
    Rendered(usize),
    /// The search failed and the previous view was kept.
    Failed,
    /// A newer search superseded this one.
    Ignored,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("no result at position {index} ({len} results shown)")]
    NoSuchResult { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    last_ticket: u64,
    in_flight: Option<u64>,
    response: Option<SearchResponse>,
    summary: Option<SummaryList>,
    detail: Option<DetailView>,
    mode: ViewMode,
    visibility: [Visibility; 5],
    scroll_to_top: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        let mut state = ViewState {
            last_ticket: 0,
            in_flight: None,
            response: None,
            summary: None,
            detail: None,
            mode: ViewMode::List,
            visibility: [Visibility::Hidden; 5],
            scroll_to_top: false,
        };
        state.set(Region::SearchForm, Visibility::Shown);
        state
    }

    fn set(&mut self, region: Region, visibility: Visibility) {
        self.visibility[region.slot()] = visibility;
    }

    pub fn visibility(&self, region: Region) -> Visibility {
        self.visibility[region.slot()]
    }

    pub fn is_shown(&self, region: Region) -> bool {
        self.visibility(region) == Visibility::Shown
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn summary(&self) -> Option<&SummaryList> {
        self.summary.as_ref()
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    /// Returns whether the viewport should jump to the top, clearing the flag.
    pub fn take_scroll_to_top(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    /// Marks a new search as in flight. Any earlier ticket becomes stale.
    pub fn begin_search(&mut self) -> SearchTicket {
        self.last_ticket += 1;
        if let Some(stale) = self.in_flight.replace(self.last_ticket) {
            tracing::debug!("search #{stale} superseded by #{}", self.last_ticket);
        }
        self.set(Region::Loading, Visibility::Shown);
        SearchTicket(self.last_ticket)
    }

    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchResponse, SearchError>,
    ) -> SearchOutcome {
        if self.in_flight != Some(ticket.0) {
            tracing::debug!("dropping stale response for search #{}", ticket.0);
            return SearchOutcome::Ignored;
        }
        self.in_flight = None;
        self.set(Region::Loading, Visibility::Hidden);

        match result {
            Ok(response) => {
                let summary = render_summary_list(&response.results);
                let count = summary.len();
                self.summary = Some(summary);
                self.response = Some(response);
                self.detail = None;
                self.mode = ViewMode::List;
                self.set(Region::SearchForm, Visibility::Shown);
                self.set(Region::ResultsHeading, Visibility::Shown);
                self.set(Region::ResultsList, Visibility::Shown);
                self.set(Region::Detail, Visibility::Hidden);
                tracing::info!("rendered {count} results");
                SearchOutcome::Rendered(count)
            }
            Err(e) => {
                tracing::error!("error fetching search results: {:#}", anyhow::Error::from(e));
                SearchOutcome::Failed
            }
        }
    }

    /// Gives up on a search that will never finish. Only the current ticket
    /// clears the loading indicator.
    pub fn abandon_search(&mut self, ticket: SearchTicket) -> bool {
        if self.in_flight != Some(ticket.0) {
            return false;
        }
        tracing::warn!("search #{} abandoned", ticket.0);
        self.in_flight = None;
        self.set(Region::Loading, Visibility::Hidden);
        true
    }

    /// Switches to the detail view of the result at `index`.
    pub fn open_detail(&mut self, index: usize) -> Result<&DetailView, ViewError> {
        let results = self
            .response
            .as_ref()
            .map(|r| r.results.as_slice())
            .unwrap_or_default();
        let item = results.get(index).ok_or(ViewError::NoSuchResult {
            index,
            len: results.len(),
        })?;

        let detail = render_detail_view(index, item);
        self.mode = ViewMode::Detail(index);
        self.set(Region::SearchForm, Visibility::Hidden);
        self.set(Region::ResultsHeading, Visibility::Hidden);
        self.set(Region::ResultsList, Visibility::Hidden);
        self.set(Region::Detail, Visibility::Shown);
        self.scroll_to_top = true;
        Ok(self.detail.insert(detail))
    }

    /// Leaves the detail view and brings the form and result list back.
    pub fn back_to_search(&mut self) {
        self.detail = None;
        self.mode = ViewMode::List;
        self.set(Region::Detail, Visibility::Hidden);
        self.set(Region::SearchForm, Visibility::Shown);
        if self.summary.is_some() {
            self.set(Region::ResultsHeading, Visibility::Shown);
            self.set(Region::ResultsList, Visibility::Shown);
        }
    }

    /// Drops the result set and returns to the initial, empty page.
    pub fn reset(&mut self) {
        let last_ticket = self.last_ticket;
        *self = ViewState::new();
        // Keep numbering so a response that was in flight stays stale.
        self.last_ticket = last_ticket;
    }
}
