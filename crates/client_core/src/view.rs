//! Presentation model derived from [`FetchState`]: which screen the paper list
//! shows and which actions it offers.

use std::fmt;

use shared::protocol::Paper;

use crate::controller::FetchState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Retry,
    ResetFilters,
    GoToPage(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsSummary {
    pub shown: usize,
    pub count: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} of {} results · Page {} of {}",
            self.shown, self.count, self.page, self.total_pages
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationControls {
    pub page: u32,
    pub total_pages: u32,
    pub previous: Option<ViewAction>,
    pub next: Option<ViewAction>,
}

impl PaginationControls {
    pub fn new(page: u32, total_pages: u32) -> Self {
        let previous = (page > 1).then(|| ViewAction::GoToPage(page.saturating_sub(1).max(1)));
        let next = (page < total_pages).then(|| ViewAction::GoToPage(page + 1));
        Self {
            page,
            total_pages,
            previous,
            next,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView<'a> {
    Idle,
    Loading,
    Failed {
        status_code: u16,
        message: &'a str,
        retry: ViewAction,
    },
    Empty {
        reset: ViewAction,
    },
    Results {
        summary: ResultsSummary,
        papers: &'a [Paper],
        pagination: PaginationControls,
    },
}

impl<'a> CatalogView<'a> {
    pub fn from_state(state: &'a FetchState) -> Self {
        if state.loading {
            return CatalogView::Loading;
        }
        if let Some(error) = &state.error {
            return CatalogView::Failed {
                status_code: error.status_code,
                message: &error.message,
                retry: ViewAction::Retry,
            };
        }
        let Some(data) = &state.data else {
            return CatalogView::Idle;
        };
        if data.papers.is_empty() {
            return CatalogView::Empty {
                reset: ViewAction::ResetFilters,
            };
        }
        CatalogView::Results {
            summary: ResultsSummary {
                shown: data.papers.len(),
                count: data.count,
                page: data.page,
                total_pages: data.total_pages,
            },
            papers: &data.papers,
            pagination: PaginationControls::new(data.page, data.total_pages),
        }
    }

    pub fn actions(&self) -> Vec<ViewAction> {
        match self {
            CatalogView::Failed { retry, .. } => vec![*retry],
            CatalogView::Empty { reset } => vec![*reset],
            CatalogView::Results { pagination, .. } => {
                pagination.previous.into_iter().chain(pagination.next).collect()
            }
            CatalogView::Idle | CatalogView::Loading => Vec::new(),
        }
    }
}
