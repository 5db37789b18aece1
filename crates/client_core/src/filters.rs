//! Filter and pagination state for the paper list, and its translation into
//! `/api/papers` query parameters.

use shared::domain::{BusinessFunction, CategoryFilter, Industry, Stage, Technique};

pub const DEFAULT_YEAR_FROM: i32 = 2018;
pub const DEFAULT_YEAR_TO: i32 = 2025;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_ORDER: &str = "-year";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub function: CategoryFilter<BusinessFunction>,
    pub technique: CategoryFilter<Technique>,
    pub industry: CategoryFilter<Industry>,
    pub stage: CategoryFilter<Stage>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub page: u32,
    pub limit: u32,
    pub order: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_paging(DEFAULT_PAGE_SIZE, DEFAULT_ORDER)
    }
}

/// A single user edit to the filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    Function(CategoryFilter<BusinessFunction>),
    Technique(CategoryFilter<Technique>),
    Industry(CategoryFilter<Industry>),
    Stage(CategoryFilter<Stage>),
    YearFrom(Option<i32>),
    YearTo(Option<i32>),
    Page(u32),
    Limit(u32),
    Order(String),
    Reset,
}

impl FilterState {
    pub fn with_paging(limit: u32, order: impl Into<String>) -> Self {
        Self {
            search: String::new(),
            function: CategoryFilter::All,
            technique: CategoryFilter::All,
            industry: CategoryFilter::All,
            stage: CategoryFilter::All,
            year_from: Some(DEFAULT_YEAR_FROM),
            year_to: Some(DEFAULT_YEAR_TO),
            page: 1,
            limit: clamp_limit(limit),
            order: order.into(),
        }
    }

    /// Applies `change`, returning whether the state differs afterwards.
    ///
    /// Every change other than [`FilterChange::Page`] also moves back to the
    /// first page.
    pub fn apply(&mut self, change: FilterChange) -> bool {
        let before = self.clone();
        match change {
            FilterChange::Page(page) => {
                self.page = page.max(1);
                return *self != before;
            }
            FilterChange::Search(search) => self.search = search,
            FilterChange::Function(function) => self.function = function,
            FilterChange::Technique(technique) => self.technique = technique,
            FilterChange::Industry(industry) => self.industry = industry,
            FilterChange::Stage(stage) => self.stage = stage,
            FilterChange::YearFrom(year) => self.year_from = year,
            FilterChange::YearTo(year) => self.year_to = year,
            FilterChange::Limit(limit) => self.limit = clamp_limit(limit),
            FilterChange::Order(order) => self.order = order,
            FilterChange::Reset => {
                *self = Self::with_paging(self.limit, self.order.clone());
            }
        }
        self.page = 1;
        *self != before
    }

    pub fn to_query(&self) -> PapersQuery {
        let search = self.search.trim();
        PapersQuery {
            page: self.page.max(1),
            limit: self.limit,
            order: self.order.clone(),
            q: (!search.is_empty()).then(|| search.to_string()),
            function: self.function.selected().map(|v| v.as_str()),
            technique: self.technique.selected().map(|v| v.as_str()),
            industry: self.industry.selected().map(|v| v.as_str()),
            stage: self.stage.selected().map(|v| v.as_str()),
            year_from: self.year_from,
            year_to: self.year_to,
        }
    }
}

/// Parses a free-text year field. Blank or non-numeric input means "no bound".
pub fn parse_year_input(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

/// Query parameters for `GET /api/papers`. Unset filters are omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PapersQuery {
    pub page: u32,
    pub limit: u32,
    pub order: String,
    pub q: Option<String>,
    pub function: Option<&'static str>,
    pub technique: Option<&'static str>,
    pub industry: Option<&'static str>,
    pub stage: Option<&'static str>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl PapersQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("order", self.order.clone()),
        ];
        if let Some(q) = &self.q {
            pairs.push(("q", q.clone()));
        }
        let categories = [
            ("function", self.function),
            ("technique", self.technique),
            ("industry", self.industry),
            ("stage", self.stage),
        ];
        for (key, value) in categories {
            if let Some(value) = value {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(year) = self.year_from {
            pairs.push(("year_from", year.to_string()));
        }
        if let Some(year) = self.year_to {
            pairs.push(("year_to", year.to_string()));
        }
        pairs
    }
}
