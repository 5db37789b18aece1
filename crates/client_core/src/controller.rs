//! Newest-request-wins fetch controller for the paper list.
//!
//! Every filter change cancels the in-flight request and issues a new one.
//! Results are committed under the state lock only if their cancellation
//! token is still live, so a superseded request can never overwrite `data`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{error::ApiError, protocol::PapersResponse};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::FetchError,
    filters::{FilterChange, FilterState, PapersQuery},
    view::ViewAction,
    PaperSource,
};

/// What the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState {
    pub data: Option<PapersResponse>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    Started {
        request_id: u64,
        query: PapersQuery,
    },
    Loaded {
        request_id: u64,
        response: PapersResponse,
    },
    Failed {
        request_id: u64,
        error: ApiError,
    },
}

pub struct FetchController {
    shared: Arc<Shared>,
}

struct Shared {
    source: Arc<dyn PaperSource>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

struct ControllerState {
    filters: FilterState,
    fetch: FetchState,
    inflight: Option<InflightRequest>,
    next_request_id: u64,
}

struct InflightRequest {
    request_id: u64,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl FetchController {
    /// Creates an idle controller. Nothing is fetched until the first change,
    /// [`FetchController::refresh`] or [`FetchController::retry`].
    pub fn new(source: Arc<dyn PaperSource>, filters: FilterState) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            shared: Arc::new(Shared {
                source,
                inner: Mutex::new(ControllerState {
                    filters,
                    fetch: FetchState::default(),
                    inflight: None,
                    next_request_id: 1,
                }),
                events,
            }),
        }
    }

    /// Creates the controller and immediately issues the first request.
    /// Must be called from within a tokio runtime.
    pub fn mount(source: Arc<dyn PaperSource>, filters: FilterState) -> Self {
        let controller = Self::new(source, filters);
        controller.refresh();
        controller
    }

    /// Applies a filter edit. Returns `false`, and fetches nothing, when the
    /// edit leaves the filters unchanged.
    pub fn apply(&self, change: FilterChange) -> bool {
        let mut state = self.shared.lock();
        if !state.filters.apply(change) {
            return false;
        }
        self.shared.issue(&mut state);
        true
    }

    pub fn go_to_page(&self, page: u32) -> bool {
        self.apply(FilterChange::Page(page))
    }

    pub fn reset_filters(&self) -> bool {
        self.apply(FilterChange::Reset)
    }

    /// Re-issues the request for the current filters.
    pub fn retry(&self) {
        self.refresh();
    }

    pub fn refresh(&self) {
        let mut state = self.shared.lock();
        self.shared.issue(&mut state);
    }

    pub fn dispatch(&self, action: ViewAction) {
        match action {
            ViewAction::Retry => self.retry(),
            ViewAction::ResetFilters => {
                self.reset_filters();
            }
            ViewAction::GoToPage(page) => {
                self.go_to_page(page);
            }
        }
    }

    pub fn snapshot(&self) -> FetchState {
        self.shared.lock().fetch.clone()
    }

    pub fn filters(&self) -> FilterState {
        self.shared.lock().filters.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.shared.events.subscribe()
    }

    /// Waits until no request is in flight and returns the settled state.
    pub async fn settled(&self) -> FetchState {
        let mut events = self.subscribe();
        loop {
            let snapshot = self.snapshot();
            if !snapshot.loading {
                return snapshot;
            }
            match events.recv().await {
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return self.snapshot(),
            }
        }
    }

    /// Cancels any in-flight request. Dropping the controller does the same.
    pub fn unmount(self) {}
}

impl Drop for FetchController {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        if let Some(inflight) = state.inflight.take() {
            debug!(request_id = inflight.request_id, "unmount cancels in-flight request");
            inflight.token.cancel();
            inflight.task.abort();
        }
        state.fetch.loading = false;
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(self: &Arc<Self>, state: &mut ControllerState) {
        if let Some(previous) = state.inflight.take() {
            debug!(
                request_id = previous.request_id,
                "superseding in-flight request"
            );
            previous.token.cancel();
        }

        let request_id = state.next_request_id;
        state.next_request_id += 1;
        let query = state.filters.to_query();
        let token = CancellationToken::new();

        state.fetch.loading = true;
        state.fetch.error = None;

        info!(request_id, page = query.page, q = ?query.q, "fetching papers");
        let _ = self.events.send(ControllerEvent::Started {
            request_id,
            query: query.clone(),
        });

        let task = tokio::spawn(Arc::clone(self).run_request(request_id, token.clone(), query));
        state.inflight = Some(InflightRequest {
            request_id,
            token,
            task,
        });
    }

    async fn run_request(
        self: Arc<Self>,
        request_id: u64,
        token: CancellationToken,
        query: PapersQuery,
    ) {
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(FetchError::Cancelled),
            result = self.source.list_papers(&query) => result.map_err(FetchError::from),
        };
        self.commit(request_id, &token, outcome);
    }

    /// Stores the outcome if `token` is still live. Returns whether state
    /// changed.
    fn commit(
        &self,
        request_id: u64,
        token: &CancellationToken,
        outcome: Result<PapersResponse, FetchError>,
    ) -> bool {
        let mut state = self.lock();
        if token.is_cancelled() {
            debug!(request_id, "dropping result of cancelled request");
            return false;
        }

        match outcome {
            Ok(response) => {
                info!(
                    request_id,
                    count = response.count,
                    page = response.page,
                    "papers loaded"
                );
                state.fetch.data = Some(response.clone());
                state.fetch.error = None;
                let _ = self.events.send(ControllerEvent::Loaded {
                    request_id,
                    response,
                });
            }
            Err(FetchError::Cancelled) => {
                debug!(request_id, "request reported cancellation");
                return false;
            }
            Err(FetchError::Api(error)) => {
                warn!(
                    request_id,
                    status = error.status_code,
                    message = %error.message,
                    "papers request failed"
                );
                state.fetch.error = Some(error.clone());
                let _ = self.events.send(ControllerEvent::Failed { request_id, error });
            }
        }

        state.fetch.loading = false;
        state.inflight = None;
        true
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
