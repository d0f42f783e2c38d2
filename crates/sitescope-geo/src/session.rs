//! The page session: one working set, one selection, one map.
//!
//! Everything here is synchronous and takes `&mut self`. The two kinds of
//! asynchronous work (dataset refresh and history fetch) are issued as
//! request values carrying a [`RequestTicket`]; the host runs them through a
//! source and hands the result back, and stale results are dropped.

use std::fmt::Display;

use serde::Serialize;
use sitescope_core::{
    Coordinate, EngineConfig, FilterSet, HistorySource, MetricSample, SitePoint, SiteSource,
};

use crate::generation::{RequestCategory, RequestGeneration, RequestTicket};
use crate::markers::MarkerReconciler;
use crate::neighbors::{NeighborOptions, NeighborResult};
use crate::search::SearchQuery;
use crate::selection::{SelectionController, SelectionState};
use crate::surface::MarkerSurface;
use crate::viewport::{ViewportFrame, ViewportFramer, ZoomStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub neighbors: NeighborOptions,
    pub zoom_strategy: ZoomStrategy,
    pub fallback_center: Coordinate,
    pub history_days: u32,
}

impl SessionOptions {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            neighbors: NeighborOptions {
                radius_km: config.neighbor_radius_km,
                cap: config.neighbor_cap,
            },
            zoom_strategy: ZoomStrategy::from_kind(config.zoom_strategy),
            fallback_center: config.fallback_center,
            history_days: config.history_days,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Notifications for the host, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SelectionChanged {
        focal_id: Option<String>,
    },
    NeighborsChanged {
        neighbors: Option<NeighborResult>,
    },
    ViewportChanged {
        frame: ViewportFrame,
    },
    WorkingSetChanged {
        total: usize,
        mapped: usize,
    },
    HistoryReady {
        site_id: String,
        samples: Vec<MetricSample>,
    },
    DatasetFailed {
        message: String,
    },
}

/// A dataset refresh the host should run against a [`SiteSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRequest {
    pub ticket: RequestTicket,
    pub filters: FilterSet,
}

/// A history fetch the host should run against a [`HistorySource`].
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub ticket: RequestTicket,
    pub site_id: String,
    pub days: u32,
}

/// What happened to a response handed back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Failed,
    /// A newer request of the same category was issued; nothing changed.
    Stale,
}

pub struct MapSession<S: MarkerSurface> {
    options: SessionOptions,
    dataset: Vec<SitePoint>,
    query: SearchQuery,
    working_set: Vec<SitePoint>,
    selection: SelectionController,
    framer: ViewportFramer,
    markers: MarkerReconciler<S>,
    dataset_generation: RequestGeneration,
    history_generation: RequestGeneration,
    events: Vec<SessionEvent>,
}

impl<S: MarkerSurface> MapSession<S> {
    pub fn new(surface: S, options: SessionOptions) -> Self {
        Self {
            options,
            dataset: Vec::new(),
            query: SearchQuery::default(),
            working_set: Vec::new(),
            selection: SelectionController::new(options.neighbors),
            framer: ViewportFramer::new(options.zoom_strategy, options.fallback_center),
            markers: MarkerReconciler::new(surface),
            dataset_generation: RequestGeneration::new(RequestCategory::Dataset),
            history_generation: RequestGeneration::new(RequestCategory::History),
            events: Vec::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Rows as last received from the source, before text search.
    pub fn dataset(&self) -> &[SitePoint] {
        &self.dataset
    }

    /// Rows the map and neighbour search operate on.
    pub fn working_set(&self) -> &[SitePoint] {
        &self.working_set
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn markers(&self) -> &MarkerReconciler<S> {
        &self.markers
    }

    pub fn framer(&self) -> &ViewportFramer {
        &self.framer
    }

    pub fn surface(&self) -> &S {
        self.markers.surface()
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Upstream filters changed. The selection is cleared right away and the
    /// returned request supersedes any dataset request still in flight.
    pub fn request_dataset(&mut self, filters: FilterSet) -> DatasetRequest {
        let ticket = self.dataset_generation.issue();
        self.clear_selection();
        self.markers.reconcile(
            &self.working_set,
            self.selection.state(),
            &mut self.framer,
            false,
        );
        tracing::debug!(generation = ticket.generation, "dataset requested");
        DatasetRequest { ticket, filters }
    }

    /// Hand back the result of a [`DatasetRequest`].
    ///
    /// A failed fetch empties the working set and queues
    /// [`SessionEvent::DatasetFailed`]; it is never returned as an error.
    pub fn apply_dataset<E: Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<SitePoint>, E>,
    ) -> ApplyOutcome {
        if !self.dataset_generation.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.dataset_generation.latest(),
                "discarding stale dataset response"
            );
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(points) => {
                self.set_working_set(points);
                ApplyOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "dataset fetch failed; showing no data");
                self.set_working_set(Vec::new());
                self.events.push(SessionEvent::DatasetFailed {
                    message: e.to_string(),
                });
                ApplyOutcome::Failed
            }
        }
    }

    /// Replace the dataset wholesale. Clears the selection and reframes.
    pub fn set_working_set(&mut self, points: Vec<SitePoint>) {
        self.dataset = points;
        self.clear_selection();
        self.rebuild();
    }

    /// Narrow the dataset by free text. Clears the selection and reframes.
    pub fn set_search_query(&mut self, query: SearchQuery) {
        self.query = query;
        self.clear_selection();
        self.rebuild();
    }

    /// Select a site by id, or reset with `None`.
    ///
    /// Returns a history request when the focal site changed. Selecting the
    /// current focal site again reframes and reopens its popup only; an id
    /// outside the working set is ignored.
    pub fn select(&mut self, id: Option<&str>) -> Option<HistoryRequest> {
        let Some(id) = id else {
            self.reset();
            return None;
        };
        let Some(point) = self.working_set.iter().rev().find(|p| p.id == id).cloned() else {
            tracing::debug!(site_id = %id, "ignoring selection of unknown site");
            return None;
        };

        let outcome = self.selection.interact(&point, &self.working_set);
        let (_, frame) = self.markers.reconcile(
            &self.working_set,
            self.selection.state(),
            &mut self.framer,
            true,
        );

        if !outcome.focal_changed() {
            self.markers.reopen_selected_popup();
            self.push_frame(frame);
            return None;
        }

        self.events.push(SessionEvent::SelectionChanged {
            focal_id: Some(point.id.clone()),
        });
        self.events.push(SessionEvent::NeighborsChanged {
            neighbors: self.selection.state().neighbors().cloned(),
        });
        self.push_frame(frame);

        let ticket = self.history_generation.issue();
        tracing::debug!(
            site_id = %point.id,
            generation = ticket.generation,
            "history requested"
        );
        Some(HistoryRequest {
            ticket,
            site_id: point.id,
            days: self.options.history_days,
        })
    }

    /// Explicit reset: drop the selection and frame the whole working set.
    pub fn reset(&mut self) {
        self.clear_selection();
        let (_, frame) = self.markers.reconcile(
            &self.working_set,
            self.selection.state(),
            &mut self.framer,
            true,
        );
        self.push_frame(frame);
    }

    /// Return to the view before the last reframe. The selection is untouched.
    pub fn secondary_interaction(&mut self) -> Option<ViewportFrame> {
        let frame = self.framer.restore_previous()?;
        self.markers.surface_mut().set_view(frame);
        self.events.push(SessionEvent::ViewportChanged { frame });
        Some(frame)
    }

    /// The user panned or zoomed the map by hand.
    pub fn record_user_view(&mut self, frame: ViewportFrame) {
        self.framer.record_user_view(frame);
    }

    pub fn hover_enter(&mut self, id: &str) {
        self.markers.hover_enter(id);
    }

    pub fn hover_exit(&mut self, id: &str) {
        self.markers.hover_exit(id);
    }

    /// A marker was clicked; behaves like [`MapSession::select`].
    pub fn activate(&mut self, id: &str) -> Option<HistoryRequest> {
        let id = self.markers.activate(id)?;
        self.select(Some(&id))
    }

    /// Hand back the result of a [`HistoryRequest`].
    ///
    /// A failed fetch is reported as an empty history.
    pub fn apply_history<E: Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<MetricSample>, E>,
    ) -> ApplyOutcome {
        if !self.history_generation.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.history_generation.latest(),
                "discarding stale history response"
            );
            return ApplyOutcome::Stale;
        }
        let Some(site_id) = self.selection.state().focal_id().map(str::to_owned) else {
            return ApplyOutcome::Stale;
        };
        let (mut samples, outcome) = match result {
            Ok(samples) => (samples, ApplyOutcome::Applied),
            Err(e) => {
                tracing::warn!(site_id = %site_id, error = %e, "history fetch failed");
                (Vec::new(), ApplyOutcome::Failed)
            }
        };
        samples.sort_by_key(|s| s.date);
        self.events.push(SessionEvent::HistoryReady { site_id, samples });
        outcome
    }

    fn clear_selection(&mut self) {
        self.history_generation.invalidate();
        if self.selection.filter_changed() {
            self.events.push(SessionEvent::SelectionChanged { focal_id: None });
            self.events.push(SessionEvent::NeighborsChanged { neighbors: None });
        }
    }

    fn rebuild(&mut self) {
        self.working_set = if self.query.is_empty() {
            self.dataset.clone()
        } else {
            self.query.filter(&self.dataset)
        };
        let (stats, frame) = self.markers.reconcile(
            &self.working_set,
            self.selection.state(),
            &mut self.framer,
            true,
        );
        self.events.push(SessionEvent::WorkingSetChanged {
            total: self.working_set.len(),
            mapped: self.working_set.len() - stats.skipped,
        });
        self.push_frame(frame);
    }

    fn push_frame(&mut self, frame: Option<ViewportFrame>) {
        if let Some(frame) = frame {
            self.events.push(SessionEvent::ViewportChanged { frame });
        }
    }
}

/// Run a [`DatasetRequest`] against a source.
///
/// # Errors
///
/// Returns the source's error unchanged; pass it to
/// [`MapSession::apply_dataset`].
pub async fn fetch_dataset<Src: SiteSource>(
    source: &Src,
    request: &DatasetRequest,
) -> Result<Vec<SitePoint>, Src::Error> {
    source.fetch_sites(&request.filters).await
}

/// Run a [`HistoryRequest`] against a source.
///
/// # Errors
///
/// Returns the source's error unchanged; pass it to
/// [`MapSession::apply_history`].
pub async fn fetch_history<Src: HistorySource>(
    source: &Src,
    request: &HistoryRequest,
) -> Result<Vec<MetricSample>, Src::Error> {
    source.fetch_history(&request.site_id, request.days).await
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
