//! Marker reconciliation.
//!
//! After every pass the markers on the surface are exactly the
//! coordinate-valid sites of the working set, each styled from the current
//! selection. The reconciler is the only owner of marker handles; it diffs
//! against its `id -> handle` map rather than clearing and rebuilding.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sitescope_core::{Coordinate, SitePoint};

use crate::selection::SelectionState;
use crate::surface::{MarkerSurface, PopupContent};
use crate::viewport::{ViewportFrame, ViewportFramer};

/// Marker styling, recomputed on every pass. Selected > Neighbor > Default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerVisualState {
    Default,
    Selected,
    Neighbor,
}

#[derive(Debug)]
struct MarkerEntry<H> {
    handle: H,
    at: Coordinate,
    style: MarkerVisualState,
    popup: PopupContent,
    popup_open: bool,
}

/// Counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Working-set rows skipped for lack of a valid coordinate.
    pub skipped: usize,
}

pub struct MarkerReconciler<S: MarkerSurface> {
    surface: S,
    markers: HashMap<String, MarkerEntry<S::Handle>>,
    selected: Option<String>,
    hovered: Option<String>,
}

impl<S: MarkerSurface> MarkerReconciler<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            markers: HashMap::new(),
            selected: None,
            hovered: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Ids with a live marker, sorted.
    pub fn rendered_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.markers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn visual_state(&self, id: &str) -> Option<MarkerVisualState> {
        self.markers.get(id).map(|m| m.style)
    }

    pub fn is_popup_open(&self, id: &str) -> bool {
        self.markers.get(id).is_some_and(|m| m.popup_open)
    }

    /// Bring the surface in line with `working_set` and `selection`.
    ///
    /// When `reframe` is set the view is framed on the focal site if a
    /// selection is active, otherwise on the whole working set. Returns the
    /// pass statistics and the new frame, if any.
    pub fn reconcile(
        &mut self,
        working_set: &[SitePoint],
        selection: &SelectionState,
        framer: &mut ViewportFramer,
        reframe: bool,
    ) -> (ReconcileStats, Option<ViewportFrame>) {
        let mut stats = ReconcileStats::default();

        // Later rows overwrite earlier ones with the same id, including a
        // later row without a coordinate.
        let mut desired: HashMap<&str, (&SitePoint, Coordinate)> = HashMap::new();
        for site in working_set {
            match site.coordinate() {
                Some(at) => {
                    desired.insert(site.id.as_str(), (site, at));
                }
                None => {
                    desired.remove(site.id.as_str());
                    stats.skipped += 1;
                }
            }
        }

        let stale: Vec<String> = self
            .markers
            .keys()
            .filter(|id| !desired.contains_key(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(entry) = self.markers.remove(&id) {
                if entry.popup_open {
                    self.surface.close_popup(&entry.handle);
                }
                self.surface.remove_marker(entry.handle);
                stats.removed += 1;
            }
        }

        let neighbor_ids: HashSet<&str> = selection
            .neighbors()
            .map(|n| n.ids().collect())
            .unwrap_or_default();
        let focal_id = selection.focal_id();
        let style_of = |id: &str| {
            if focal_id == Some(id) {
                MarkerVisualState::Selected
            } else if neighbor_ids.contains(id) {
                MarkerVisualState::Neighbor
            } else {
                MarkerVisualState::Default
            }
        };

        for (id, (site, at)) in &desired {
            let style = style_of(*id);
            let popup = PopupContent::for_site(site);
            if let Some(entry) = self.markers.get_mut(*id) {
                let mut touched = false;
                if entry.at != *at {
                    self.surface.move_marker(&entry.handle, *at);
                    entry.at = *at;
                    touched = true;
                }
                if entry.style != style {
                    self.surface.restyle_marker(&entry.handle, style);
                    entry.style = style;
                    touched = true;
                }
                if entry.popup != popup {
                    if entry.popup_open {
                        self.surface.open_popup(&entry.handle, &popup);
                    }
                    entry.popup = popup;
                    touched = true;
                }
                if touched {
                    stats.updated += 1;
                }
            } else {
                let handle = self.surface.create_marker(id, *at, style);
                self.markers.insert(
                    (*id).to_string(),
                    MarkerEntry {
                        handle,
                        at: *at,
                        style,
                        popup,
                        popup_open: false,
                    },
                );
                stats.created += 1;
            }
        }

        self.selected = focal_id
            .filter(|id| self.markers.contains_key(*id))
            .map(str::to_owned);
        if self
            .hovered
            .as_deref()
            .is_some_and(|id| !self.markers.contains_key(id))
        {
            self.hovered = None;
        }
        self.sync_popups();

        // A focal site without a coordinate leaves the view where it is.
        let frame = match (reframe, focal_id) {
            (false, _) => None,
            (true, Some(id)) => desired.get(id).and_then(|(site, _)| framer.focus(site)),
            (true, None) => Some(framer.frame_working_set(working_set)),
        };
        if let Some(frame) = frame {
            self.surface.set_view(frame);
        }

        tracing::debug!(
            created = stats.created,
            updated = stats.updated,
            removed = stats.removed,
            skipped = stats.skipped,
            live = self.markers.len(),
            "markers reconciled"
        );
        (stats, frame)
    }

    /// Pointer entered a marker: show its popup.
    pub fn hover_enter(&mut self, id: &str) {
        if !self.markers.contains_key(id) {
            return;
        }
        self.hovered = Some(id.to_string());
        self.sync_popups();
    }

    /// Pointer left a marker: hide its popup unless it is the selection.
    pub fn hover_exit(&mut self, id: &str) {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
            self.sync_popups();
        }
    }

    /// A marker was clicked. Returns the id to hand to the selection
    /// controller, or `None` for an unknown marker.
    pub fn activate(&self, id: &str) -> Option<String> {
        self.markers.contains_key(id).then(|| id.to_string())
    }

    /// Reopen the selected marker's popup (after a re-selection).
    pub fn reopen_selected_popup(&mut self) {
        let Some(id) = self.selected.as_deref() else {
            return;
        };
        if let Some(entry) = self.markers.get_mut(id) {
            self.surface.open_popup(&entry.handle, &entry.popup);
            entry.popup_open = true;
        }
    }

    /// Remove every marker from the surface.
    pub fn clear(&mut self) {
        for (_, entry) in self.markers.drain() {
            if entry.popup_open {
                self.surface.close_popup(&entry.handle);
            }
            self.surface.remove_marker(entry.handle);
        }
        self.selected = None;
        self.hovered = None;
    }

    /// A popup is open exactly for the selected and the hovered marker.
    fn sync_popups(&mut self) {
        for (id, entry) in &mut self.markers {
            let want_open = self.selected.as_deref() == Some(id.as_str())
                || self.hovered.as_deref() == Some(id.as_str());
            if want_open && !entry.popup_open {
                self.surface.open_popup(&entry.handle, &entry.popup);
                entry.popup_open = true;
            } else if !want_open && entry.popup_open {
                self.surface.close_popup(&entry.handle);
                entry.popup_open = false;
            }
        }
    }
}

#[cfg(test)]
#[path = "markers_test.rs"]
mod tests;
