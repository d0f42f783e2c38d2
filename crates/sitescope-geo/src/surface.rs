//! The rendering seam between the engine and a map toolkit.
//!
//! A surface draws markers and popups and moves the camera. It is also
//! responsible for wiring pointer events on a marker back to the host as
//! `hover_enter(id)`, `hover_exit(id)` and `activate(id)`; removing a marker
//! must release whatever it bound when the marker was created.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use sitescope_core::{Coordinate, SitePoint};

use crate::markers::MarkerVisualState;
use crate::viewport::ViewportFrame;

/// Text shown in a marker's info popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl PopupContent {
    #[must_use]
    pub fn for_site(site: &SitePoint) -> Self {
        let attrs = &site.attributes;
        let mut lines = vec![format!("Site ID: {}", site.id)];
        if let Some(address) = attrs.address.as_deref().filter(|a| !a.trim().is_empty()) {
            lines.push(address.trim().to_string());
        }
        let area = [attrs.region.as_deref(), attrs.grid.as_deref(), attrs.district.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>();
        if !area.is_empty() {
            lines.push(area.join(" / "));
        }
        if let Some(class) = attrs.classification.as_deref() {
            lines.push(format!("Class: {class}"));
        }
        Self {
            title: site.label().to_string(),
            lines,
        }
    }
}

/// A map toolkit that can host markers.
///
/// All operations are infallible from the engine's point of view: a toolkit
/// that fails internally should log and carry on.
pub trait MarkerSurface {
    type Handle;

    /// Draw a marker and bind its hover and click events to `id`.
    fn create_marker(&mut self, id: &str, at: Coordinate, style: MarkerVisualState)
        -> Self::Handle;

    fn move_marker(&mut self, handle: &Self::Handle, at: Coordinate);

    fn restyle_marker(&mut self, handle: &Self::Handle, style: MarkerVisualState);

    /// Remove the marker, its popup, and every listener bound to it.
    fn remove_marker(&mut self, handle: Self::Handle);

    fn open_popup(&mut self, handle: &Self::Handle, content: &PopupContent);

    fn close_popup(&mut self, handle: &Self::Handle);

    fn set_view(&mut self, frame: ViewportFrame);
}

/// A marker as held by [`InMemorySurface`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMarker {
    pub id: String,
    pub at: Coordinate,
    pub style: MarkerVisualState,
    pub popup: Option<PopupContent>,
}

/// Headless surface that keeps rendered state in memory.
///
/// Used by the CLI to report what a map would show, and by tests to check
/// that nothing leaks between passes.
#[derive(Debug, Default)]
pub struct InMemorySurface {
    next_handle: u64,
    markers: HashMap<u64, RenderedMarker>,
    listeners: HashSet<u64>,
    view: Option<ViewportFrame>,
    created: usize,
    removed: usize,
}

impl InMemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered markers keyed by site id.
    #[must_use]
    pub fn markers(&self) -> BTreeMap<&str, &RenderedMarker> {
        self.markers.values().map(|m| (m.id.as_str(), m)).collect()
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn open_popup_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .markers
            .values()
            .filter(|m| m.popup.is_some())
            .map(|m| m.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of markers that still have listeners bound.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn view(&self) -> Option<ViewportFrame> {
        self.view
    }

    #[must_use]
    pub fn created(&self) -> usize {
        self.created
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl MarkerSurface for InMemorySurface {
    type Handle = u64;

    fn create_marker(&mut self, id: &str, at: Coordinate, style: MarkerVisualState) -> u64 {
        self.next_handle += 1;
        let handle = self.next_handle;
        self.markers.insert(
            handle,
            RenderedMarker {
                id: id.to_string(),
                at,
                style,
                popup: None,
            },
        );
        self.listeners.insert(handle);
        self.created += 1;
        handle
    }

    fn move_marker(&mut self, handle: &u64, at: Coordinate) {
        if let Some(marker) = self.markers.get_mut(handle) {
            marker.at = at;
        }
    }

    fn restyle_marker(&mut self, handle: &u64, style: MarkerVisualState) {
        if let Some(marker) = self.markers.get_mut(handle) {
            marker.style = style;
        }
    }

    fn remove_marker(&mut self, handle: u64) {
        if self.markers.remove(&handle).is_some() {
            self.removed += 1;
        }
        self.listeners.remove(&handle);
    }

    fn open_popup(&mut self, handle: &u64, content: &PopupContent) {
        if let Some(marker) = self.markers.get_mut(handle) {
            marker.popup = Some(content.clone());
        }
    }

    fn close_popup(&mut self, handle: &u64) {
        if let Some(marker) = self.markers.get_mut(handle) {
            marker.popup = None;
        }
    }

    fn set_view(&mut self, frame: ViewportFrame) {
        self.view = Some(frame);
    }
}
