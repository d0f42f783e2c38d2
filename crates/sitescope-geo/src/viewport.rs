//! Map viewport framing: centroid, zoom choice, and one-step view memory.

use serde::Serialize;
use sitescope_core::{Coordinate, SitePoint, ZoomStrategyKind};

/// A map view: center plus a discrete zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportFrame {
    pub center: Coordinate,
    pub zoom: u8,
}

/// How a zoom level is chosen for a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStrategy {
    /// More than `far_threshold` points -> `far_zoom`; at least
    /// `medium_threshold` -> `medium_zoom`; otherwise `near_zoom`.
    PointCount {
        far_threshold: usize,
        medium_threshold: usize,
        far_zoom: u8,
        medium_zoom: u8,
        near_zoom: u8,
    },
    /// Largest zoom whose visible span still contains the bounding box.
    FitBounds { min_zoom: u8, max_zoom: u8 },
}

impl ZoomStrategy {
    #[must_use]
    pub fn point_count() -> Self {
        ZoomStrategy::PointCount {
            far_threshold: 50,
            medium_threshold: 10,
            far_zoom: 7,
            medium_zoom: 9,
            near_zoom: 11,
        }
    }

    #[must_use]
    pub fn fit_bounds() -> Self {
        ZoomStrategy::FitBounds {
            min_zoom: 3,
            max_zoom: 16,
        }
    }

    #[must_use]
    pub fn from_kind(kind: ZoomStrategyKind) -> Self {
        match kind {
            ZoomStrategyKind::PointCount => Self::point_count(),
            ZoomStrategyKind::FitBounds => Self::fit_bounds(),
        }
    }
}

impl Default for ZoomStrategy {
    fn default() -> Self {
        Self::point_count()
    }
}

/// Arithmetic mean of the valid coordinates, or `None` if there are none.
#[must_use]
pub fn centroid(points: &[SitePoint]) -> Option<Coordinate> {
    let (sum_lat, sum_lon, n) = points
        .iter()
        .filter_map(SitePoint::coordinate)
        .fold((0.0_f64, 0.0_f64, 0_usize), |(la, lo, n), c| {
            (la + c.lat, lo + c.lon, n + 1)
        });
    if n == 0 {
        return None;
    }
    // Working sets are at most a few thousand points.
    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    Some(Coordinate::new(sum_lat / n, sum_lon / n))
}

/// Bucket a point count into a zoom level.
#[must_use]
pub fn zoom_for_count(
    count: usize,
    far_threshold: usize,
    medium_threshold: usize,
    zooms: (u8, u8, u8),
) -> u8 {
    let (far, medium, near) = zooms;
    if count > far_threshold {
        far
    } else if count >= medium_threshold {
        medium
    } else {
        near
    }
}

/// Pick the largest zoom whose single-tile span covers the bounding box of
/// `coords`, clamped to `[min_zoom, max_zoom]`.
// `raw` is clamped into the u8 zoom range before the cast.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn zoom_to_fit(coords: &[Coordinate], min_zoom: u8, max_zoom: u8) -> u8 {
    // Leave a margin so edge markers are not drawn on the border.
    const PADDING: f64 = 1.2;

    let Some(first) = coords.first() else {
        return min_zoom;
    };
    let mercator_y = |lat: f64| {
        let clamped = lat.clamp(-85.0511, 85.0511).to_radians();
        (std::f64::consts::FRAC_PI_4 + clamped / 2.0)
            .tan()
            .ln()
            .to_degrees()
    };

    let init = (first.lon, first.lon, mercator_y(first.lat), mercator_y(first.lat));
    let (min_x, max_x, min_y, max_y) = coords.iter().fold(init, |(x0, x1, y0, y1), c| {
        let y = mercator_y(c.lat);
        (x0.min(c.lon), x1.max(c.lon), y0.min(y), y1.max(y))
    });

    let span = (max_x - min_x).max(max_y - min_y) * PADDING;
    if span <= f64::EPSILON {
        return max_zoom;
    }

    let raw = (360.0 / span).log2().floor();
    raw.clamp(f64::from(min_zoom), f64::from(max_zoom)) as u8
}

/// Frames the map around point sets and remembers the view it replaced.
#[derive(Debug, Clone)]
pub struct ViewportFramer {
    strategy: ZoomStrategy,
    fallback: Coordinate,
    /// Minimum zoom when focusing on a single selected site.
    focus_zoom: u8,
    current: Option<ViewportFrame>,
    previous: Option<ViewportFrame>,
}

impl ViewportFramer {
    #[must_use]
    pub fn new(strategy: ZoomStrategy, fallback: Coordinate) -> Self {
        Self {
            strategy,
            fallback,
            focus_zoom: 14,
            current: None,
            previous: None,
        }
    }

    #[must_use]
    pub fn with_focus_zoom(mut self, focus_zoom: u8) -> Self {
        self.focus_zoom = focus_zoom;
        self
    }

    #[must_use]
    pub fn current(&self) -> Option<ViewportFrame> {
        self.current
    }

    #[must_use]
    pub fn previous(&self) -> Option<ViewportFrame> {
        self.previous
    }

    /// Centroid of the valid coordinates, or the configured fallback.
    #[must_use]
    pub fn centroid(&self, points: &[SitePoint]) -> Coordinate {
        centroid(points).unwrap_or(self.fallback)
    }

    #[must_use]
    pub fn zoom_for(&self, points: &[SitePoint]) -> u8 {
        match self.strategy {
            ZoomStrategy::PointCount {
                far_threshold,
                medium_threshold,
                far_zoom,
                medium_zoom,
                near_zoom,
            } => {
                let count = points.iter().filter(|p| p.has_coordinate()).count();
                zoom_for_count(
                    count,
                    far_threshold,
                    medium_threshold,
                    (far_zoom, medium_zoom, near_zoom),
                )
            }
            ZoomStrategy::FitBounds { min_zoom, max_zoom } => {
                let coords: Vec<Coordinate> =
                    points.iter().filter_map(SitePoint::coordinate).collect();
                zoom_to_fit(&coords, min_zoom, max_zoom)
            }
        }
    }

    /// The frame for `points` without changing any state.
    #[must_use]
    pub fn frame_for(&self, points: &[SitePoint]) -> ViewportFrame {
        ViewportFrame {
            center: self.centroid(points),
            zoom: self.zoom_for(points),
        }
    }

    /// Reframe around the whole working set.
    pub fn frame_working_set(&mut self, points: &[SitePoint]) -> ViewportFrame {
        let frame = self.frame_for(points);
        self.apply(frame)
    }

    /// Reframe tightly around one site. Returns `None` (and leaves the view
    /// alone) when the site has no coordinate.
    pub fn focus(&mut self, point: &SitePoint) -> Option<ViewportFrame> {
        let center = point.coordinate()?;
        let zoom = self.zoom_for(std::slice::from_ref(point)).max(self.focus_zoom);
        Some(self.apply(ViewportFrame { center, zoom }))
    }

    /// Return to the view recorded before the last reframe.
    ///
    /// The view being left becomes the new previous view, so a second call
    /// toggles back.
    pub fn restore_previous(&mut self) -> Option<ViewportFrame> {
        let target = self.previous?;
        self.previous = self.current;
        self.current = Some(target);
        Some(target)
    }

    /// Record a view the user reached by panning or zooming by hand.
    pub fn record_user_view(&mut self, frame: ViewportFrame) {
        self.current = Some(frame);
    }

    /// Reapplying the current frame keeps the previous view.
    fn apply(&mut self, frame: ViewportFrame) -> ViewportFrame {
        if self.current.is_some_and(|current| current != frame) {
            self.previous = self.current;
        }
        self.current = Some(frame);
        frame
    }
}
