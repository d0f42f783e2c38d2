//! Proximity search, viewport framing and marker synchronization for a map
//! of field sites.

pub mod distance;
pub mod generation;
pub mod markers;
pub mod neighbors;
pub mod search;
pub mod selection;
pub mod session;
pub mod surface;
pub mod viewport;

pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use generation::{RequestCategory, RequestGeneration, RequestTicket};
pub use markers::{MarkerReconciler, MarkerVisualState, ReconcileStats};
pub use neighbors::{
    find_neighbors, Neighbor, NeighborOptions, NeighborResult, DEFAULT_NEIGHBOR_CAP,
    DEFAULT_RADIUS_KM,
};
pub use search::{contains_all, tokenize, CompiledQuery, SearchQuery};
pub use selection::{SelectionController, SelectionOutcome, SelectionState};
pub use session::{
    fetch_dataset, fetch_history, ApplyOutcome, DatasetRequest, HistoryRequest, MapSession,
    SessionEvent, SessionOptions,
};
pub use surface::{InMemorySurface, MarkerSurface, PopupContent, RenderedMarker};
pub use viewport::{
    centroid, zoom_for_count, zoom_to_fit, ViewportFrame, ViewportFramer, ZoomStrategy,
};
