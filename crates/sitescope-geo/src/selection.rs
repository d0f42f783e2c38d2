//! Selection state machine.
//!
//! `Unselected` and `Selected(focal_id)`; the neighbour set is derived on
//! entry and dropped with the selection.

use sitescope_core::SitePoint;

use crate::markers::MarkerVisualState;
use crate::neighbors::{find_neighbors, NeighborOptions, NeighborResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected {
        focal_id: String,
        neighbors: NeighborResult,
    },
}

impl SelectionState {
    #[must_use]
    pub fn focal_id(&self) -> Option<&str> {
        match self {
            SelectionState::Unselected => None,
            SelectionState::Selected { focal_id, .. } => Some(focal_id),
        }
    }

    #[must_use]
    pub fn neighbors(&self) -> Option<&NeighborResult> {
        match self {
            SelectionState::Unselected => None,
            SelectionState::Selected { neighbors, .. } => Some(neighbors),
        }
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionState::Selected { .. })
    }

    /// Visual state of one marker; Selected wins over Neighbor.
    #[must_use]
    pub fn visual_state(&self, id: &str) -> MarkerVisualState {
        match self {
            SelectionState::Unselected => MarkerVisualState::Default,
            SelectionState::Selected { focal_id, .. } if focal_id == id => {
                MarkerVisualState::Selected
            }
            SelectionState::Selected { neighbors, .. } if neighbors.contains(id) => {
                MarkerVisualState::Neighbor
            }
            SelectionState::Selected { .. } => MarkerVisualState::Default,
        }
    }
}

/// What an interaction did to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// `Unselected -> Selected(id)`.
    Entered { focal_id: String },
    /// `Selected(from) -> Selected(to)` with a different id.
    Switched { from: String, to: String },
    /// The already-selected site was interacted with again.
    Reselected { focal_id: String },
}

impl SelectionOutcome {
    /// Whether the focal site changed, which is when a history fetch is due.
    #[must_use]
    pub fn focal_changed(&self) -> bool {
        !matches!(self, SelectionOutcome::Reselected { .. })
    }

    #[must_use]
    pub fn focal_id(&self) -> &str {
        match self {
            SelectionOutcome::Entered { focal_id } | SelectionOutcome::Reselected { focal_id } => {
                focal_id
            }
            SelectionOutcome::Switched { to, .. } => to,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
    options: NeighborOptions,
}

impl SelectionController {
    #[must_use]
    pub fn new(options: NeighborOptions) -> Self {
        Self {
            state: SelectionState::Unselected,
            options,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn options(&self) -> NeighborOptions {
        self.options
    }

    /// The user interacted with `point`; neighbours are searched in `dataset`.
    ///
    /// Interacting with the current focal site keeps the existing neighbour
    /// set.
    pub fn interact(&mut self, point: &SitePoint, dataset: &[SitePoint]) -> SelectionOutcome {
        let previous = self.state.focal_id().map(str::to_owned);
        match previous {
            Some(focal_id) if focal_id == point.id => SelectionOutcome::Reselected { focal_id },
            previous => {
                let neighbors = find_neighbors(point, dataset, self.options);
                tracing::debug!(
                    site_id = %point.id,
                    neighbors = neighbors.len(),
                    "site selected"
                );
                self.state = SelectionState::Selected {
                    focal_id: point.id.clone(),
                    neighbors,
                };
                match previous {
                    None => SelectionOutcome::Entered {
                        focal_id: point.id.clone(),
                    },
                    Some(from) => SelectionOutcome::Switched {
                        from,
                        to: point.id.clone(),
                    },
                }
            }
        }
    }

    /// The filtered dataset was rebuilt. Returns `true` if a selection was
    /// cleared.
    pub fn filter_changed(&mut self) -> bool {
        self.clear()
    }

    /// Explicit reset. Returns `true` if a selection was cleared.
    pub fn reset(&mut self) -> bool {
        self.clear()
    }

    fn clear(&mut self) -> bool {
        let was_selected = self.state.is_selected();
        self.state = SelectionState::Unselected;
        was_selected
    }
}
