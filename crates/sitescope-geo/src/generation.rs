//! Last-request-wins bookkeeping for asynchronous fetches.
//!
//! Each fetch category owns a monotonically increasing counter. Issuing a
//! request bumps the counter and hands out a ticket; a response may only be
//! applied while its ticket still carries the latest generation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    /// Working-set refresh after a filter change.
    Dataset,
    /// Per-site metric history for the selected site.
    History,
}

impl std::fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestCategory::Dataset => write!(f, "dataset"),
            RequestCategory::History => write!(f, "history"),
        }
    }
}

/// Proof of which request a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestTicket {
    pub category: RequestCategory,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct RequestGeneration {
    category: RequestCategory,
    latest: u64,
}

impl RequestGeneration {
    #[must_use]
    pub fn new(category: RequestCategory) -> Self {
        Self {
            category,
            latest: 0,
        }
    }

    /// Issue a new ticket, superseding every earlier one.
    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket {
            category: self.category,
            generation: self.latest,
        }
    }

    /// Supersede every outstanding ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.category == self.category && ticket.generation == self.latest
    }

    #[must_use]
    pub fn latest(&self) -> u64 {
        self.latest
    }
}
