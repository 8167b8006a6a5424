//! Two-way binding between the navigation state and the location fragment.

use std::collections::VecDeque;

use phrase_core::Route;
use tracing::{debug, trace};

//
// ─── LOCATION ──────────────────────────────────────────────────────────────────
//

/// The address bar, reduced to its fragment.
///
/// Writing a fragment behaves like a history push: it produces a change
/// notification that the host delivers back through [`UrlSync::on_change`].
pub trait Location {
    fn fragment(&self) -> String;
    fn set_fragment(&mut self, fragment: &str);
}

/// History stack kept in memory, with a queue of pending change events.
#[derive(Clone, Debug)]
pub struct MemoryHistory {
    entries: Vec<String>,
    position: usize,
    changes: VecDeque<String>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("#/")
    }
}

impl MemoryHistory {
    /// A history whose only entry is `fragment`. No change is queued for it.
    #[must_use]
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            entries: vec![fragment.into()],
            position: 0,
            changes: VecDeque::new(),
        }
    }

    /// Step back one entry. Returns `false` at the oldest entry.
    pub fn back(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.queue_current();
        true
    }

    /// Step forward one entry. Returns `false` at the newest entry.
    pub fn forward(&mut self) -> bool {
        if self.position + 1 >= self.entries.len() {
            return false;
        }
        self.position += 1;
        self.queue_current();
        true
    }

    /// Drain change notifications in the order they happened.
    pub fn take_changes(&mut self) -> Vec<String> {
        self.changes.drain(..).collect()
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    fn queue_current(&mut self) {
        let current = self.entries[self.position].clone();
        self.changes.push_back(current);
    }
}

impl Location for MemoryHistory {
    fn fragment(&self) -> String {
        self.entries[self.position].clone()
    }

    fn set_fragment(&mut self, fragment: &str) {
        self.entries.truncate(self.position + 1);
        self.entries.push(fragment.to_owned());
        self.position = self.entries.len() - 1;
        self.changes.push_back(fragment.to_owned());
    }
}

//
// ─── SYNC ──────────────────────────────────────────────────────────────────────
//

/// Mirrors state into the location and turns external location changes back
/// into routes.
///
/// Every write arms one ignore token, so the change notification it causes is
/// swallowed rather than re-applied. Changes that arrive before the initial
/// route was applied are held until [`UrlSync::mark_ready`].
#[derive(Debug, Default)]
pub struct UrlSync {
    ignore_pending: usize,
    ready: bool,
    suspended: bool,
    deferred: Option<String>,
}

impl UrlSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the location as it stands at startup.
    #[must_use]
    pub fn initial_route<L: Location>(&self, location: &L) -> Route {
        Route::parse(&location.fragment())
    }

    /// Mark the initial route as applied. Returns a change that arrived in
    /// the meantime, at most once.
    pub fn mark_ready(&mut self) -> Option<Route> {
        self.ready = true;
        self.deferred.take().map(|fragment| Route::parse(&fragment))
    }

    /// Stop writing state into the location until [`UrlSync::resume`].
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Write `route` into the location. Returns whether anything was written.
    ///
    /// Writes are skipped while not ready, while suspended, or when the
    /// fragment is already current.
    pub fn write<L: Location>(&mut self, location: &mut L, route: &Route) -> bool {
        if !self.ready || self.suspended {
            return false;
        }
        let fragment = route.to_fragment();
        if location.fragment() == fragment {
            trace!(%fragment, "location already current");
            return false;
        }
        self.ignore_pending += 1;
        debug!(%fragment, "writing location");
        location.set_fragment(&fragment);
        true
    }

    /// Handle a location change notification.
    ///
    /// Returns the route to apply, or `None` when the change was caused by
    /// [`UrlSync::write`] or has been deferred until ready.
    pub fn on_change(&mut self, fragment: &str) -> Option<Route> {
        if self.ignore_pending > 0 {
            self.ignore_pending -= 1;
            trace!(%fragment, "ignoring self-initiated change");
            return None;
        }
        if !self.ready {
            debug!(%fragment, "deferring location change until ready");
            self.deferred = Some(fragment.to_owned());
            return None;
        }
        Some(Route::parse(fragment))
    }
}
