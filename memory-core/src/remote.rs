//! Three-state results for data a view is waiting on.

use std::fmt::Display;

use crate::task::Ticket;

/// Data fetched from the backend, as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Remote<T> {
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Remote::Pending
    }
}

impl<T> Remote<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Remote::Ready(value),
            Err(e) => Remote::Failed(e.to_string()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Remote::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Remote::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Remote::Failed(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Failure reason, if the request failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Remote::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Remote<U> {
        match self {
            Remote::Pending => Remote::Pending,
            Remote::Ready(value) => Remote::Ready(f(value)),
            Remote::Failed(reason) => Remote::Failed(reason),
        }
    }
}

/// A [`Remote`] that remembers which request it is waiting for.
///
/// Only the completion carrying the awaited ticket may resolve the slot, so a
/// reload that overtakes an older request never shows the older answer.
#[derive(Debug, Clone)]
pub struct RemoteSlot<T> {
    value: Remote<T>,
    awaiting: Option<Ticket>,
}

impl<T> Default for RemoteSlot<T> {
    fn default() -> Self {
        Self {
            value: Remote::Pending,
            awaiting: None,
        }
    }
}

impl<T> RemoteSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &Remote<T> {
        &self.value
    }

    /// Mark the slot as loading on behalf of `ticket`.
    pub fn begin(&mut self, ticket: Ticket) {
        self.value = Remote::Pending;
        self.awaiting = Some(ticket);
    }

    pub fn is_loading(&self) -> bool {
        self.awaiting.is_some()
    }

    /// Resolve the slot. Returns false if `ticket` is not the one awaited.
    pub fn resolve<E: Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> bool {
        if self.awaiting != Some(ticket) {
            tracing::debug!(?ticket, awaiting = ?self.awaiting, "ignoring superseded response");
            return false;
        }
        self.awaiting = None;
        self.value = Remote::from_result(result);
        true
    }
}
