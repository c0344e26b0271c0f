//! Cancellable request tasks scoped to a mounted view.
//!
//! Every request a view issues runs as a spawned task owned by the view's
//! [`RequestScope`]. Tearing the scope down aborts whatever is still running,
//! and the [`Ticket`] attached to each request lets the router recognise
//! completions that belong to a view which no longer exists.

use std::future::Future;

use tokio::task::JoinHandle;

/// Identifies one request: the mount it was issued from and its order within
/// that mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    mount: u64,
    seq: u64,
}

impl Ticket {
    pub fn new(mount: u64, seq: u64) -> Self {
        Self { mount, seq }
    }

    pub fn mount(&self) -> u64 {
        self.mount
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// The set of in-flight requests belonging to one mounted view.
pub struct RequestScope {
    mount: u64,
    next_seq: u64,
    tasks: Vec<(Ticket, JoinHandle<()>)>,
}

impl RequestScope {
    pub fn new(mount: u64) -> Self {
        Self {
            mount,
            next_seq: 0,
            tasks: Vec::new(),
        }
    }

    pub fn mount(&self) -> u64 {
        self.mount
    }

    /// Spawn a request task. The closure receives the ticket issued for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(&mut self, make: F) -> Ticket
    where
        F: FnOnce(Ticket) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|(_, handle)| !handle.is_finished());

        let ticket = Ticket::new(self.mount, self.next_seq);
        self.next_seq += 1;
        let handle = tokio::spawn(make(ticket));
        self.tasks.push((ticket, handle));
        ticket
    }

    /// Number of requests still running.
    pub fn in_flight(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    /// Forget a request whose completion has been delivered.
    pub fn finish(&mut self, ticket: Ticket) {
        self.tasks.retain(|(t, _)| *t != ticket);
    }

    /// Abort every running request. Returns how many were still running.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for (ticket, handle) in self.tasks.drain(..) {
            if !handle.is_finished() {
                tracing::debug!(?ticket, "cancelling request");
                cancelled += 1;
            }
            handle.abort();
        }
        cancelled
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
