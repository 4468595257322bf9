//! Apply-cycle identity and supersession.
//!
//! Every apply cycle runs under a [`Process`]. Starting a new process
//! cancels the previous one's token and makes it stale: population code
//! checks [`Process::is_current`] before each insertion, so a superseded
//! cycle can never write into the rendered item group.
//!
//! A finished process publishes how it [`Settled`], so callers whose request
//! matches the in-flight one can wait for its result instead of starting
//! another cycle.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_listing_core::CancellationToken;
use horizon_listing_core::logging::targets;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::params::SearchParams;

/// Identifier of one apply cycle. Ids increase monotonically per listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one apply cycle.
#[derive(Debug, Clone)]
pub struct Process {
    id: ProcessId,
    token: CancellationToken,
    current: Arc<AtomicU64>,
}

impl Process {
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Token cancelled when this process is superseded.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether this is still the newest process of its listing.
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id.0 && !self.token.is_cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// How a finished process ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Settled {
    Applied(SearchParams),
    Failed(String),
}

pub(crate) type SettledReceiver = watch::Receiver<Option<(ProcessId, Settled)>>;

/// Hands out processes and remembers which one is in flight.
#[derive(Debug)]
pub(crate) struct ProcessTracker {
    current: Arc<AtomicU64>,
    next: AtomicU64,
    active: Mutex<Option<Process>>,
    settled: watch::Sender<Option<(ProcessId, Settled)>>,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicU64::new(0)),
            next: AtomicU64::new(0),
            active: Mutex::new(None),
            settled: watch::Sender::new(None),
        }
    }

    /// Start a new process, superseding the active one.
    pub fn start(&self) -> Process {
        let id = ProcessId(self.next.fetch_add(1, Ordering::AcqRel) + 1);
        let process = Process {
            id,
            token: CancellationToken::new(),
            current: self.current.clone(),
        };
        self.current.store(id.0, Ordering::Release);
        if let Some(previous) = self.active.lock().replace(process.clone()) {
            tracing::debug!(target: targets::LISTING, superseded = %previous.id, by = %id, "superseding apply cycle");
            previous.token.cancel();
        }
        process
    }

    /// Mark `process` as finished if it is still the active one, and
    /// publish how it ended.
    pub fn finish(&self, process: &Process, outcome: Settled) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|p| p.id == process.id) {
            *active = None;
            self.settled.send_replace(Some((process.id, outcome)));
        }
    }

    /// Whether a process is started but not finished.
    pub fn in_flight(&self) -> bool {
        self.active.lock().is_some()
    }

    /// The in-flight process with a receiver for its outcome.
    pub fn join(&self) -> Option<(Process, SettledReceiver)> {
        let active = self.active.lock();
        let process = active.as_ref()?.clone();
        Some((process, self.settled.subscribe()))
    }
}

/// Wait until `process` settles.
///
/// Resolves `None` when the process is superseded first. A later process
/// settling means this one finished earlier, so the newest snapshot is
/// reported for it.
pub(crate) async fn wait_settled(process: &Process, mut settled: SettledReceiver) -> Option<Settled> {
    let id = process.id;
    let finished = async {
        let value = settled
            .wait_for(|value| value.as_ref().is_some_and(|(done, _)| *done >= id))
            .await
            .ok()?;
        value.as_ref().map(|(_, outcome)| outcome.clone())
    };
    tokio::select! {
        biased;
        outcome = finished => outcome.filter(|_| !process.is_cancelled()),
        _ = process.token.cancelled() => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_supersedes_previous() {
        let tracker = ProcessTracker::new();
        let first = tracker.start();
        assert!(first.is_current());

        let second = tracker.start();
        assert!(!first.is_current());
        assert!(first.is_cancelled());
        assert!(second.is_current());
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_finish_only_clears_matching_process() {
        let tracker = ProcessTracker::new();
        let first = tracker.start();
        let second = tracker.start();

        tracker.finish(&first, Settled::Failed("stale".into()));
        assert!(tracker.in_flight());

        tracker.finish(&second, Settled::Applied(SearchParams::new()));
        assert!(!tracker.in_flight());
        assert!(second.is_current());
    }

    #[tokio::test]
    async fn test_join_reports_outcome() {
        let tracker = ProcessTracker::new();
        assert!(tracker.join().is_none());

        let process = tracker.start();
        let (joined, settled) = tracker.join().unwrap();
        assert_eq!(joined.id(), process.id());

        let params = SearchParams::new().with("page", 2i64);
        tracker.finish(&process, Settled::Applied(params.clone()));
        assert_eq!(wait_settled(&joined, settled).await, Some(Settled::Applied(params)));
    }

    #[tokio::test]
    async fn test_join_of_superseded_process() {
        let tracker = ProcessTracker::new();
        tracker.start();
        let (joined, settled) = tracker.join().unwrap();

        let newer = tracker.start();
        tracker.finish(&newer, Settled::Applied(SearchParams::new()));
        assert_eq!(wait_settled(&joined, settled).await, None);
    }
}
