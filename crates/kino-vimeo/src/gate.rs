//! Readiness Gate - defers player construction until the client library loads
//!
//! Tech instances created while the Vimeo client library is still loading
//! are queued and constructed in creation order once the library signals
//! readiness. The gate is confined to the event-loop thread: the
//! process-wide instance returned by [`ReadinessGate::current`] is a
//! thread-local, and all mutation goes through `register`, `unregister`,
//! `signal_ready` and `signal_failed`.

use crate::{error::RemoteError, runtime::Spawner, types::TechId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Instance waiting for the client library
pub trait LibraryListener {
    fn tech_id(&self) -> TechId;

    /// The library is loaded; construct the remote player
    fn on_library_ready(self: Rc<Self>);

    /// The library will never load
    fn on_library_failed(self: Rc<Self>, error: &RemoteError);
}

/// Load status of the client library
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryStatus {
    Loading,
    Ready,
    Failed(RemoteError),
}

struct PendingEntry {
    id: TechId,
    listener: Weak<dyn LibraryListener>,
}

struct GateState {
    status: LibraryStatus,
    queue: Vec<PendingEntry>,
    /// A load timeout is pending or has fired
    timeout_armed: bool,
}

/// Queue of tech instances awaiting the client library
pub struct ReadinessGate {
    state: RefCell<GateState>,
}

thread_local! {
    static CURRENT: Rc<ReadinessGate> = Rc::new(ReadinessGate::new());
}

impl ReadinessGate {
    /// Create an independent gate
    pub fn new() -> Self {
        Self {
            state: RefCell::new(GateState {
                status: LibraryStatus::Loading,
                queue: Vec::new(),
                timeout_armed: false,
            }),
        }
    }

    /// The page-wide gate of the current thread
    pub fn current() -> Rc<ReadinessGate> {
        CURRENT.with(Rc::clone)
    }

    pub fn status(&self) -> LibraryStatus {
        self.state.borrow().status.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().status == LibraryStatus::Ready
    }

    /// Number of instances waiting for the library
    pub fn queued(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn is_queued(&self, id: TechId) -> bool {
        self.state.borrow().queue.iter().any(|entry| entry.id == id)
    }

    /// Construct now if the library is loaded, otherwise queue the instance
    pub fn register<L: LibraryListener + 'static>(&self, listener: &Rc<L>) {
        let id = listener.tech_id();
        let status = {
            let mut state = self.state.borrow_mut();
            if state.status == LibraryStatus::Loading {
                if !state.queue.iter().any(|entry| entry.id == id) {
                    let weak: Weak<dyn LibraryListener> = Rc::downgrade(listener) as Weak<dyn LibraryListener>;
                    state.queue.push(PendingEntry { id, listener: weak });
                    debug!(tech_id = %id, queued = state.queue.len(), "Tech queued until player API loads");
                }
                return;
            }
            state.status.clone()
        };

        match status {
            LibraryStatus::Ready => Rc::clone(listener).on_library_ready(),
            LibraryStatus::Failed(error) => Rc::clone(listener).on_library_failed(&error),
            LibraryStatus::Loading => {}
        }
    }

    /// Remove a queued instance; returns whether it was queued
    pub fn unregister(&self, id: TechId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.queue.len();
        state.queue.retain(|entry| entry.id != id);
        let removed = state.queue.len() != before;
        if removed {
            debug!(tech_id = %id, "Tech removed from readiness queue");
        }
        removed
    }

    /// Mark the library loaded and construct every queued instance in
    /// insertion order. Further calls construct nothing twice.
    pub fn signal_ready(&self) {
        let pending = {
            let mut state = self.state.borrow_mut();
            state.status = LibraryStatus::Ready;
            std::mem::take(&mut state.queue)
        };

        info!(queued = pending.len(), "Vimeo player API ready");

        for entry in pending {
            match entry.listener.upgrade() {
                Some(listener) => listener.on_library_ready(),
                None => debug!(tech_id = %entry.id, "Queued tech dropped before player API loaded"),
            }
        }
    }

    /// Mark the library as failed and report the failure to every queued
    /// instance. Ignored once the library is ready.
    pub fn signal_failed(&self, message: impl Into<String>) {
        let error = RemoteError::library_load(message);
        let pending = {
            let mut state = self.state.borrow_mut();
            if state.status == LibraryStatus::Ready {
                debug!("Ignoring load failure, player API already ready");
                return;
            }
            state.status = LibraryStatus::Failed(error.clone());
            std::mem::take(&mut state.queue)
        };

        warn!(queued = pending.len(), error = %error, "Vimeo player API failed to load");

        for entry in pending {
            if let Some(listener) = entry.listener.upgrade() {
                listener.on_library_failed(&error);
            }
        }
    }

    /// Fail the gate if the library is still loading after `timeout`.
    ///
    /// Only the first call per gate starts a timer; returns whether this one did.
    pub fn arm_timeout(self: &Rc<Self>, spawner: &dyn Spawner, timeout: Duration) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.timeout_armed || state.status != LibraryStatus::Loading {
                return false;
            }
            state.timeout_armed = true;
        }

        let gate = Rc::downgrade(self);
        let sleep = spawner.sleep(timeout);
        spawner.spawn(Box::pin(async move {
            sleep.await;
            if let Some(gate) = gate.upgrade() {
                if gate.status() == LibraryStatus::Loading {
                    gate.signal_failed(format!(
                        "player API did not load within {}ms",
                        timeout.as_millis()
                    ));
                }
            }
        }));
        true
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
