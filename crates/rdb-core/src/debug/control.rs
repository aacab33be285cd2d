//! Cooperative suspend-all barrier.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

#[derive(Debug, Default)]
struct SuspendState {
    /// Thread that suspended everyone else.
    owner: Option<u32>,
    /// Nested suspensions by the owner (commands can stop again).
    depth: u32,
}

/// Shared flag every dispatcher checks at the top of event handling.
///
/// While one thread is stopped at the prompt, every other thread blocks at
/// its next [`SuspendControl::check_suspend`]. The owner passes through, so
/// events produced while evaluating its own commands still dispatch.
#[derive(Debug, Clone, Default)]
pub struct SuspendControl {
    state: Arc<(Mutex<SuspendState>, Condvar)>,
}

impl SuspendControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend every thread but `owner`. Waits while another thread owns the
    /// barrier so only one thread is stopped at a time.
    pub fn suspend_all(&self, owner: u32) {
        let (lock, cvar) = &*self.state;
        let mut state = lock.lock();
        while state.owner.is_some_and(|current| current != owner) {
            cvar.wait(&mut state);
        }
        state.owner = Some(owner);
        state.depth += 1;
        debug!("suspend_all owner={owner} depth={}", state.depth);
    }

    /// Release one suspension taken by `owner`; the barrier opens when the
    /// outermost one is released. Calls from other threads are ignored.
    pub fn resume_all(&self, owner: u32) {
        let (lock, cvar) = &*self.state;
        let mut state = lock.lock();
        if state.owner != Some(owner) {
            return;
        }
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.owner = None;
            cvar.notify_all();
        }
        debug!("resume_all owner={owner} depth={}", state.depth);
    }

    /// Safe point: block while another thread holds the barrier.
    pub fn check_suspend(&self, thread_id: u32) {
        let (lock, cvar) = &*self.state;
        let mut state = lock.lock();
        while state.owner.is_some_and(|owner| owner != thread_id) {
            cvar.wait(&mut state);
        }
    }

    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.state.0.lock().owner.is_some()
    }

    /// Thread currently holding the barrier.
    #[must_use]
    pub fn owner(&self) -> Option<u32> {
        self.state.0.lock().owner
    }
}
