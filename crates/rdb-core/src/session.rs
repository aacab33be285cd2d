//! Debugging session: the explicitly owned home of all shared state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::info;

use crate::config::DebuggerConfig;
use crate::debug::{BreakpointTable, Breakpoints, SuspendControl, TraceDispatcher};
use crate::error::DebugError;

/// One debugging session.
///
/// Owns the process-wide breakpoint table and suspend barrier. The execution
/// engine asks it for one [`TraceDispatcher`] per thread of execution; the
/// front end reaches the table through [`DebugSession::breakpoints`].
#[derive(Debug)]
pub struct DebugSession {
    config: DebuggerConfig,
    breakpoints: Breakpoints,
    suspend: SuspendControl,
    next_thread: AtomicU32,
}

impl DebugSession {
    /// Start a session. Relative paths resolve against `config.root`, or the
    /// working directory when no root is configured. A relative root is
    /// itself taken from the working directory.
    pub fn new(config: DebuggerConfig) -> Result<Self, DebugError> {
        let root = match &config.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => current_dir()?.join(root),
            None => current_dir()?,
        };
        info!("debug session rooted at {}", root.display());
        Ok(Self {
            breakpoints: Breakpoints::new(BreakpointTable::new(root)),
            suspend: SuspendControl::new(),
            next_thread: AtomicU32::new(1),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DebuggerConfig {
        &self.config
    }

    #[must_use]
    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    #[must_use]
    pub fn suspend_control(&self) -> &SuspendControl {
        &self.suspend
    }

    /// Dispatcher for a new thread of execution. Thread ids start at 1; only
    /// the first thread honors `stop_on_entry`.
    #[must_use]
    pub fn dispatcher<B: Clone>(&self) -> TraceDispatcher<B> {
        let thread_id = self.next_thread.fetch_add(1, Ordering::Relaxed);
        let stop_on_entry = thread_id == 1 && self.config.stop_on_entry;
        TraceDispatcher::new(
            thread_id,
            self.breakpoints.clone(),
            self.suspend.clone(),
            stop_on_entry,
        )
    }
}

fn current_dir() -> Result<PathBuf, DebugError> {
    std::env::current_dir()
        .map_err(|err| DebugError::Io(format!("current directory: {err}").into()))
}
