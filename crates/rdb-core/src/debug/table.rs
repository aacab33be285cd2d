//! Breakpoint table with stable, positional numbering.
//!
//! Breakpoint `N` is always slot `N - 1`. Slots are never removed by
//! per-number operations; removal disables in place so every other number
//! keeps its meaning. Only [`BreakpointTable::clear_all`] drops slots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use smol_str::SmolStr;
use tracing::{info, warn};

use crate::error::DebugError;
use crate::paths::expand_path;

use super::{
    BreakpointDescriptor, BreakpointEntry, BreakpointKind, BreakpointListing, BreakpointTarget,
    ConditionTag, EnabledState, Position,
};

/// Command text that clears a breakpoint command instead of setting it.
pub const CLEAR_COMMAND: &str = "none";

#[derive(Debug, Clone)]
pub struct BreakpointTable {
    entries: Vec<BreakpointEntry>,
    root: PathBuf,
}

impl BreakpointTable {
    /// Create an empty table resolving relative paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            root: root.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[BreakpointEntry] {
        &self.entries
    }

    /// Map a breakpoint number to its slot index.
    pub fn validate(&self, number: usize) -> Result<usize, DebugError> {
        if number < 1 || number > self.entries.len() {
            return Err(self.out_of_range(number));
        }
        Ok(number - 1)
    }

    fn out_of_range(&self, number: usize) -> DebugError {
        let err = DebugError::OutOfRange {
            number,
            len: self.entries.len(),
        };
        warn!("{err}");
        err
    }

    pub fn get(&self, number: usize) -> Result<&BreakpointEntry, DebugError> {
        let index = self.validate(number)?;
        Ok(&self.entries[index])
    }

    /// Number of the enabled line breakpoint at `file:line`, creating an
    /// unconditional one when `create` is set and none exists.
    pub fn find_or_create(&mut self, file: &str, line: u32, create: bool) -> Option<usize> {
        let file = expand_path(file, &self.root);
        let position = Position::Line(line);
        let found = self.entries.iter().position(|entry| {
            entry.state.is_enabled()
                && matches!(
                    &entry.target,
                    BreakpointTarget::Location { file: bp_file, position: bp_position }
                        if *bp_file == file && *bp_position == position
                )
        });
        if let Some(index) = found {
            return Some(index + 1);
        }
        if !create {
            return None;
        }
        self.entries
            .push(BreakpointEntry::at_line(file.clone(), line, EnabledState::Active));
        let number = self.entries.len();
        info!("Set breakpoint {number} at {file}:{line}");
        Some(number)
    }

    /// Append a breakpoint on `method`, matched on `call` events by the
    /// owning type or by the file the method is defined in. Owners that look
    /// like paths are expanded like line breakpoint files.
    pub fn add_method_breakpoint(&mut self, owner: &str, method: &str) -> usize {
        let owner = if is_path_like(owner) {
            expand_path(owner, &self.root)
        } else {
            SmolStr::new(owner)
        };
        self.entries.push(BreakpointEntry {
            state: EnabledState::Active,
            target: BreakpointTarget::Location {
                file: owner.clone(),
                position: Position::Method(SmolStr::new(method)),
            },
            command: None,
        });
        let number = self.entries.len();
        info!("Set breakpoint {number} at {owner}:{method}");
        number
    }

    /// Append a watchpoint that stops when `expression` is truthy.
    pub fn add_watchpoint(&mut self, expression: &str) -> usize {
        self.entries.push(BreakpointEntry {
            state: EnabledState::Active,
            target: BreakpointTarget::Watch(SmolStr::new(expression)),
            command: None,
        });
        let number = self.entries.len();
        info!("Set watchpoint {number}: {expression}");
        number
    }

    /// Disable breakpoint `number` in place.
    pub fn remove(&mut self, number: usize) -> Result<(), DebugError> {
        let index = self.validate(number)?;
        self.entries[index].state = EnabledState::Disabled;
        info!("Breakpoint {number} removed");
        Ok(())
    }

    /// Describe line and method breakpoints in number order. Placeholder
    /// slots are disabled, so they only appear with `include_disabled`.
    #[must_use]
    pub fn list(&self, include_disabled: bool) -> BreakpointListing {
        let mut listing = BreakpointListing::default();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.kind() != BreakpointKind::Breakpoint {
                continue;
            }
            // Empty slots list with a blank location, as `:0`.
            let (file, position) = match &entry.target {
                BreakpointTarget::Location { file, position } => (file.clone(), position.clone()),
                _ => (SmolStr::default(), Position::Line(0)),
            };
            let tag = match &entry.state {
                EnabledState::Active => ConditionTag::None,
                EnabledState::Conditional(expr) => ConditionTag::Condition(expr.clone()),
                EnabledState::Disabled => ConditionTag::Disabled,
            };
            if entry.state.is_enabled() {
                listing.active += 1;
            } else if !include_disabled {
                continue;
            }
            listing.entries.push(BreakpointDescriptor {
                number: index + 1,
                file,
                position,
                tag,
                command: entry.command.clone(),
            });
        }
        listing
    }

    /// Stored state of breakpoint `number`, disabled included.
    pub fn condition(&self, number: usize) -> Result<EnabledState, DebugError> {
        self.get(number).map(|entry| entry.state.clone())
    }

    /// Set or clear the condition. Either way the breakpoint ends up enabled.
    pub fn set_condition(&mut self, number: usize, condition: Option<&str>) -> Result<(), DebugError> {
        let index = self.validate(number)?;
        let state = EnabledState::from_condition(condition);
        match &state {
            EnabledState::Conditional(expr) => {
                info!("Breakpoint {number} conditional upon {expr}");
            }
            _ => info!("Breakpoint {number} now unconditional"),
        }
        self.entries[index].state = state;
        Ok(())
    }

    pub fn command(&self, number: usize) -> Result<Option<SmolStr>, DebugError> {
        self.get(number).map(|entry| entry.command.clone())
    }

    /// Set the command, or clear it for `None` and [`CLEAR_COMMAND`].
    pub fn set_command(&mut self, number: usize, command: Option<&str>) -> Result<(), DebugError> {
        let index = self.validate(number)?;
        match command.filter(|command| *command != CLEAR_COMMAND) {
            Some(command) => {
                self.entries[index].command = Some(SmolStr::new(command));
                info!("Breakpoint {number} now runs command {command}");
            }
            None => {
                self.entries[index].command = None;
                info!("Breakpoint {number} command removed");
            }
        }
        Ok(())
    }

    /// Drop every populated slot. Untouched placeholders stay.
    pub fn clear_all(&mut self) {
        self.entries.retain(BreakpointEntry::is_placeholder);
        info!("All breakpoints removed");
    }

    /// Move breakpoint `number` to `file:line`, growing the table with
    /// placeholders so the number becomes addressable.
    pub fn reposition(
        &mut self,
        number: usize,
        file: &str,
        line: u32,
        condition: Option<&str>,
        command: Option<&str>,
    ) -> Result<(), DebugError> {
        if number == 0 {
            return Err(self.out_of_range(number));
        }
        while self.entries.len() < number {
            self.entries.push(BreakpointEntry::placeholder());
            info!("Adding dummy breakpoint {}", self.entries.len());
        }
        let file = expand_path(file, &self.root);
        let state = EnabledState::from_condition(condition);
        let entry = &mut self.entries[number - 1];
        if entry.is_placeholder() {
            *entry = BreakpointEntry::at_line(file.clone(), line, state);
        } else {
            entry.target = BreakpointTarget::Location {
                file: file.clone(),
                position: Position::Line(line),
            };
            entry.state = state;
        }
        match command {
            Some(CLEAR_COMMAND) => entry.command = None,
            Some(command) => entry.command = Some(SmolStr::new(command)),
            None => {}
        }
        info!("breakpoint {number} now at {file}:{line}");
        Ok(())
    }
}

/// `lib/a.rb` or `a.rb` rather than a type name such as `Parser::Lexer`.
fn is_path_like(owner: &str) -> bool {
    owner.contains(['/', '\\']) || Path::new(owner).extension().is_some()
}

/// Process-wide breakpoint table shared by every dispatcher.
///
/// Each call holds the lock for the whole operation, so concurrent callers
/// never observe a partially updated entry.
#[derive(Debug, Clone)]
pub struct Breakpoints {
    table: Arc<Mutex<BreakpointTable>>,
}

impl Breakpoints {
    #[must_use]
    pub fn new(table: BreakpointTable) -> Self {
        Self {
            table: Arc::new(Mutex::new(table)),
        }
    }

    /// Run `f` with exclusive access, for compound updates.
    ///
    /// Do not evaluate expressions inside `f`; evaluation can re-enter the
    /// dispatcher and the lock is not re-entrant.
    pub fn with_table<T>(&self, f: impl FnOnce(&mut BreakpointTable) -> T) -> T {
        let mut table = self.table.lock();
        f(&mut table)
    }

    /// Base directory for relative paths.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.table.lock().root().to_path_buf()
    }

    /// Copy of the current entries, in number order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BreakpointEntry> {
        self.table.lock().entries().to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    pub fn validate(&self, number: usize) -> Result<usize, DebugError> {
        self.table.lock().validate(number)
    }

    pub fn find_or_create(&self, file: &str, line: u32, create: bool) -> Option<usize> {
        self.table.lock().find_or_create(file, line, create)
    }

    pub fn add_method_breakpoint(&self, owner: &str, method: &str) -> usize {
        self.table.lock().add_method_breakpoint(owner, method)
    }

    pub fn add_watchpoint(&self, expression: &str) -> usize {
        self.table.lock().add_watchpoint(expression)
    }

    pub fn remove(&self, number: usize) -> Result<(), DebugError> {
        self.table.lock().remove(number)
    }

    #[must_use]
    pub fn list(&self, include_disabled: bool) -> BreakpointListing {
        self.table.lock().list(include_disabled)
    }

    pub fn condition(&self, number: usize) -> Result<EnabledState, DebugError> {
        self.table.lock().condition(number)
    }

    pub fn set_condition(&self, number: usize, condition: Option<&str>) -> Result<(), DebugError> {
        self.table.lock().set_condition(number, condition)
    }

    pub fn command(&self, number: usize) -> Result<Option<SmolStr>, DebugError> {
        self.table.lock().command(number)
    }

    pub fn set_command(&self, number: usize, command: Option<&str>) -> Result<(), DebugError> {
        self.table.lock().set_command(number, command)
    }

    pub fn clear_all(&self) {
        self.table.lock().clear_all();
    }

    pub fn reposition(
        &self,
        number: usize,
        file: &str,
        line: u32,
        condition: Option<&str>,
        command: Option<&str>,
    ) -> Result<(), DebugError> {
        self.table
            .lock()
            .reposition(number, file, line, condition, command)
    }
}
