//! Per-thread call frame bookkeeping.

use std::fmt;

use smol_str::SmolStr;

/// One call-stack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<B> {
    /// Opaque execution context handle.
    pub binding: B,
    pub file: SmolStr,
    pub line: u32,
    pub id: Option<SmolStr>,
}

impl<B> Frame<B> {
    #[must_use]
    pub fn new(binding: B, file: impl Into<SmolStr>, line: u32, id: Option<SmolStr>) -> Self {
        Self {
            binding,
            file: file.into(),
            line,
            id,
        }
    }
}

/// Frames in call order. Position 0 is the newest frame.
#[derive(Debug, Clone)]
pub struct FrameStack<B> {
    // Oldest first; the newest frame is the last element.
    frames: Vec<Frame<B>>,
}

impl<B> Default for FrameStack<B> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<B> FrameStack<B> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, frame: Frame<B>) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame<B>> {
        self.frames.pop()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&Frame<B>> {
        self.frames.last()
    }

    /// Frame at `pos`, counting from the newest (0).
    #[must_use]
    pub fn get(&self, pos: usize) -> Option<&Frame<B>> {
        let len = self.frames.len();
        if pos >= len {
            return None;
        }
        self.frames.get(len - 1 - pos)
    }

    /// Frames newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Frame<B>> {
        self.frames.iter().rev()
    }

    /// Move the newest frame to `file:line`. No-op on an empty stack.
    pub fn set_position(&mut self, file: &SmolStr, line: u32) {
        if let Some(frame) = self.frames.last_mut() {
            frame.file = file.clone();
            frame.line = line;
        }
    }

    /// Render the frame at `pos` as a backtrace line.
    #[must_use]
    pub fn format_frame(&self, pos: usize) -> Option<String> {
        self.get(pos).map(|frame| {
            FrameLine {
                number: pos + 1,
                frame,
            }
            .to_string()
        })
    }
}

struct FrameLine<'a, B> {
    number: usize,
    frame: &'a Frame<B>,
}

impl<B> fmt::Display for FrameLine<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}:{}", self.number, self.frame.file, self.frame.line)?;
        if let Some(id) = &self.frame.id {
            write!(f, ":in `{id}'")?;
        }
        Ok(())
    }
}
