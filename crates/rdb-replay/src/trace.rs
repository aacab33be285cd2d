//! Recorded trace file format.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use serde_json::{Map, Value};
use smol_str::SmolStr;

use rdb_core::debug::{Breakpoints, EventKind, ResumeAction, TraceEvent};

/// Expression answers recorded for one event.
pub type Values = Arc<Map<String, Value>>;

#[derive(Debug, Deserialize)]
pub struct TraceFile {
    #[serde(default)]
    pub breakpoints: Vec<BreakpointSpec>,
    #[serde(default)]
    pub events: Vec<EventSpec>,
    /// Answers given at successive stops, in debugger command syntax.
    #[serde(default)]
    pub resume: Vec<String>,
    #[serde(default)]
    pub stop_on_raise: bool,
}

#[derive(Debug, Deserialize)]
pub struct BreakpointSpec {
    #[serde(flatten)]
    pub target: TargetSpec,
    /// Place at this number instead of appending.
    pub number: Option<usize>,
    pub condition: Option<String>,
    pub command: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Line { file: String, line: u32 },
    Method { owner: String, method: String },
    Watch { watch: String },
}

#[derive(Debug, Deserialize)]
pub struct EventSpec {
    pub event: String,
    pub file: String,
    pub line: u32,
    pub id: Option<String>,
    pub owner: Option<String>,
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl TraceFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid trace file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load the recorded breakpoints into the session table.
    pub fn install(&self, breakpoints: &Breakpoints) -> anyhow::Result<()> {
        for spec in &self.breakpoints {
            let number = match (&spec.target, spec.number) {
                (TargetSpec::Line { file, line }, Some(number)) => {
                    breakpoints.reposition(
                        number,
                        file,
                        *line,
                        spec.condition.as_deref(),
                        spec.command.as_deref(),
                    )?;
                    number
                }
                (TargetSpec::Line { file, line }, None) => breakpoints
                    .find_or_create(file, *line, true)
                    .ok_or_else(|| anyhow!("could not place breakpoint at {file}:{line}"))?,
                (TargetSpec::Method { owner, method }, None) => {
                    breakpoints.add_method_breakpoint(owner, method)
                }
                (TargetSpec::Watch { watch }, None) => breakpoints.add_watchpoint(watch),
                (_, Some(number)) => {
                    bail!("breakpoint number {number} is only supported for file/line entries")
                }
            };
            if spec.number.is_none() {
                if spec.condition.is_some() {
                    breakpoints.set_condition(number, spec.condition.as_deref())?;
                }
                if spec.command.is_some() {
                    breakpoints.set_command(number, spec.command.as_deref())?;
                }
            }
            if spec.disabled {
                breakpoints.remove(number)?;
            }
        }
        Ok(())
    }

    /// Parsed resume script.
    pub fn resume_actions(&self) -> anyhow::Result<Vec<ResumeAction>> {
        self.resume.iter().map(|text| parse_resume(text)).collect()
    }
}

impl EventSpec {
    pub fn to_event(&self) -> anyhow::Result<TraceEvent<Values>> {
        let kind = EventKind::parse(&self.event)
            .ok_or_else(|| anyhow!("unknown event kind '{}'", self.event))?;
        Ok(TraceEvent {
            kind,
            file: SmolStr::new(&self.file),
            line: self.line,
            id: self.id.as_deref().map(SmolStr::new),
            binding: Arc::new(self.values.clone()),
            owner: self.owner.as_deref().map(SmolStr::new),
        })
    }
}

/// Parse `continue`, `step [n]`, `next [n]` or `finish` (and their short forms).
pub fn parse_resume(text: &str) -> anyhow::Result<ResumeAction> {
    let mut parts = text.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let count = match parts.next() {
        Some(count) => count
            .parse::<u32>()
            .with_context(|| format!("invalid count in '{text}'"))?,
        None => 1,
    };
    if parts.next().is_some() {
        bail!("unexpected arguments in '{text}'");
    }
    match command {
        "c" | "cont" | "continue" => Ok(ResumeAction::Continue),
        "s" | "step" => Ok(ResumeAction::Step(count)),
        "n" | "next" => Ok(ResumeAction::Next(count)),
        "fin" | "finish" => Ok(ResumeAction::Finish),
        _ => bail!("unknown resume command '{text}'"),
    }
}
