//! Stream reducer: folds normalized agent events into steps, reasoning and answer text.
//!
//! Lifecycle is `Idle -> Streaming -> {Completed, Failed, TimedOut}`; every terminal
//! state is entered once. Each transition returns the [`Emission`]s the caller
//! should render, in order.

use crate::classify::categorize;
use crate::pipeline::decode::SseFrame;
use crate::pipeline::normalize::normalize;
use crate::render::render_steps;
use crate::sql::{find_description, find_sql};
use crate::types::{AgentEventKind, Emission, NormalizedEvent, Outcome, Step, StepCategory, Transcript};
use crate::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Answer used when the stream ends without any answer text.
pub const NO_RESPONSE_ANSWER: &str = "No response from agent.";
/// Literal end-of-stream marker some revisions send as a data payload.
pub const DONE_MARKER: &str = "[DONE]";

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("blank-line pattern is valid"));

/// Where reasoning text ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningAttribution {
    /// One blob for the whole response, rendered after the timeline.
    WholeResponse,
    /// Appended to the most recent non-SQL step.
    #[default]
    PerStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerOptions {
    pub reasoning: ReasoningAttribution,
    /// Spread reasoning that piled up on a single step across all steps at the end.
    pub redistribute: bool,
}

impl Default for ReducerOptions {
    fn default() -> Self {
        Self {
            reasoning: ReasoningAttribution::PerStep,
            redistribute: true,
        }
    }
}

impl ReducerOptions {
    pub fn whole_response() -> Self {
        Self {
            reasoning: ReasoningAttribution::WholeResponse,
            redistribute: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming,
    Completed,
    Failed,
    TimedOut,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed | Phase::TimedOut)
    }
}

/// Everything the reducer has accumulated for one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducerState {
    pub steps: Vec<Step>,
    /// Reasoning text so far. Chunks append; snapshots add only what is new.
    pub reasoning: String,
    /// Answer text so far; never shrinks until a failure replaces it.
    pub answer: String,
    pub last_status: Option<String>,
    /// Reasoning that arrived before any non-SQL step existed.
    pub pending_reasoning: String,
    seen_sql: HashSet<String>,
    seen_descriptions: HashSet<String>,
    /// Byte offsets where the text since the last settled snapshot begins.
    reasoning_block: usize,
    answer_block: usize,
}

/// One reducer per question; nothing carries over between calls.
#[derive(Debug, Clone)]
pub struct Reducer {
    options: ReducerOptions,
    phase: Phase,
    state: ReducerState,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new(ReducerOptions::default())
    }
}

impl Reducer {
    pub fn new(options: ReducerOptions) -> Self {
        Self {
            options,
            phase: Phase::Idle,
            state: ReducerState::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ReducerState {
        &self.state
    }

    pub fn options(&self) -> ReducerOptions {
        self.options
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            debug!("agent stream started");
            self.phase = Phase::Streaming;
        }
    }

    /// Feed one decoded frame.
    ///
    /// Empty bodies, the `[DONE]` marker and malformed JSON are skipped.
    pub fn ingest(&mut self, frame: &SseFrame) -> Vec<Emission> {
        self.start();
        if self.phase.is_terminal() {
            return Vec::new();
        }

        let data = frame.data.trim();
        if data.is_empty() || data == DONE_MARKER {
            return Vec::new();
        }
        let payload: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                debug!(event = %frame.event, error = %e, "skipping malformed event body");
                return Vec::new();
            }
        };

        let kind = AgentEventKind::parse(&frame.event);
        match normalize(&kind, payload) {
            Some(event) => self.apply(event),
            None => Vec::new(),
        }
    }

    /// Apply one normalized event.
    pub fn apply(&mut self, event: NormalizedEvent) -> Vec<Emission> {
        self.start();
        if self.phase.is_terminal() {
            return Vec::new();
        }

        let mut out = Vec::new();
        match event {
            NormalizedEvent::Status { message, payload } => {
                self.push_status(&message, &mut out);
                self.probe_payload(&strip_status_keys(payload), &mut out);
            }
            NormalizedEvent::Reasoning { text, cumulative } => {
                self.push_reasoning(&text, cumulative, &mut out);
            }
            NormalizedEvent::ToolActivity { payload } => {
                self.probe_payload(&payload, &mut out);
            }
            NormalizedEvent::AnswerDelta { text, cumulative } => {
                self.push_answer(&text, cumulative, &mut out);
            }
            NormalizedEvent::FinalMessage { text } => {
                if self.state.answer.is_empty() {
                    self.push_answer(&text, true, &mut out);
                }
            }
            NormalizedEvent::AgentError { message } => {
                warn!(%message, "agent reported an error mid-stream");
            }
            NormalizedEvent::Unknown { kind, payload } => {
                debug!(%kind, "unrecognized event kind, scanning for SQL");
                if let Some(sql) = find_sql(&payload) {
                    self.push_sql(sql, &mut out);
                }
            }
        }
        out
    }

    /// Close the stream normally.
    ///
    /// Emits the no-response placeholder if no answer text ever arrived.
    pub fn finish(&mut self) -> Vec<Emission> {
        if self.phase.is_terminal() {
            return Vec::new();
        }

        let mut out = Vec::new();
        if self.state.answer.is_empty() {
            self.state.answer = NO_RESPONSE_ANSWER.to_string();
            out.push(Emission::answer(NO_RESPONSE_ANSWER));
        }
        if self.options.redistribute && self.options.reasoning == ReasoningAttribution::PerStep {
            self.redistribute_reasoning();
        }
        self.phase = Phase::Completed;
        info!(
            steps = self.state.steps.len(),
            answer_chars = self.state.answer.chars().count(),
            "agent stream completed"
        );
        out
    }

    /// Close the stream after a transport or configuration failure.
    ///
    /// Emits exactly one answer describing the failure.
    pub fn fail(&mut self, err: &Error) -> Vec<Emission> {
        if self.phase.is_terminal() {
            return Vec::new();
        }

        self.phase = if err.is_timeout() {
            Phase::TimedOut
        } else {
            Phase::Failed
        };
        warn!(error = %err, phase = ?self.phase, "agent stream failed");
        self.state.answer = err.answer_text();
        vec![Emission::answer(self.state.answer.clone())]
    }

    /// Whole-response reasoning, or reasoning that never found a step to attach to.
    pub fn leftover_reasoning(&self) -> Option<&str> {
        let text = match self.options.reasoning {
            ReasoningAttribution::WholeResponse => self.state.reasoning.as_str(),
            ReasoningAttribution::PerStep => self.state.pending_reasoning.as_str(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Timeline markup for the current state.
    pub fn render(&self) -> String {
        render_steps(&self.state.steps, self.leftover_reasoning())
    }

    /// Finalize (if still open) and hand back the accumulated state.
    pub fn into_transcript(mut self) -> Transcript {
        if !self.phase.is_terminal() {
            self.finish();
        }
        let reasoning = self.leftover_reasoning().map(str::to_string);
        let outcome = match self.phase {
            Phase::Failed => Outcome::Failed,
            Phase::TimedOut => Outcome::TimedOut,
            _ => Outcome::Completed,
        };
        Transcript {
            steps: self.state.steps,
            reasoning,
            answer: self.state.answer,
            outcome,
        }
    }

    fn push_status(&mut self, message: &str, out: &mut Vec<Emission>) {
        let message = message.trim();
        if message.is_empty() || self.state.last_status.as_deref() == Some(message) {
            return;
        }
        self.state.last_status = Some(message.to_string());

        let repeats_last_step = self
            .state
            .steps
            .last()
            .map_or(false, |s| s.text == message);
        if !repeats_last_step {
            let mut step = Step::new(categorize(message), message);
            if !self.state.pending_reasoning.is_empty() {
                step.reasoning = std::mem::take(&mut self.state.pending_reasoning);
            }
            self.state.steps.push(step);
        }
        out.push(Emission::status(message));
    }

    fn push_sql(&mut self, sql: String, out: &mut Vec<Emission>) {
        if !self.state.seen_sql.insert(sql.clone()) {
            return;
        }
        debug!(chars = sql.len(), "sql found in agent payload");
        self.state
            .steps
            .push(Step::new(StepCategory::SqlQuery, sql.clone()));
        out.push(Emission::sql(sql));
    }

    fn probe_payload(&mut self, payload: &Value, out: &mut Vec<Emission>) {
        if let Some(description) = find_description(payload) {
            if self.state.seen_descriptions.insert(description.clone()) {
                self.push_status(&description, out);
            }
        }
        if let Some(sql) = find_sql(payload) {
            self.push_sql(sql, out);
        }
    }

    fn push_reasoning(&mut self, text: &str, cumulative: bool, out: &mut Vec<Emission>) {
        let state = &mut self.state;
        let added = if cumulative {
            match merge_snapshot(&mut state.reasoning, &mut state.reasoning_block, text) {
                Some(added) => added,
                None => return,
            }
        } else {
            state.reasoning.push_str(text);
            text.to_string()
        };
        if added.is_empty() {
            return;
        }

        if self.options.reasoning == ReasoningAttribution::PerStep {
            match state.steps.iter_mut().rev().find(|s| !s.is_sql()) {
                Some(step) => step.reasoning.push_str(&added),
                None => state.pending_reasoning.push_str(&added),
            }
        }
        out.push(Emission::thinking(state.reasoning.clone()));
    }

    fn push_answer(&mut self, text: &str, cumulative: bool, out: &mut Vec<Emission>) {
        let state = &mut self.state;
        if cumulative {
            if merge_snapshot(&mut state.answer, &mut state.answer_block, text).is_none() {
                return;
            }
        } else {
            state.answer.push_str(text);
        }
        out.push(Emission::answer(state.answer.clone()));
    }

    /// Spread reasoning that landed on a single step over every non-SQL step.
    ///
    /// Only runs when exactly one non-SQL step holds reasoning and the text splits
    /// into at least as many blank-line-separated chunks as there are steps.
    fn redistribute_reasoning(&mut self) {
        let targets: Vec<usize> = self
            .state
            .steps
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_sql())
            .map(|(i, _)| i)
            .collect();
        if targets.len() < 2 {
            return;
        }

        let holders: Vec<usize> = targets
            .iter()
            .copied()
            .filter(|&i| !self.state.steps[i].reasoning.is_empty())
            .collect();
        let [holder] = holders[..] else {
            return;
        };

        let text = std::mem::take(&mut self.state.steps[holder].reasoning);
        let chunks: Vec<&str> = BLANK_LINES
            .split(&text)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if chunks.len() < targets.len() {
            self.state.steps[holder].reasoning = text;
            return;
        }

        let base = chunks.len() / targets.len();
        let extra = chunks.len() % targets.len();
        let mut start = 0;
        for (n, &idx) in targets.iter().enumerate() {
            let take = base + usize::from(n < extra);
            self.state.steps[idx].reasoning = chunks[start..start + take].join("\n\n");
            start += take;
        }
        debug!(
            chunks = chunks.len(),
            steps = targets.len(),
            "redistributed reasoning across steps"
        );
    }
}

/// Fold a cumulative snapshot into `text` and return what it added.
///
/// Snapshots may cover the whole text or only the block streamed since the last
/// settled snapshot (`block_start`). Repeats and stale prefixes add nothing; a
/// snapshot ending where `text` already ends settles the current block. `text`
/// only ever grows.
fn merge_snapshot(text: &mut String, block_start: &mut usize, snapshot: &str) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }
    if text.ends_with(snapshot) {
        *block_start = text.len();
        return None;
    }
    let block = &text[*block_start..];
    if text.starts_with(snapshot) || block.starts_with(snapshot) {
        return None;
    }

    let added = if let Some(rest) = snapshot.strip_prefix(text.as_str()) {
        rest
    } else if let Some(rest) = snapshot.strip_prefix(block) {
        rest
    } else {
        let overlap = overlap_len(text.as_str(), snapshot);
        *block_start = text.len() - overlap;
        &snapshot[overlap..]
    };
    text.push_str(added);
    Some(added.to_string())
}

/// Length of the longest prefix of `incoming` that `existing` ends with.
fn overlap_len(existing: &str, incoming: &str) -> usize {
    incoming
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= existing.len())
        .filter(|&end| existing.ends_with(&incoming[..end]))
        .last()
        .unwrap_or(0)
}

/// Drop the keys that already produced the status message so the probe only sees extras.
fn strip_status_keys(mut payload: Value) -> Value {
    if let Some(map) = payload.as_object_mut() {
        map.remove("message");
        map.remove("status");
        map.remove("status_message");
    }
    payload
}
