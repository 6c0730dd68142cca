//! StageTrace - A complete sequence of stage events for one round
//!
//! A trace captures the full timeline of a spin and, when triggered,
//! the Hold & Win round that follows it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::StageEvent;
use crate::stage::StageCategory;

/// A complete trace of stage events for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Theme identifier (e.g., "durov", "coin_up")
    pub game_id: String,

    /// Round id assigned by the machine
    #[serde(default)]
    pub round_id: Option<String>,

    /// All events in chronological order
    pub events: Vec<StageEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl StageTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>, game_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            game_id: game_id.into(),
            round_id: None,
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    /// Set round ID
    pub fn with_round(mut self, round_id: impl Into<String>) -> Self {
        self.round_id = Some(round_id.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Get events by category
    pub fn events_by_category(&self, category: StageCategory) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.category() == category)
            .collect()
    }

    /// Get events by stage type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&StageEvent> {
        self.events
            .iter()
            .filter(|e| e.stage.type_name() == type_name)
            .collect()
    }

    /// Check if trace contains a specific stage type
    pub fn has_stage(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.stage.type_name() == type_name)
    }

    /// Check if this round entered Hold & Win
    pub fn has_bonus(&self) -> bool {
        self.has_stage("bonus_enter")
    }

    /// Last win amount shown (bonus payout wins over the line win)
    pub fn total_win(&self) -> f64 {
        self.events
            .iter()
            .rev()
            .find_map(|e| e.stage.win_amount())
            .unwrap_or(0.0)
    }

    /// Validate trace has required stages
    pub fn validate(&self) -> TraceValidation {
        let timestamps_ordered = self
            .events
            .windows(2)
            .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms);

        TraceValidation {
            has_spin_start: self.has_stage("spin_start"),
            has_spin_end: self.has_stage("spin_end"),
            reel_stop_count: self.events_by_type("reel_stop").len(),
            has_bonus_enter: self.has_bonus(),
            has_bonus_exit: self.has_stage("bonus_exit"),
            timestamps_ordered,
        }
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            game_id: self.game_id.clone(),
            event_count: self.events.len(),
            duration_ms: self.duration_ms(),
            total_win: self.total_win(),
            has_bonus: self.has_bonus(),
        }
    }
}

/// Validation result for a trace
#[derive(Debug, Clone, Default)]
pub struct TraceValidation {
    pub has_spin_start: bool,
    pub has_spin_end: bool,
    pub reel_stop_count: usize,
    pub has_bonus_enter: bool,
    pub has_bonus_exit: bool,
    pub timestamps_ordered: bool,
}

impl TraceValidation {
    /// Check if trace is valid (has all required elements)
    pub fn is_valid(&self) -> bool {
        self.has_spin_start
            && self.has_spin_end
            && self.reel_stop_count > 0
            && self.timestamps_ordered
            && self.has_bonus_enter == self.has_bonus_exit
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if !self.has_spin_start {
            warnings.push("Missing SPIN_START event");
        }
        if !self.has_spin_end {
            warnings.push("Missing SPIN_END event");
        }
        if self.reel_stop_count == 0 {
            warnings.push("No reel stop events");
        }
        if !self.timestamps_ordered {
            warnings.push("Events out of chronological order");
        }
        if self.has_bonus_enter && !self.has_bonus_exit {
            warnings.push("Bonus entered but not exited");
        }

        warnings
    }
}

/// Summary of a trace for quick overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub game_id: String,
    pub event_count: usize,
    pub duration_ms: f64,
    pub total_win: f64,
    pub has_bonus: bool,
}
