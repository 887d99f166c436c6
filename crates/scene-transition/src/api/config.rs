use serde::Deserialize;

use crate::api::error::TransitionError;

/// What a transition writes on its terminal frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalFrame {
    /// Write exactly the target value.
    #[default]
    Snap,
    /// Write `lerp(from, to, ease(elapsed / duration))` with the terminal
    /// frame's elapsed time, which can overshoot when the frame lands late.
    Extrapolate,
}

/// Engine-wide settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Duration in ms when neither the spec nor the props give one (default: 1000).
    pub fallback_duration: f64,
    /// Terminal-frame write policy (default: snap).
    pub terminal_frame: TerminalFrame,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_duration: 1000.0,
            terminal_frame: TerminalFrame::Snap,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TransitionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_fallback_duration(mut self, ms: f64) -> Self {
        self.fallback_duration = ms;
        self
    }

    pub fn with_terminal_frame(mut self, terminal_frame: TerminalFrame) -> Self {
        self.terminal_frame = terminal_frame;
        self
    }
}
