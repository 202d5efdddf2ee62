use serde::{Deserialize, Serialize};
use std::fmt;

pub const TICK_INTERVAL_MS: u64 = 1000; // Driver fires once per second
pub const FOCUS_MINUTES: u32 = 25;
pub const SHORT_BREAK_MINUTES: u32 = 5;
pub const LONG_BREAK_MINUTES: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PomodoroMode {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl PomodoroMode {
    /// Seconds the countdown is restored to on reset or mode switch.
    pub const fn canonical_seconds(self) -> u32 {
        match self {
            PomodoroMode::Focus => FOCUS_MINUTES * 60,
            PomodoroMode::ShortBreak => SHORT_BREAK_MINUTES * 60,
            PomodoroMode::LongBreak => LONG_BREAK_MINUTES * 60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PomodoroMode::Focus => "FOCUS",
            PomodoroMode::ShortBreak => "SHORT BREAK",
            PomodoroMode::LongBreak => "LONG BREAK",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            PomodoroMode::Focus => "💼",
            PomodoroMode::ShortBreak => "☕",
            PomodoroMode::LongBreak => "🌴",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, PomodoroMode::Focus)
    }
}

impl fmt::Display for PomodoroMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a second count as zero-padded `MM:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
