use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// What `,` stores when the input stream has nothing left to give.
///
/// Brainfuck has no official convention here, so all three common ones are
/// offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EofMode {
    /// Store 0.
    Zero,
    /// Store the all-bits-set value, i.e. -1 wrapped to the cell width.
    #[serde(alias = "minus-one")]
    Max,
    /// Leave the current cell alone.
    #[default]
    Unchanged,
}

impl EofMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EofMode::Zero => "zero",
            EofMode::Max => "max",
            EofMode::Unchanged => "unchanged",
        }
    }
}

impl FromStr for EofMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofMode::Zero),
            "max" | "minus-one" | "-1" => Ok(EofMode::Max),
            "unchanged" | "keep" => Ok(EofMode::Unchanged),
            other => Err(ConfigError::UnknownEofMode(other.to_string())),
        }
    }
}

/// Input-side policy: when a read counts as EOF and what it does to the cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoPolicy {
    pub eof_mode: EofMode,
    /// Treat `\n` as EOF. Handy when stdin is an interactive terminal.
    pub newline_as_eof: bool,
}

impl IoPolicy {
    pub fn new(eof_mode: EofMode, newline_as_eof: bool) -> Self {
        Self { eof_mode, newline_as_eof }
    }

    /// Whether a single-byte read result should be handled as EOF.
    pub fn is_eof(&self, read: Option<u8>) -> bool {
        match read {
            None => true,
            Some(b'\n') => self.newline_as_eof,
            Some(_) => false,
        }
    }

    /// The value the current cell holds after an EOF read.
    pub fn on_eof(&self, current: u64, max: u64) -> u64 {
        match self.eof_mode {
            EofMode::Zero => 0,
            EofMode::Max => max,
            EofMode::Unchanged => current,
        }
    }
}
