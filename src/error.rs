use std::fmt;

/// Errors that can occur while interpreting a Brainfuck stream.
///
/// Every variant is terminal for the interpreter that produced it.
#[derive(Debug, thiserror::Error)]
pub enum BfError {
    /// A `[` with no reachable `]`, or a `]` with no open loop.
    #[error("Unmatched bracket {kind} at position {pos}")]
    UnmatchedBracket { kind: UnmatchedBracketKind, pos: u64 },

    /// The pointer landed on the configured tape limit.
    #[error("Tape capacity exceeded: cell {index} is beyond the limit of {limit} cells")]
    CapacityExceeded { index: usize, limit: usize },

    /// The interpreter was built from an invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Writing to the output stream failed.
    #[error("I/O error at position {pos}: {source}")]
    Io { pos: u64, #[source] source: std::io::Error },
}

impl BfError {
    /// Source offset the error points at, when there is one.
    pub fn position(&self) -> Option<u64> {
        match self {
            BfError::UnmatchedBracket { pos, .. } | BfError::Io { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl UnmatchedBracketKind {
    /// The offending instruction character.
    pub fn as_char(self) -> char {
        match self {
            UnmatchedBracketKind::Open => '[',
            UnmatchedBracketKind::Close => ']',
        }
    }
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_char())
    }
}

/// Rejected construction parameters. Raised before any instruction runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("tape limit ({limit}) cannot be below the initial tape size ({initial})")]
    LimitBelowInitial { limit: usize, initial: usize },

    #[error("cell value space ({0}) must be a power of two")]
    ValueSpaceNotPowerOfTwo(u128),

    #[error("cell value space ({declared}) does not match the {bits}-bit cell width ({actual})")]
    WidthMismatch { declared: u128, bits: u32, actual: u128 },

    #[error("tape growth increment must be at least 1")]
    ZeroGrowth,

    #[error("initial tape size must be at least 1")]
    EmptyTape,

    #[error("unsupported cell width: {0} bits (expected 8, 16, 32 or 64)")]
    UnsupportedWidth(u32),

    #[error("unknown EOF mode '{0}' (expected zero, max or unchanged)")]
    UnknownEofMode(String),
}
