//! A streaming Brainfuck interpreter library.
//!
//! Programs are executed straight off a seekable byte source: there is no
//! parse pass and no bracket table. Loops are resolved as they are reached,
//! by scanning forward over a skipped body or seeking back to the start of a
//! repeated one.
//!
//! Features and behaviors:
//! - A growable tape (300,000 cells by default) that extends in batches when
//!   the pointer reaches its end, with an optional hard limit.
//! - Cells of 8, 16, 32 or 64 bits that wrap on overflow.
//! - Moving left from cell 0 stays on cell 0.
//! - Input `,` reads one byte from the injected input stream; end of input
//!   stores 0, stores the maximum cell value, or leaves the cell unchanged.
//! - Output `.` writes the low byte of the current cell.
//! - Any non-Brainfuck byte is a comment.
//! - Unmatched brackets are reported with the offending character and offset.
//!
//! Quick start:
//!
//! ```
//! use std::io::{self, Cursor};
//! use stream_bf::{Interpreter, InterpreterConfig};
//!
//! let code = "++++++++[>++++++++<-]>+.";
//! let mut bf = Interpreter::new(
//!     Cursor::new(code.as_bytes()),
//!     io::empty(),
//!     Vec::new(),
//!     InterpreterConfig::default(),
//! )
//! .expect("default config is valid");
//! bf.run().expect("program should run");
//! assert_eq!(bf.output(), b"A");
//! ```

pub mod brackets;
pub mod cli_util;
pub mod config;
pub mod error;
pub mod hooks;
pub mod interpreter;
pub mod io_policy;
pub mod source;
pub mod tape;

pub use config::{CellWidth, InterpreterConfig, Settings};
pub use error::{BfError, ConfigError, UnmatchedBracketKind};
pub use hooks::{RunOutcome, StepControl, StopReason};
pub use interpreter::{Instruction, Interpreter, Step};
pub use io_policy::{EofMode, IoPolicy};
pub use source::SourceCursor;
pub use tape::Tape;
