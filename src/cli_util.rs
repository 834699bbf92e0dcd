use std::io::{self, Read, Seek, SeekFrom, Write};
use crate::BfError;

/// Bytes shown on either side of an error position.
const WINDOW: usize = 32;

/// Program text around an error, starting at source offset `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    pub start: u64,
    pub bytes: Vec<u8>,
}

impl Excerpt {
    /// The whole of an in-memory program.
    pub fn whole(code: &[u8]) -> Self {
        Self { start: 0, bytes: code.to_vec() }
    }

    /// Read just the window around `pos` from a seekable source.
    pub fn read_around<R: Read + Seek>(mut source: R, pos: u64) -> io::Result<Self> {
        let start = pos.saturating_sub(WINDOW as u64);
        source.seek(SeekFrom::Start(start))?;
        let mut bytes = Vec::with_capacity(2 * WINDOW + 1);
        source.take(pos - start + WINDOW as u64 + 1).read_to_end(&mut bytes)?;
        Ok(Self { start, bytes })
    }
}

/// Pretty-print a [`BfError`] with caret positioning when the error points
/// into `code`. With `program` set, messages are prefixed as "bf: ...".
pub fn print_run_error(program: Option<&str>, code: Option<&Excerpt>, err: &BfError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    let msg = match err {
        BfError::UnmatchedBracket { kind, .. } => {
            prefix_program(&format!("Parse error: unmatched bracket {kind}"))
        }
        BfError::CapacityExceeded { index, limit } => prefix_program(&format!(
            "Runtime error: tape capacity exceeded (cell {index}, limit {limit})"
        )),
        BfError::Config(e) => prefix_program(&format!("Configuration error: {e}")),
        BfError::Io { source, .. } => prefix_program(&format!("I/O error: {source}")),
    };

    match (err.position(), code) {
        (Some(pos), Some(code)) => print_error_with_context(&msg, code, pos),
        (Some(pos), None) => eprintln!("{msg} at position {pos}"),
        _ => eprintln!("{msg}"),
    }
    let _ = io::stderr().flush();
}

/// Print a concise error with its byte offset and a caret under the
/// offending byte in a short window of surrounding source.
pub fn print_error_with_context(prefix: &str, code: &Excerpt, pos: u64) {
    eprintln!("{prefix} at position {pos}");

    let (line, caret_offset) = context_lines(code, pos);
    eprintln!("  {line}");
    eprintln!("  {}^", " ".repeat(caret_offset));
    let _ = io::stderr().flush();
}

/// The printable window around `pos` and the caret column inside it.
fn context_lines(code: &Excerpt, pos: u64) -> (String, usize) {
    let bytes = &code.bytes;
    let pos = (pos.saturating_sub(code.start) as usize).min(bytes.len());
    let start = pos.saturating_sub(WINDOW);
    let end = (pos + WINDOW + 1).min(bytes.len());

    // Caret under the exact position
    let caret_offset = printable(&bytes[start..pos]).chars().count();
    (printable(&bytes[start..end]), caret_offset)
}

/// Lossy UTF-8 with control characters flattened so the caret lines up.
fn printable(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
