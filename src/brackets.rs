//! Loop boundary resolution straight off the source stream.
//!
//! There is no bracket-pairing table. Skipping a loop whose cell is zero scans
//! forward counting nesting; repeating a loop seeks back to the position
//! recorded when it was entered.

use std::io::{Read, Seek};

use crate::error::{BfError, UnmatchedBracketKind};
use crate::source::SourceCursor;

/// Skip past the `]` matching a `[` read at `open_pos`.
///
/// The cursor must sit just after that `[`. Skipped bytes are not executed.
/// On success the cursor is left just after the matching `]`.
pub fn skip_forward<R: Read + Seek>(cursor: &mut SourceCursor<R>, open_pos: u64) -> Result<(), BfError> {
    let mut depth: usize = 0;

    while let Some(byte) = cursor.read_one() {
        match byte {
            b'[' => depth += 1,
            b']' if depth == 0 => {
                log::debug!("Skipped loop at {}..{}", open_pos, cursor.position());
                return Ok(());
            }
            b']' => depth -= 1,
            _ => {}
        }
    }

    Err(BfError::UnmatchedBracket { kind: UnmatchedBracketKind::Open, pos: open_pos })
}

/// Rewind to `body`, the position just after the innermost entered `[`.
///
/// `close_pos` is where the `]` was read; seek failures are reported there.
pub fn jump_back<R: Read + Seek>(cursor: &mut SourceCursor<R>, body: u64, close_pos: u64) -> Result<(), BfError> {
    cursor
        .seek(body)
        .map_err(|source| BfError::Io { pos: close_pos, source })
}
