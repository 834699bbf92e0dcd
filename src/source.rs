use std::io::{self, BufRead, BufReader, Cursor, Read, Seek};

/// Seekable, position-tracking reader over a program's bytes.
///
/// Reads never fail: end of stream and read errors both come back as `None`.
/// Seeks are relative to the tracked position so short backward jumps stay
/// inside the read buffer.
pub struct SourceCursor<R> {
    reader: BufReader<R>,
    pos: u64,
}

impl<'a> SourceCursor<Cursor<&'a [u8]>> {
    /// Cursor over an in-memory program.
    pub fn from_bytes(code: &'a [u8]) -> Self {
        Self::new(Cursor::new(code))
    }
}

impl<R> SourceCursor<R> {
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl<R: Read + Seek> SourceCursor<R> {
    /// Wrap `inner`, taking its current stream position as the starting offset.
    pub fn new(mut inner: R) -> Self {
        let pos = inner.stream_position().unwrap_or(0);
        Self { reader: BufReader::new(inner), pos }
    }

    pub fn read_one(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.reader.consume(1);
        self.pos += 1;
        Some(byte)
    }

    pub fn seek(&mut self, offset: u64) -> io::Result<()> {
        let delta = offset as i64 - self.pos as i64;
        if delta != 0 {
            self.reader.seek_relative(delta)?;
            self.pos = offset;
        }
        Ok(())
    }

    /// Next byte without consuming it.
    pub fn peek(&mut self) -> Option<u8> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("Source read failed at position {}: {}; treating as end of program", self.pos, e);
                    return None;
                }
            }
        }
    }
}
