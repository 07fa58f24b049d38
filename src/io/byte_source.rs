use std::io::Read;

use crate::error::{IonError, IonResult};

/// A forward-only `Read` wrapped in a growable buffer, giving the binary
/// reader the position-based rewinding it needs for `StepOut` (seeking back
/// to the start of the parent container's remaining bytes) without requiring
/// the underlying source to support random access.
///
/// Adapted from the teacher's `io/byte_source.rs` `ByteSource` trait, which
/// abstracted over random-access file/memory sources for its ebook container
/// formats. Ion's binary reader never needs concurrent or truly random reads
/// into the stream — just "read forward" and "seek back to a position
/// already seen" — so this narrows that trait down to a single buffered
/// cursor over one source.
pub struct ByteSource<R> {
    inner: R,
    buf: Vec<u8>,
    /// Byte offset (from the start of the stream) of `buf[0]`.
    base: u64,
    /// Current read position, absolute from the start of the stream.
    pos: u64,
    eof: bool,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> ByteSource<R> {
        ByteSource {
            inner,
            buf: Vec::new(),
            base: 0,
            pos: 0,
            eof: false,
        }
    }

    /// Current absolute position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Seeks back to `pos`, which must be at or after `base` (i.e. still
    /// held in the buffer). Used by `StepOut` to resume reading a parent
    /// container's siblings after a nested value was skipped or fully
    /// consumed.
    pub fn seek_to(&mut self, pos: u64) -> IonResult<()> {
        if pos < self.base {
            return Err(IonError::Syntax {
                offset: pos,
                message: "cannot rewind past the start of the buffered window".to_string(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    fn buffered_len(&self) -> u64 {
        self.base + self.buf.len() as u64
    }

    /// Ensures at least `extra` bytes are available past the current
    /// position, pulling more from `inner` as needed.
    fn fill(&mut self, extra: u64) -> IonResult<()> {
        while !self.eof && self.buffered_len() < self.pos + extra {
            let mut chunk = [0u8; 8192];
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(())
    }

    /// Reads exactly `len` bytes at the current position and advances past
    /// them.
    pub fn read_exact(&mut self, len: usize) -> IonResult<Vec<u8>> {
        self.fill(len as u64)?;
        let start = (self.pos - self.base) as usize;
        let end = start + len;
        if end > self.buf.len() {
            return Err(IonError::UnexpectedEof { offset: self.pos });
        }
        self.pos += len as u64;
        Ok(self.buf[start..end].to_vec())
    }

    /// Reads a single byte, advancing past it.
    pub fn read_u8(&mut self) -> IonResult<u8> {
        Ok(self.read_exact(1)?[0])
    }

    /// Peeks a single byte without advancing, returning `None` at EOF.
    pub fn peek_u8(&mut self) -> IonResult<Option<u8>> {
        self.fill(1)?;
        let idx = (self.pos - self.base) as usize;
        Ok(self.buf.get(idx).copied())
    }

    /// Skips `len` bytes without materializing them.
    pub fn skip(&mut self, len: u64) -> IonResult<()> {
        self.fill(len)?;
        if self.pos + len > self.buffered_len() {
            return Err(IonError::UnexpectedEof { offset: self.pos });
        }
        self.pos += len;
        Ok(())
    }

    /// True once the underlying source is exhausted and every buffered byte
    /// has been consumed.
    pub fn is_at_eof(&mut self) -> IonResult<bool> {
        self.fill(1)?;
        Ok(self.pos >= self.buffered_len())
    }

    /// Drops buffered bytes before `upto`, since `StepOut` never rewinds
    /// past the start of the innermost still-open container. Bounded memory
    /// growth for long streams of sibling top-level values.
    pub fn discard_before(&mut self, upto: u64) {
        if upto <= self.base {
            return;
        }
        let drop = (upto - self.base).min(self.buf.len() as u64) as usize;
        self.buf.drain(..drop);
        self.base += drop as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sequential_bytes() {
        let mut src = ByteSource::new(&b"hello world"[..]);
        assert_eq!(src.read_exact(5).unwrap(), b"hello");
        assert_eq!(src.read_u8().unwrap(), b' ');
        assert_eq!(src.read_exact(5).unwrap(), b"world");
        assert!(src.is_at_eof().unwrap());
    }

    #[test]
    fn seek_back_resumes_a_container() {
        let mut src = ByteSource::new(&b"abcdef"[..]);
        let mark = src.position();
        src.read_exact(3).unwrap();
        src.seek_to(mark).unwrap();
        assert_eq!(src.read_exact(6).unwrap(), b"abcdef");
    }

    #[test]
    fn peek_does_not_advance() {
        let mut src = ByteSource::new(&b"xy"[..]);
        assert_eq!(src.peek_u8().unwrap(), Some(b'x'));
        assert_eq!(src.peek_u8().unwrap(), Some(b'x'));
        assert_eq!(src.read_u8().unwrap(), b'x');
        assert_eq!(src.peek_u8().unwrap(), Some(b'y'));
    }

    #[test]
    fn reading_past_eof_is_an_error() {
        let mut src = ByteSource::new(&b"ab"[..]);
        assert!(src.read_exact(5).is_err());
    }

    #[test]
    fn discard_before_frees_consumed_prefix_without_breaking_later_reads() {
        let mut src = ByteSource::new(&b"abcdef"[..]);
        src.read_exact(3).unwrap();
        src.discard_before(3);
        assert_eq!(src.read_exact(3).unwrap(), b"def");
    }
}
