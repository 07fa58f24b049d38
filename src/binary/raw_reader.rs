//! Byte-level scanner over binary Ion (`spec.md` §4.5): tag parsing, length
//! reading, `stepIn`/`stepOut`, skip. Annotation wrappers are transparently
//! unwrapped here; the annotation IDs they carried are exposed alongside the
//! wrapped value so the layer above (`super::reader::BinaryReader`) doesn't
//! need to special-case them.

use std::io::Read;

use crate::error::{IonError, IonResult};
use crate::io::ByteSource;

use super::primitives::MAX_VAR_LEN;

const BVM_TAG: u8 = 0xE0;
const BVM_TAIL: [u8; 3] = [0x01, 0x00, 0xEA];

#[derive(Debug, Clone)]
pub struct RawValue {
    /// The Ion type code, `0x0..0xD` (annotation-wrapper tags never surface
    /// here — they're unwrapped before the caller sees them).
    pub code: u8,
    pub low_nibble: u8,
    pub len: u64,
    pub is_null: bool,
    pub field_id: Option<u64>,
    pub annotation_ids: Vec<u64>,
}

impl RawValue {
    pub fn bool_value(&self) -> bool {
        self.low_nibble == 0x1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawItem {
    /// Nothing more at this depth (container end or stream end).
    Nothing,
    VersionMarker(u8, u8),
    Value,
}

struct Frame {
    end: u64,
    is_struct: bool,
}

pub struct RawBinaryReader<R> {
    source: ByteSource<R>,
    stack: Vec<Frame>,
    current: Option<RawValue>,
    /// True once `current` has been returned by `next()` but neither
    /// consumed (`read_body`) nor entered (`step_in`) — its bytes must be
    /// skipped before the next `next()` call.
    pending_skip: bool,
}

impl<R: Read> RawBinaryReader<R> {
    pub fn new(source: ByteSource<R>) -> RawBinaryReader<R> {
        RawBinaryReader {
            source,
            stack: Vec::new(),
            current: None,
            pending_skip: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Option<&RawValue> {
        self.current.as_ref()
    }

    fn at_container_end(&mut self) -> IonResult<bool> {
        match self.stack.last() {
            Some(frame) => Ok(self.source.position() >= frame.end),
            None => self.source.is_at_eof(),
        }
    }

    fn read_var_uint(&mut self) -> IonResult<u64> {
        let mut value: u64 = 0;
        for i in 0..MAX_VAR_LEN {
            let b = self.source.read_u8()?;
            value = (value << 7) | (b & 0x7F) as u64;
            if b & 0x80 != 0 {
                return Ok(value);
            }
            if i == MAX_VAR_LEN - 1 {
                return Err(IonError::syntax(self.source.position(), "VarUInt exceeds maximum length"));
            }
        }
        unreachable!()
    }

    /// Reads one tag byte and its length/null sentinel, without unwrapping
    /// annotations (used both at the top level and recursively once an
    /// annotation wrapper's prelude has been consumed).
    fn read_tag(&mut self) -> IonResult<(u8, u8, u64, bool)> {
        let offset = self.source.position();
        let tag = self.source.read_u8()?;
        let code = tag >> 4;
        let low = tag & 0x0F;
        if low == 0x0F {
            return Ok((code, low, 0, true));
        }
        if low == 0x0E {
            let len = self.read_var_uint()?;
            return Ok((code, low, len, false));
        }
        let _ = offset;
        Ok((code, low, low as u64, false))
    }

    /// Reads the next stream item, implicitly skipping an unconsumed
    /// current value first, and reading a struct field ID when the parent
    /// context calls for one.
    pub fn next(&mut self) -> IonResult<RawItem> {
        if self.pending_skip {
            let len = self.current.as_ref().map(|v| v.len).unwrap_or(0);
            self.source.skip(len)?;
            self.pending_skip = false;
        }
        self.current = None;

        if self.at_container_end()? {
            return Ok(RawItem::Nothing);
        }

        let field_id = if matches!(self.stack.last(), Some(f) if f.is_struct) {
            Some(self.read_var_uint()?)
        } else {
            None
        };

        let offset = self.source.position();
        let (mut code, mut low, mut len, mut is_null) = self.read_tag()?;

        if code == 0xE && low == 0 {
            if !self.stack.is_empty() {
                return Err(IonError::syntax(offset, "binary version marker is only legal at the top level"));
            }
            let tail = self.source.read_exact(3)?;
            if tail[..] != BVM_TAIL {
                return Err(IonError::UnsupportedVersion {
                    major: tail[0],
                    minor: tail[1],
                    offset,
                });
            }
            self.current = None;
            return Ok(RawItem::VersionMarker(1, 0));
        }

        let mut annotation_ids = Vec::new();
        if code == 0xE {
            if low == 0 || is_null {
                return Err(IonError::InvalidTagByte { byte: (code << 4) | low, offset });
            }
            let wrapper_end = self.source.position() + len;
            let annot_len = self.read_var_uint()?;
            let annot_end = self.source.position() + annot_len;
            while self.source.position() < annot_end {
                annotation_ids.push(self.read_var_uint()?);
            }
            if self.source.position() != annot_end {
                return Err(IonError::syntax(offset, "annotation ID list length mismatch"));
            }
            if annotation_ids.is_empty() {
                return Err(IonError::syntax(offset, "annotation wrapper with no annotations"));
            }
            let inner_offset = self.source.position();
            let (inner_code, inner_low, inner_len, inner_null) = self.read_tag()?;
            if inner_code == 0xE {
                return Err(IonError::syntax(inner_offset, "nested annotation wrappers are invalid"));
            }
            code = inner_code;
            low = inner_low;
            len = inner_len;
            is_null = inner_null;
            if self.source.position() + len != wrapper_end {
                return Err(IonError::syntax(offset, "annotation wrapper length does not match its contents"));
            }
        }

        if code == 0x1 && !is_null && low > 0x1 {
            return Err(IonError::InvalidTagByte { byte: (code << 4) | low, offset });
        }

        self.current = Some(RawValue {
            code,
            low_nibble: low,
            len,
            is_null,
            field_id,
            annotation_ids,
        });
        self.pending_skip = true;
        Ok(RawItem::Value)
    }

    /// Reads the current value's raw body bytes. Must be called before
    /// `step_in`/the next `next()`.
    pub fn read_body(&mut self) -> IonResult<Vec<u8>> {
        let len = self
            .current
            .as_ref()
            .ok_or_else(|| IonError::usage("read_body called with no current value"))?
            .len;
        self.pending_skip = false;
        self.source.read_exact(len as usize)
    }

    /// Descends into the current container value.
    pub fn step_in(&mut self) -> IonResult<()> {
        let value = self
            .current
            .clone()
            .ok_or_else(|| IonError::usage("step_in called with no current value"))?;
        if !(0xB..=0xD).contains(&value.code) {
            return Err(IonError::usage("step_in called on a non-container value"));
        }
        let start = self.source.position();
        let end = start + value.len;
        self.stack.push(Frame {
            end,
            is_struct: value.code == 0xD,
        });
        self.pending_skip = false;
        self.current = None;
        Ok(())
    }

    /// Ascends out of the current container, discarding any unread bytes.
    pub fn step_out(&mut self) -> IonResult<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| IonError::usage("step_out called at the top level"))?;
        self.source.seek_to(frame.end)?;
        self.source.discard_before(frame.end);
        self.pending_skip = false;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> RawBinaryReader<&[u8]> {
        RawBinaryReader::new(ByteSource::new(bytes))
    }

    #[test]
    fn reads_bvm_then_an_int() {
        let mut r = reader(&[0xE0, 0x01, 0x00, 0xEA, 0x20]);
        assert_eq!(r.next().unwrap(), RawItem::VersionMarker(1, 0));
        assert_eq!(r.next().unwrap(), RawItem::Value);
        let v = r.current().unwrap();
        assert_eq!(v.code, 0x2);
        assert_eq!(v.len, 0);
        assert!(r.next().unwrap() == RawItem::Nothing);
    }

    #[test]
    fn reads_three_bools() {
        let mut r = reader(&[0x10, 0x11, 0x1F]);
        r.next().unwrap();
        assert!(!r.current().unwrap().bool_value());
        assert!(!r.current().unwrap().is_null);
        r.next().unwrap();
        assert!(r.current().unwrap().bool_value());
        r.next().unwrap();
        assert!(r.current().unwrap().is_null);
    }

    #[test]
    fn steps_into_and_out_of_a_list() {
        // [1, 2]
        let mut r = reader(&[0xB4, 0x21, 0x01, 0x21, 0x02, 0x20]);
        r.next().unwrap();
        assert_eq!(r.current().unwrap().code, 0xB);
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_body().unwrap(), vec![0x01]);
        r.next().unwrap();
        assert_eq!(r.read_body().unwrap(), vec![0x02]);
        assert_eq!(r.next().unwrap(), RawItem::Nothing);
        r.step_out().unwrap();
        r.next().unwrap();
        assert_eq!(r.current().unwrap().code, 0x2);
    }

    #[test]
    fn step_out_discards_unread_children() {
        let mut r = reader(&[0xB4, 0x21, 0x01, 0x21, 0x02, 0x20]);
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap(); // first child, unread body
        r.step_out().unwrap();
        r.next().unwrap();
        assert_eq!(r.current().unwrap().code, 0x2);
    }

    #[test]
    fn annotation_wrapper_is_unwrapped() {
        // $ion_symbol_table-style: annotation id 7 wrapping int 1 (0x21 0x01).
        // wrapper body = VarUInt(1) annot_len=0x81, VarUInt id=0x87, tag+body 0x21 0x01
        let mut r = reader(&[0xE4, 0x81, 0x87, 0x21, 0x01]);
        r.next().unwrap();
        let v = r.current().unwrap();
        assert_eq!(v.code, 0x2);
        assert_eq!(v.annotation_ids, vec![7]);
        assert_eq!(r.read_body().unwrap(), vec![0x01]);
    }

    #[test]
    fn struct_field_ids_are_read() {
        // {$4: 1} where $4 is the well-known "name" symbol id, value int 1.
        let mut r = reader(&[0xD3, 0x84, 0x21, 0x01]);
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        let v = r.current().unwrap();
        assert_eq!(v.field_id, Some(4));
        assert_eq!(v.code, 0x2);
    }
}
