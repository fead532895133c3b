use crate::boxes::{AtomFields, AtomHeader, FourCC};
use crate::error::{Error, Result};
use crate::parser::ByteSource;
use crate::util::read_slice;
use std::any::Any;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Bytes preview length used by dumps.
const PREVIEW_LEN: u64 = 16;

/// Payload bytes that are either still in the source or held in memory.
///
/// A deferred payload only records where it lives; reading it needs the same
/// source the tree was parsed from, borrowed exclusively for the duration of
/// the read so nothing else can move the cursor in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Deferred { offset: u64, len: u64 },
    Owned(Vec<u8>),
}

impl Payload {
    pub fn len(&self) -> u64 {
        match self {
            Payload::Deferred { len, .. } => *len,
            Payload::Owned(bytes) => bytes.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn load(&self, src: &mut dyn ByteSource) -> io::Result<Vec<u8>> {
        match self {
            Payload::Deferred { offset, len } => read_slice(src, *offset, *len),
            Payload::Owned(bytes) => Ok(bytes.clone()),
        }
    }

    /// First `max` bytes, for previews.
    pub fn head(&self, src: &mut dyn ByteSource, max: u64) -> io::Result<Vec<u8>> {
        match self {
            Payload::Deferred { offset, len } => read_slice(src, *offset, (*len).min(max)),
            Payload::Owned(bytes) => Ok(bytes[..bytes.len().min(max as usize)].to_vec()),
        }
    }

    /// Copy the payload to `w`; a deferred payload is streamed through a
    /// bounded buffer.
    pub fn copy_to(&self, typ: FourCC, w: &mut dyn Write, src: &mut dyn ByteSource) -> Result<()> {
        match self {
            Payload::Deferred { offset, len } => {
                src.seek(SeekFrom::Start(*offset))?;
                let mut region = Read::take(src, *len);
                let copied = io::copy(&mut region, w)?;
                if copied != *len {
                    return Err(Error::Truncated(typ));
                }
            }
            Payload::Owned(bytes) => w.write_all(bytes)?,
        }
        Ok(())
    }
}

/// An atom of a kind nothing claimed, kept by reference for lossless writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passthrough {
    payload: Payload,
}

impl Passthrough {
    pub fn deferred(hdr: &AtomHeader) -> Self {
        Self {
            payload: Payload::Deferred {
                offset: hdr.payload_offset(),
                len: hdr.end() - hdr.payload_offset(),
            },
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            payload: Payload::Owned(bytes),
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Source offset of the payload, if it was never loaded.
    pub fn source_offset(&self) -> Option<u64> {
        match self.payload {
            Payload::Deferred { offset, .. } => Some(offset),
            Payload::Owned(_) => None,
        }
    }

    pub fn load(&self, src: &mut dyn ByteSource) -> Result<Vec<u8>> {
        Ok(self.payload.load(src)?)
    }
}

impl AtomFields for Passthrough {
    fn fields_size(&self) -> u64 {
        self.payload.len()
    }

    fn write_fields(&self, typ: FourCC, w: &mut dyn Write, src: &mut dyn ByteSource) -> Result<()> {
        self.payload.copy_to(typ, w, src)
    }

    fn describe(&self, src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        let mut out = vec![("payload_size", self.payload.len().to_string())];
        if let Ok(head) = self.payload.head(src, PREVIEW_LEN) {
            if !head.is_empty() {
                out.push(("payload_head", hex::encode(head)));
            }
        }
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
