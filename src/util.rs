use crate::boxes::{AtomHeader, FULL_HEADER_SIZE, FourCC, FullHeader};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Read `len` bytes at `offset`, failing with `UnexpectedEof` if the source is shorter.
pub fn read_slice<R: Read + Seek + ?Sized>(r: &mut R, offset: u64, len: u64) -> io::Result<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;
    let mut v = Vec::new();
    r.take(len).read_to_end(&mut v)?;
    if (v.len() as u64) < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(v)
}

/// Read the next `len` bytes of a `typ` atom's payload.
pub fn read_payload<R: Read + ?Sized>(r: &mut R, typ: FourCC, len: u64) -> Result<Vec<u8>> {
    let mut v = Vec::new();
    r.take(len).read_to_end(&mut v)?;
    if (v.len() as u64) < len {
        return Err(Error::Truncated(typ));
    }
    Ok(v)
}

/// Read version and flags, checking the declared size leaves room for them.
pub fn read_full_header<R: Read + ?Sized>(hdr: &AtomHeader, r: &mut R) -> Result<FullHeader> {
    if (hdr.size as u64) < FULL_HEADER_SIZE {
        return Err(Error::InvalidSize {
            offset: hdr.start,
            size: hdr.size as u64,
        });
    }
    let version = r.read_u8()?;
    let flags = r.read_u24::<BigEndian>()?;
    Ok(FullHeader { version, flags })
}

/// UTF-8 text up to the first NUL (or the whole buffer).
pub fn nul_terminated(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Width of a NUL padded string field holding `s`: the parsed `width`,
/// grown to fit `s` plus its terminator once `s` no longer fits.
pub fn padded_width(width: u64, s: &str) -> u64 {
    let len = s.len() as u64;
    if len > width { len + 1 } else { width }
}

/// Write `s` followed by NUL padding up to `width` bytes.
pub fn write_padded(w: &mut dyn Write, s: &str, width: u64) -> io::Result<()> {
    let bytes = s.as_bytes();
    w.write_all(bytes)?;
    let pad = width.saturating_sub(bytes.len() as u64);
    io::copy(&mut io::repeat(0).take(pad), w)?;
    Ok(())
}

/// Writer adapter that counts what passes through it.
pub struct CountingWriter<W> {
    inner: W,
    count: u64,
}

impl<W: Write> CountingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
