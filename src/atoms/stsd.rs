use crate::boxes::{
    Atom, AtomFields, AtomHeader, Container, FULL_HEADER_SIZE, FourCC, HEADER_SIZE, Node, Preamble,
};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::util::{nul_terminated, read_full_header, read_payload};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::any::Any;
use std::io::{self, Cursor, Read, Write};
use tracing::debug;

const ENTRY_FIELDS_SIZE: u64 = 8;
const AUDIO_FIELDS_SIZE: u64 = ENTRY_FIELDS_SIZE + 20;
const VIDEO_FIELDS_SIZE: u64 = ENTRY_FIELDS_SIZE + 70;
const COMPRESSOR_NAME_SIZE: usize = 32;

/// Sample description table: a count followed by that many sample entries.
pub fn decode_stsd(hdr: &AtomHeader, src: &mut dyn ByteSource, ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    if (hdr.size as u64) < FULL_HEADER_SIZE + 4 {
        return Err(Error::Truncated(hdr.typ));
    }
    let entry_count = src.read_u32::<BigEndian>()?;

    let inner = ctx.enter(hdr.typ);
    let mut remaining = hdr.size as u64 - FULL_HEADER_SIZE - 4;
    let mut entries = Vec::new();
    for _ in 0..entry_count {
        match inner.create_atom(src, &mut remaining)? {
            Some(entry) => entries.push(entry),
            // nothing further can fit either
            None => break,
        }
    }
    if entries.len() as u64 != entry_count as u64 {
        debug!(
            declared = entry_count,
            parsed = entries.len(),
            "sample description entries skipped"
        );
    }

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Container(Container {
            preamble: Preamble::SampleDescription { entry_count },
            children: entries,
        }),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioFields {
    pub channel_count: u16,
    pub sample_size: u16,
    /// 16.16 fixed point.
    pub sample_rate: u32,
}

impl AudioFields {
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate >> 16
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoFields {
    pub width: u16,
    pub height: u16,
    pub horizontal_resolution: i32,
    pub vertical_resolution: i32,
    pub frame_count: u16,
    pub compressor_name: String,
    pub depth: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEntryKind {
    Generic,
    Audio(AudioFields),
    Video(VideoFields),
}

/// Fields every sample entry starts with, plus the audio or video block
/// that follows for those formats. Child atoms (`esds`, `avcC`, `sinf`, ...)
/// live in the surrounding container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    pub data_reference_index: u16,
    pub kind: SampleEntryKind,
}

impl SampleEntry {
    pub fn generic(data_reference_index: u16) -> Self {
        Self {
            data_reference_index,
            kind: SampleEntryKind::Generic,
        }
    }

    pub fn audio(&self) -> Option<&AudioFields> {
        match &self.kind {
            SampleEntryKind::Audio(a) => Some(a),
            _ => None,
        }
    }

    pub fn video(&self) -> Option<&VideoFields> {
        match &self.kind {
            SampleEntryKind::Video(v) => Some(v),
            _ => None,
        }
    }

    /// Wrap this entry and its children into a `typ` atom.
    pub fn into_atom(self, typ: FourCC, children: Vec<Atom>) -> Result<Atom> {
        let node = Node::Container(Container {
            preamble: Preamble::SampleEntry(self),
            children,
        });
        Atom::new(typ, None, node)
    }
}

fn decode_entry(
    hdr: &AtomHeader,
    src: &mut dyn ByteSource,
    ctx: Context<'_>,
    fields_size: u64,
    read_kind: fn(&mut Cursor<Vec<u8>>) -> io::Result<SampleEntryKind>,
) -> Result<Atom> {
    let payload_size = hdr.size as u64 - HEADER_SIZE;
    if payload_size < fields_size {
        return Err(Error::Truncated(hdr.typ));
    }
    let mut cur = Cursor::new(read_payload(src, hdr.typ, fields_size)?);

    // reserved(6)
    cur.set_position(6);
    let data_reference_index = cur.read_u16::<BigEndian>()?;
    let kind = read_kind(&mut cur)?;

    let children = ctx.read_children(hdr.typ, src, payload_size - fields_size)?;
    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: None,
        node: Node::Container(Container {
            preamble: Preamble::SampleEntry(SampleEntry {
                data_reference_index,
                kind,
            }),
            children,
        }),
    })
}

pub fn decode_generic_entry(
    hdr: &AtomHeader,
    src: &mut dyn ByteSource,
    ctx: Context<'_>,
) -> Result<Atom> {
    decode_entry(hdr, src, ctx, ENTRY_FIELDS_SIZE, |_| Ok(SampleEntryKind::Generic))
}

pub fn decode_audio_entry(
    hdr: &AtomHeader,
    src: &mut dyn ByteSource,
    ctx: Context<'_>,
) -> Result<Atom> {
    decode_entry(hdr, src, ctx, AUDIO_FIELDS_SIZE, |cur| {
        // version(2) + revision(2) + vendor(4)
        cur.set_position(cur.position() + 8);
        let channel_count = cur.read_u16::<BigEndian>()?;
        let sample_size = cur.read_u16::<BigEndian>()?;
        cur.set_position(cur.position() + 4);
        let sample_rate = cur.read_u32::<BigEndian>()?;
        Ok(SampleEntryKind::Audio(AudioFields {
            channel_count,
            sample_size,
            sample_rate,
        }))
    })
}

pub fn decode_video_entry(
    hdr: &AtomHeader,
    src: &mut dyn ByteSource,
    ctx: Context<'_>,
) -> Result<Atom> {
    decode_entry(hdr, src, ctx, VIDEO_FIELDS_SIZE, |cur| {
        cur.set_position(cur.position() + 16);
        let width = cur.read_u16::<BigEndian>()?;
        let height = cur.read_u16::<BigEndian>()?;
        let horizontal_resolution = cur.read_i32::<BigEndian>()?;
        let vertical_resolution = cur.read_i32::<BigEndian>()?;
        cur.set_position(cur.position() + 4);
        let frame_count = cur.read_u16::<BigEndian>()?;

        let mut name = [0u8; COMPRESSOR_NAME_SIZE];
        cur.read_exact(&mut name)?;
        let len = (name[0] as usize).min(COMPRESSOR_NAME_SIZE - 1);
        let compressor_name = nul_terminated(&name[1..1 + len]);

        let depth = cur.read_u16::<BigEndian>()?;
        Ok(SampleEntryKind::Video(VideoFields {
            width,
            height,
            horizontal_resolution,
            vertical_resolution,
            frame_count,
            compressor_name,
            depth,
        }))
    })
}

impl AtomFields for SampleEntry {
    fn fields_size(&self) -> u64 {
        match self.kind {
            SampleEntryKind::Generic => ENTRY_FIELDS_SIZE,
            SampleEntryKind::Audio(_) => AUDIO_FIELDS_SIZE,
            SampleEntryKind::Video(_) => VIDEO_FIELDS_SIZE,
        }
    }

    fn write_fields(&self, _typ: FourCC, w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        w.write_all(&[0u8; 6])?;
        w.write_u16::<BigEndian>(self.data_reference_index)?;

        match &self.kind {
            SampleEntryKind::Generic => {}
            SampleEntryKind::Audio(a) => {
                w.write_all(&[0u8; 8])?;
                w.write_u16::<BigEndian>(a.channel_count)?;
                w.write_u16::<BigEndian>(a.sample_size)?;
                w.write_all(&[0u8; 4])?;
                w.write_u32::<BigEndian>(a.sample_rate)?;
            }
            SampleEntryKind::Video(v) => {
                w.write_all(&[0u8; 16])?;
                w.write_u16::<BigEndian>(v.width)?;
                w.write_u16::<BigEndian>(v.height)?;
                w.write_i32::<BigEndian>(v.horizontal_resolution)?;
                w.write_i32::<BigEndian>(v.vertical_resolution)?;
                w.write_all(&[0u8; 4])?;
                w.write_u16::<BigEndian>(v.frame_count)?;

                let mut name = [0u8; COMPRESSOR_NAME_SIZE];
                let bytes = v.compressor_name.as_bytes();
                let len = bytes.len().min(COMPRESSOR_NAME_SIZE - 1);
                name[0] = len as u8;
                name[1..1 + len].copy_from_slice(&bytes[..len]);
                w.write_all(&name)?;

                w.write_u16::<BigEndian>(v.depth)?;
                w.write_i16::<BigEndian>(-1)?;
            }
        }
        Ok(())
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        let mut out = vec![("data_reference_index", self.data_reference_index.to_string())];
        match &self.kind {
            SampleEntryKind::Generic => {}
            SampleEntryKind::Audio(a) => {
                out.push(("channel_count", a.channel_count.to_string()));
                out.push(("sample_size", a.sample_size.to_string()));
                out.push(("sample_rate", a.sample_rate_hz().to_string()));
            }
            SampleEntryKind::Video(v) => {
                out.push(("width", v.width.to_string()));
                out.push(("height", v.height.to_string()));
                out.push(("horizontal_resolution", v.horizontal_resolution.to_string()));
                out.push(("vertical_resolution", v.vertical_resolution.to_string()));
                out.push(("frame_count", v.frame_count.to_string()));
                out.push(("depth", v.depth.to_string()));
                out.push(("compressor_name", v.compressor_name.clone()));
            }
        }
        out
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
