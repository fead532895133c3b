use crate::boxes::{Atom, AtomFields, AtomHeader, FULL_HEADER_SIZE, FourCC, Leaf, Node};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::util::{read_full_header, read_payload};
use byteorder::{BigEndian, ReadBytesExt};
use std::any::Any;
use std::io::{Cursor, Write};

// layer .. height, shared by both versions
const TAIL_SIZE: u64 = 8 + 2 + 2 + 2 + 2 + 36 + 4 + 4;

/// Track header. Only version 0 timing fields are decoded; a version 1
/// leading block is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TkhdAtom {
    pub creation_time: u32,
    pub modification_time: u32,
    pub track_id: u32,
    pub duration: u32,
    pub layer: u16,
    pub alternate_group: u16,
    pub volume: u16,
    pub width: i32,
    pub height: i32,
    payload_size: u64,
}

pub fn decode_tkhd(hdr: &AtomHeader, src: &mut dyn ByteSource, _ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let payload_size = hdr.size as u64 - FULL_HEADER_SIZE;
    let lead = if full.version == 0 { 20 } else { 32 };
    if payload_size < lead + TAIL_SIZE {
        return Err(Error::Truncated(hdr.typ));
    }
    let buf = read_payload(src, hdr.typ, lead + TAIL_SIZE)?;
    let mut cur = Cursor::new(&buf);

    let mut tkhd = TkhdAtom {
        payload_size,
        ..Default::default()
    };
    if full.version == 0 {
        tkhd.creation_time = cur.read_u32::<BigEndian>()?;
        tkhd.modification_time = cur.read_u32::<BigEndian>()?;
        tkhd.track_id = cur.read_u32::<BigEndian>()?;
        let _reserved = cur.read_u32::<BigEndian>()?;
        tkhd.duration = cur.read_u32::<BigEndian>()?;
    } else {
        cur.set_position(32);
    }

    let _reserved = cur.read_u64::<BigEndian>()?;
    tkhd.layer = cur.read_u16::<BigEndian>()?;
    tkhd.alternate_group = cur.read_u16::<BigEndian>()?;
    tkhd.volume = cur.read_u16::<BigEndian>()?;
    // reserved(2) + matrix(36)
    cur.set_position(cur.position() + 2 + 36);
    tkhd.width = cur.read_i32::<BigEndian>()?;
    tkhd.height = cur.read_i32::<BigEndian>()?;

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Leaf(Leaf::TrackHeader(tkhd)),
    })
}

impl AtomFields for TkhdAtom {
    fn fields_size(&self) -> u64 {
        self.payload_size
    }

    fn write_fields(&self, typ: FourCC, _w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        Err(Error::Unsupported(typ))
    }

    fn writable(&self) -> bool {
        false
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        vec![
            ("track_id", self.track_id.to_string()),
            ("duration", self.duration.to_string()),
            ("creation_time", self.creation_time.to_string()),
            ("modification_time", self.modification_time.to_string()),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
            ("alternate_group", self.alternate_group.to_string()),
            ("layer", self.layer.to_string()),
            ("volume", self.volume.to_string()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
