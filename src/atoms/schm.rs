use crate::boxes::{Atom, AtomFields, AtomHeader, FULL_HEADER_SIZE, FourCC, FullHeader, Leaf, Node};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::util::{nul_terminated, padded_width, read_full_header, read_payload, write_padded};
use byteorder::{BigEndian, WriteBytesExt};
use std::any::Any;
use std::io::Write;

/// Scheme type of a protected track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchmAtom {
    pub scheme_type: FourCC,
    pub scheme_version: u32,
    pub scheme_uri: String,
    uri_field_size: u64, // NUL padded width of the uri on disk
}

impl SchmAtom {
    /// New scheme type whose uri field is the uri plus one terminating NUL.
    pub fn new(scheme_type: FourCC, scheme_version: u32, scheme_uri: &str) -> Self {
        Self {
            scheme_type,
            scheme_version,
            scheme_uri: scheme_uri.to_string(),
            uri_field_size: scheme_uri.len() as u64 + 1,
        }
    }

    fn uri_width(&self) -> u64 {
        padded_width(self.uri_field_size, &self.scheme_uri)
    }

    pub fn into_atom(self, flags: u32) -> Result<Atom> {
        Atom::leaf(
            FourCC(*b"schm"),
            Some(FullHeader { version: 0, flags }),
            Leaf::SchemeType(self),
        )
    }
}

pub fn decode_schm(hdr: &AtomHeader, src: &mut dyn ByteSource, _ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let payload_size = hdr.size as u64 - FULL_HEADER_SIZE;
    if payload_size < 8 {
        return Err(Error::Truncated(hdr.typ));
    }
    let buf = read_payload(src, hdr.typ, payload_size)?;

    let schm = SchmAtom {
        scheme_type: FourCC([buf[0], buf[1], buf[2], buf[3]]),
        scheme_version: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        scheme_uri: nul_terminated(&buf[8..]),
        uri_field_size: payload_size - 8,
    };

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Leaf(Leaf::SchemeType(schm)),
    })
}

impl AtomFields for SchmAtom {
    fn fields_size(&self) -> u64 {
        8 + self.uri_width()
    }

    fn write_fields(&self, _typ: FourCC, w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        w.write_all(&self.scheme_type.0)?;
        w.write_u32::<BigEndian>(self.scheme_version)?;
        write_padded(w, &self.scheme_uri, self.uri_width())?;
        Ok(())
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        vec![
            ("scheme_type", self.scheme_type.to_string()),
            ("scheme_version", self.scheme_version.to_string()),
            ("scheme_uri", self.scheme_uri.clone()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
