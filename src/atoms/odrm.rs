//! OMA DCF protection headers.

use crate::boxes::{
    Atom, AtomFields, AtomHeader, Container, FULL_HEADER_SIZE, FourCC, Leaf, Node, Preamble,
};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::util::{read_full_header, read_payload};
use byteorder::{BigEndian, ReadBytesExt};
use std::any::Any;
use std::fmt;
use std::io::Write;

// method(1) + padding(1) + plaintext length(8) + three u16 string lengths
const OHDR_FIXED_SIZE: u64 = 1 + 1 + 8 + 2 + 2 + 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMethod {
    Null,
    AesCbc,
    AesCtr,
    Unknown(u8),
}

impl From<u8> for EncryptionMethod {
    fn from(v: u8) -> Self {
        match v {
            0 => EncryptionMethod::Null,
            1 => EncryptionMethod::AesCbc,
            2 => EncryptionMethod::AesCtr,
            other => EncryptionMethod::Unknown(other),
        }
    }
}

impl fmt::Display for EncryptionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncryptionMethod::Null => "Null",
            EncryptionMethod::AesCbc => "AES CBC",
            EncryptionMethod::AesCtr => "AES CTR",
            EncryptionMethod::Unknown(_) => "Unknown",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingScheme {
    None,
    Rfc2630,
    Unknown(u8),
}

impl From<u8> for PaddingScheme {
    fn from(v: u8) -> Self {
        match v {
            0 => PaddingScheme::None,
            1 => PaddingScheme::Rfc2630,
            other => PaddingScheme::Unknown(other),
        }
    }
}

impl fmt::Display for PaddingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaddingScheme::None => "None",
            PaddingScheme::Rfc2630 => "RFC 2630",
            PaddingScheme::Unknown(_) => "Unknown",
        })
    }
}

/// Fields of the common headers atom (`ohdr`) that precede its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OhdrFields {
    pub encryption_method: EncryptionMethod,
    pub padding_scheme: PaddingScheme,
    pub plaintext_length: u64,
    pub content_id: String,
    pub rights_issuer_url: String,
    pub textual_headers: String,
    fields_size: u64,
}

pub fn decode_ohdr(hdr: &AtomHeader, src: &mut dyn ByteSource, ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let payload_size = hdr.size as u64 - FULL_HEADER_SIZE;
    if payload_size < OHDR_FIXED_SIZE {
        return Err(Error::Truncated(hdr.typ));
    }

    let encryption_method = EncryptionMethod::from(src.read_u8()?);
    let padding_scheme = PaddingScheme::from(src.read_u8()?);
    let plaintext_length = src.read_u64::<BigEndian>()?;
    let declared = [
        src.read_u16::<BigEndian>()? as u64,
        src.read_u16::<BigEndian>()? as u64,
        src.read_u16::<BigEndian>()? as u64,
    ];

    // string lengths are clamped to what is left of the atom
    let mut remaining = payload_size - OHDR_FIXED_SIZE;
    let mut strings = Vec::with_capacity(3);
    for len in declared {
        let len = len.min(remaining);
        remaining -= len;
        let bytes = read_payload(src, hdr.typ, len)?;
        strings.push(String::from_utf8_lossy(&bytes).into_owned());
    }
    let textual_headers = strings.pop().unwrap_or_default();
    let rights_issuer_url = strings.pop().unwrap_or_default();
    let content_id = strings.pop().unwrap_or_default();

    let fields_size = payload_size - remaining;
    let children = ctx.read_children(hdr.typ, src, remaining)?;

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Container(Container {
            preamble: Preamble::ContentHeader(OhdrFields {
                encryption_method,
                padding_scheme,
                plaintext_length,
                content_id,
                rights_issuer_url,
                textual_headers,
                fields_size,
            }),
            children,
        }),
    })
}

impl AtomFields for OhdrFields {
    fn fields_size(&self) -> u64 {
        self.fields_size
    }

    fn write_fields(&self, typ: FourCC, _w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        Err(Error::Unsupported(typ))
    }

    fn writable(&self) -> bool {
        false
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        vec![
            ("encryption_method", self.encryption_method.to_string()),
            ("padding_scheme", self.padding_scheme.to_string()),
            ("plaintext_length", self.plaintext_length.to_string()),
            ("content_id", self.content_id.clone()),
            ("rights_issuer_url", self.rights_issuer_url.clone()),
            ("textual_headers", self.textual_headers.clone()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Access unit format (`odaf`): how samples of a protected track are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdafAtom {
    pub selective_encryption: bool,
    pub key_indicator_length: u8,
    pub iv_length: u8,
    payload_size: u64,
}

pub fn decode_odaf(hdr: &AtomHeader, src: &mut dyn ByteSource, _ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let payload_size = hdr.size as u64 - FULL_HEADER_SIZE;
    if payload_size < 3 {
        return Err(Error::Truncated(hdr.typ));
    }
    let s = src.read_u8()?;
    let key_indicator_length = src.read_u8()?;
    let iv_length = src.read_u8()?;

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Leaf(Leaf::SelectiveEncryption(OdafAtom {
            selective_encryption: s & 0x80 != 0,
            key_indicator_length,
            iv_length,
            payload_size,
        })),
    })
}

impl AtomFields for OdafAtom {
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
            ("selective_encryption", self.selective_encryption.to_string()),
            ("key_indicator_length", self.key_indicator_length.to_string()),
            ("iv_length", self.iv_length.to_string()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
