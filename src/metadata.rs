//! iTunes-style metadata items (`moov/udta/meta/ilst`).
//!
//! Item atoms reuse short codes such as `data` and `name` whose meaning
//! depends on where they sit, so they are decoded by [`MetaDataTypeHandler`]
//! from the parse context rather than by the type registry.

use crate::atoms::Payload;
use crate::boxes::{
    Atom, AtomFields, AtomHeader, Container, FourCC, HEADER_SIZE, Leaf, Node, Preamble,
};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::registry::TypeHandler;
use crate::util::read_payload;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::io::{Cursor, Write};

pub const ILST: FourCC = FourCC(*b"ilst");
pub const DATA: FourCC = FourCC(*b"data");
pub const MEAN: FourCC = FourCC(*b"mean");
pub const NAME: FourCC = FourCC(*b"name");
/// Free-form item, keyed by its `mean` and `name` children.
pub const FREE_FORM: FourCC = FourCC(*b"----");

/// Item codes recognized directly under `ilst`.
pub const ITEM_TYPES: [FourCC; 19] = [
    FREE_FORM,
    FourCC(*b"\xa9nam"), // title
    FourCC(*b"\xa9ART"), // artist
    FourCC(*b"\xa9com"), // composer
    FourCC(*b"\xa9wrt"), // writer
    FourCC(*b"\xa9alb"), // album
    FourCC(*b"\xa9gen"), // genre
    FourCC(*b"\xa9grp"), // grouping
    FourCC(*b"\xa9day"), // date
    FourCC(*b"\xa9too"), // encoding tool
    FourCC(*b"\xa9cmt"), // comment
    FourCC(*b"\xa9lyr"), // lyrics
    FourCC(*b"cprt"),
    FourCC(*b"trkn"),
    FourCC(*b"disk"),
    FourCC(*b"covr"),
    FourCC(*b"desc"),
    FourCC(*b"gnre"), // ID3v1 genre index + 1
    FourCC(*b"cpil"),
];

pub fn is_item_type(typ: FourCC) -> bool {
    ITEM_TYPES.contains(&typ)
}

/// Well-known values of a `data` atom's type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Binary,
    Utf8,
    Utf16,
    MacEncoded,
    Jpeg,
    SignedIntBe,
    Float32Be,
    Float64Be,
    Other(u32),
}

impl From<u32> for DataType {
    fn from(v: u32) -> Self {
        match v {
            0 => DataType::Binary,
            1 => DataType::Utf8,
            2 => DataType::Utf16,
            3 => DataType::MacEncoded,
            14 => DataType::Jpeg,
            21 => DataType::SignedIntBe,
            22 => DataType::Float32Be,
            23 => DataType::Float64Be,
            other => DataType::Other(other),
        }
    }
}

impl From<DataType> for u32 {
    fn from(t: DataType) -> u32 {
        match t {
            DataType::Binary => 0,
            DataType::Utf8 => 1,
            DataType::Utf16 => 2,
            DataType::MacEncoded => 3,
            DataType::Jpeg => 14,
            DataType::SignedIntBe => 21,
            DataType::Float32Be => 22,
            DataType::Float64Be => 23,
            DataType::Other(v) => v,
        }
    }
}

/// A metadata value resolved according to its declared data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    Integer(i64),
    Binary(Vec<u8>),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Text(s) => f.write_str(s),
            MetaValue::Integer(i) => write!(f, "{}", i),
            MetaValue::Binary(b) => write!(f, "{} bytes", b.len()),
        }
    }
}

/// Value holder (`data`) inside a metadata item.
///
/// Only the type and locale are read while parsing; the value stays in the
/// source until one of the `load_*` methods asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAtom {
    pub data_type: u32,
    pub locale: u32,
    value: Payload,
}

impl DataAtom {
    pub fn new(data_type: DataType, bytes: Vec<u8>) -> Self {
        Self {
            data_type: data_type.into(),
            locale: 0,
            value: Payload::Owned(bytes),
        }
    }

    pub fn text(s: &str) -> Self {
        Self::new(DataType::Utf8, s.as_bytes().to_vec())
    }

    /// Signed big-endian integer stored in the narrowest of 1, 2, 4 or 8 bytes.
    pub fn integer(v: i64) -> Self {
        let bytes = if let Ok(b) = i8::try_from(v) {
            b.to_be_bytes().to_vec()
        } else if let Ok(s) = i16::try_from(v) {
            s.to_be_bytes().to_vec()
        } else if let Ok(i) = i32::try_from(v) {
            i.to_be_bytes().to_vec()
        } else {
            v.to_be_bytes().to_vec()
        };
        Self::new(DataType::SignedIntBe, bytes)
    }

    pub fn kind(&self) -> DataType {
        DataType::from(self.data_type)
    }

    pub fn value_size(&self) -> u64 {
        self.value.len()
    }

    pub fn load_bytes(&self, src: &mut dyn ByteSource) -> Result<Vec<u8>> {
        Ok(self.value.load(src)?)
    }

    pub fn load_string(&self, src: &mut dyn ByteSource) -> Result<String> {
        let bytes = self.load_bytes(src)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn load_integer(&self, src: &mut dyn ByteSource) -> Result<i64> {
        let bytes = self.load_bytes(src)?;
        let mut cur = Cursor::new(&bytes);
        let v = match bytes.len() {
            1 => cur.read_i8()? as i64,
            2 => cur.read_i16::<BigEndian>()? as i64,
            4 => cur.read_i32::<BigEndian>()? as i64,
            8 => cur.read_i64::<BigEndian>()?,
            n => return Err(Error::InvalidIntegerSize(n as u64)),
        };
        Ok(v)
    }

    pub fn value(&self, src: &mut dyn ByteSource) -> Result<MetaValue> {
        match self.kind() {
            DataType::Utf8 => Ok(MetaValue::Text(self.load_string(src)?)),
            DataType::SignedIntBe => Ok(MetaValue::Integer(self.load_integer(src)?)),
            _ => Ok(MetaValue::Binary(self.load_bytes(src)?)),
        }
    }

    pub fn into_atom(self) -> Result<Atom> {
        Atom::leaf(DATA, None, Leaf::MetaValue(self))
    }
}

impl AtomFields for DataAtom {
    fn fields_size(&self) -> u64 {
        8 + self.value.len()
    }

    fn write_fields(&self, typ: FourCC, w: &mut dyn Write, src: &mut dyn ByteSource) -> Result<()> {
        w.write_u32::<BigEndian>(self.data_type)?;
        w.write_u32::<BigEndian>(self.locale)?;
        self.value.copy_to(typ, w, src)
    }

    fn describe(&self, src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        let data = match self.kind() {
            DataType::Utf8 | DataType::SignedIntBe => {
                self.value(src).map(|v| v.to_string()).unwrap_or_default()
            }
            _ => format!("{} bytes", self.value.len()),
        };
        vec![
            ("data_type", self.data_type.to_string()),
            ("data_lang", self.locale.to_string()),
            ("data", data),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// `mean` or `name` inside a free-form item: a reserved word then UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringAtom {
    pub reserved: u32,
    raw: Vec<u8>,
}

impl StringAtom {
    pub fn new(value: &str) -> Self {
        Self {
            reserved: 0,
            raw: value.as_bytes().to_vec(),
        }
    }

    pub fn value(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    pub fn into_atom(self, typ: FourCC) -> Result<Atom> {
        Atom::leaf(typ, None, Leaf::MetaString(self))
    }
}

impl AtomFields for StringAtom {
    fn fields_size(&self) -> u64 {
        4 + self.raw.len() as u64
    }

    fn write_fields(&self, _typ: FourCC, w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        w.write_u32::<BigEndian>(self.reserved)?;
        w.write_all(&self.raw)?;
        Ok(())
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        vec![("string", self.value().into_owned())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wrap `children` (usually one `data` atom) into an item atom of type `code`.
pub fn item(code: FourCC, children: Vec<Atom>) -> Result<Atom> {
    Atom::container(code, children)
}

/// Claims item atoms under `ilst`, `data` under an item, and `mean`/`name`
/// under a free-form item. Everything else is left to the next handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetaDataTypeHandler;

impl MetaDataTypeHandler {
    fn decode(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> Result<Option<Atom>> {
        let payload_size = hdr.size as u64 - HEADER_SIZE;
        let parent = ctx.parent();

        if parent == Some(ILST) {
            if !is_item_type(hdr.typ) {
                return Ok(None);
            }
            let children = ctx.read_children(hdr.typ, src, payload_size)?;
            return Ok(Some(Atom {
                typ: hdr.typ,
                size: hdr.size,
                full: None,
                node: Node::Container(Container {
                    preamble: Preamble::None,
                    children,
                }),
            }));
        }

        if hdr.typ == DATA {
            if !parent.is_some_and(is_item_type) || payload_size < 8 {
                return Ok(None);
            }
            let data_type = src.read_u32::<BigEndian>()?;
            let locale = src.read_u32::<BigEndian>()?;
            let value = Payload::Deferred {
                offset: hdr.payload_offset() + 8,
                len: payload_size - 8,
            };
            return Ok(Some(Atom {
                typ: hdr.typ,
                size: hdr.size,
                full: None,
                node: Node::Leaf(Leaf::MetaValue(DataAtom {
                    data_type,
                    locale,
                    value,
                })),
            }));
        }

        if parent == Some(FREE_FORM) && (hdr.typ == MEAN || hdr.typ == NAME) {
            if payload_size < 4 {
                return Ok(None);
            }
            let reserved = src.read_u32::<BigEndian>()?;
            let raw = read_payload(src, hdr.typ, payload_size - 4)?;
            return Ok(Some(Atom {
                typ: hdr.typ,
                size: hdr.size,
                full: None,
                node: Node::Leaf(Leaf::MetaString(StringAtom { reserved, raw })),
            }));
        }

        Ok(None)
    }
}

impl TypeHandler for MetaDataTypeHandler {
    fn name(&self) -> &str {
        "metadata"
    }

    fn create_atom(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> anyhow::Result<Option<Atom>> {
        Ok(self.decode(hdr, src, ctx)?)
    }
}
