use crate::atoms::{
    HdlrAtom, IkmsAtom, OdafAtom, OhdrFields, Passthrough, SampleEntry, SchmAtom, TkhdAtom,
};
use crate::error::{Error, Result};
use crate::metadata::{DataAtom, StringAtom};
use crate::parser::ByteSource;
use crate::path;
use crate::util::CountingWriter;
use byteorder::{BigEndian, WriteBytesExt};
use std::any::Any;
use std::fmt;
use std::io::Write;

/// Size of a plain atom header: 32-bit size + four-character type.
pub const HEADER_SIZE: u64 = 8;
/// Size of a full atom header: plain header + version (8 bits) + flags (24 bits).
pub const FULL_HEADER_SIZE: u64 = 12;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Build a code from a four-character name.
    ///
    /// Characters are taken as Latin-1 so iTunes-style names such as `©nam`
    /// map to their single-byte codes (`0xA9 'n' 'a' 'm'`).
    pub fn from_name(s: &str) -> Option<Self> {
        let mut out = [0u8; 4];
        let mut chars = s.chars();
        for slot in out.iter_mut() {
            let c = chars.next()? as u32;
            *slot = u8::try_from(c).ok()?;
        }
        if chars.next().is_some() {
            return None;
        }
        Some(FourCC(out))
    }

    pub const fn from_u32(v: u32) -> Self {
        FourCC(v.to_be_bytes())
    }

    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| match c {
                32..=126 => c as char,
                0xA9 => '\u{a9}',
                _ => '.',
            })
            .collect()
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }

impl serde::Serialize for FourCC {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

/// The part of an atom header the factory reads before dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomHeader {
    pub typ: FourCC,
    pub size: u32, // total size including header, already resolved when 0 on disk
    pub start: u64, // source offset of the size field
}

impl AtomHeader {
    pub fn payload_offset(&self) -> u64 {
        self.start + HEADER_SIZE
    }

    pub fn end(&self) -> u64 {
        self.start + self.size as u64
    }
}

/// Version and flags carried by full atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FullHeader {
    pub version: u8,
    pub flags: u32,
}

/// Behaviour shared by every leaf body and container preamble.
///
/// Extension handlers that want a typed leaf implement this and wrap their
/// value in [`Leaf::Custom`].
pub trait AtomFields: fmt::Debug + Send + Sync {
    /// Number of bytes `write_fields` emits.
    fn fields_size(&self) -> u64;

    /// Serialize the fields that follow the (full) header.
    fn write_fields(&self, typ: FourCC, w: &mut dyn Write, src: &mut dyn ByteSource)
    -> Result<()>;

    fn writable(&self) -> bool {
        true
    }

    /// Name/value pairs used by dumps. May re-read deferred payloads.
    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
pub enum Leaf {
    TrackHeader(TkhdAtom),
    HandlerReference(HdlrAtom),
    SchemeType(SchmAtom),
    KmsReference(IkmsAtom),
    SelectiveEncryption(OdafAtom),
    MetaValue(DataAtom),
    MetaString(StringAtom),
    Passthrough(Passthrough),
    Custom(Box<dyn AtomFields>),
}

impl Leaf {
    pub fn fields(&self) -> &dyn AtomFields {
        match self {
            Leaf::TrackHeader(a) => a,
            Leaf::HandlerReference(a) => a,
            Leaf::SchemeType(a) => a,
            Leaf::KmsReference(a) => a,
            Leaf::SelectiveEncryption(a) => a,
            Leaf::MetaValue(a) => a,
            Leaf::MetaString(a) => a,
            Leaf::Passthrough(a) => a,
            Leaf::Custom(a) => a.as_ref(),
        }
    }
}

/// Fields a container carries between its header and its first child.
#[derive(Debug)]
pub enum Preamble {
    None,
    /// Sample description table. The count written back is always the
    /// number of entries actually held.
    SampleDescription { entry_count: u32 },
    SampleEntry(SampleEntry),
    ContentHeader(OhdrFields),
}

impl Preamble {
    pub fn size(&self) -> u64 {
        match self {
            Preamble::None => 0,
            Preamble::SampleDescription { .. } => 4,
            Preamble::SampleEntry(e) => e.fields_size(),
            Preamble::ContentHeader(h) => h.fields_size(),
        }
    }

    pub fn describe(&self, src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        match self {
            Preamble::None => Vec::new(),
            Preamble::SampleDescription { entry_count } => {
                vec![("entry_count", entry_count.to_string())]
            }
            Preamble::SampleEntry(e) => e.describe(src),
            Preamble::ContentHeader(h) => h.describe(src),
        }
    }

    fn writable(&self) -> bool {
        match self {
            Preamble::None | Preamble::SampleDescription { .. } => true,
            Preamble::SampleEntry(e) => e.writable(),
            Preamble::ContentHeader(h) => h.writable(),
        }
    }

    fn write(
        &self,
        typ: FourCC,
        children: usize,
        w: &mut dyn Write,
        src: &mut dyn ByteSource,
    ) -> Result<()> {
        match self {
            Preamble::None => Ok(()),
            Preamble::SampleDescription { .. } => {
                let count = u32::try_from(children).map_err(|_| Error::InvalidSize {
                    offset: 0,
                    size: children as u64,
                })?;
                w.write_u32::<BigEndian>(count)?;
                Ok(())
            }
            Preamble::SampleEntry(e) => e.write_fields(typ, w, src),
            Preamble::ContentHeader(h) => h.write_fields(typ, w, src),
        }
    }
}

#[derive(Debug)]
pub struct Container {
    pub preamble: Preamble,
    pub children: Vec<Atom>,
}

#[derive(Debug)]
pub enum Node {
    Leaf(Leaf),
    Container(Container),
}

impl Node {
    fn encoded_size(&self) -> u64 {
        match self {
            Node::Leaf(leaf) => leaf.fields().fields_size(),
            Node::Container(c) => {
                c.preamble.size() + c.children.iter().map(|a| a.size as u64).sum::<u64>()
            }
        }
    }
}

/// One box of the tree.
#[derive(Debug)]
pub struct Atom {
    pub typ: FourCC,
    pub size: u32,
    pub full: Option<FullHeader>,
    pub node: Node,
}

impl Atom {
    /// Build an atom from in-memory parts, computing `size` from the node.
    pub fn new(typ: FourCC, full: Option<FullHeader>, node: Node) -> Result<Atom> {
        let header = if full.is_some() { FULL_HEADER_SIZE } else { HEADER_SIZE };
        let total = header + node.encoded_size();
        let size = u32::try_from(total)
            .ok()
            .filter(|s| *s <= i32::MAX as u32)
            .ok_or(Error::InvalidSize { offset: 0, size: total })?;
        Ok(Atom { typ, size, full, node })
    }

    pub fn container(typ: FourCC, children: Vec<Atom>) -> Result<Atom> {
        let node = Node::Container(Container { preamble: Preamble::None, children });
        Atom::new(typ, None, node)
    }

    pub fn full_container(typ: FourCC, full: FullHeader, children: Vec<Atom>) -> Result<Atom> {
        let node = Node::Container(Container { preamble: Preamble::None, children });
        Atom::new(typ, Some(full), node)
    }

    pub fn leaf(typ: FourCC, full: Option<FullHeader>, leaf: Leaf) -> Result<Atom> {
        Atom::new(typ, full, Node::Leaf(leaf))
    }

    pub fn is_full(&self) -> bool {
        self.full.is_some()
    }

    pub fn version(&self) -> u8 {
        self.full.map(|f| f.version).unwrap_or(0)
    }

    pub fn flags(&self) -> u32 {
        self.full.map(|f| f.flags).unwrap_or(0)
    }

    pub fn header_size(&self) -> u64 {
        if self.is_full() { FULL_HEADER_SIZE } else { HEADER_SIZE }
    }

    pub fn payload_size(&self) -> u64 {
        (self.size as u64).saturating_sub(self.header_size())
    }

    pub fn is_container(&self) -> bool {
        matches!(self.node, Node::Container(_))
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.node {
            Node::Container(c) => Some(c),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.node {
            Node::Leaf(l) => Some(l),
            Node::Container(_) => None,
        }
    }

    /// Children in source order; empty for leaves.
    pub fn children(&self) -> &[Atom] {
        match &self.node {
            Node::Container(c) => &c.children,
            Node::Leaf(_) => &[],
        }
    }

    /// `index`-th child (0-based) of type `typ`.
    pub fn child(&self, typ: FourCC, index: usize) -> Option<&Atom> {
        path::find_child(self.children(), typ, index)
    }

    /// Resolve a slash-separated path such as `mdia/minf/stbl/stsd` below this atom.
    pub fn find(&self, path: &str) -> Option<&Atom> {
        path::find_atom(self, path)
    }

    /// Fail with [`Error::Unsupported`] if any atom in this subtree cannot be
    /// written, or with [`Error::SizeMismatch`] if its fields and children no
    /// longer add up to the declared size.
    pub fn ensure_writable(&self) -> Result<()> {
        let encoded = self.header_size() + self.node.encoded_size();
        if encoded != self.size as u64 {
            return Err(Error::SizeMismatch {
                typ: self.typ,
                declared: self.size as u64,
                written: encoded,
            });
        }
        match &self.node {
            Node::Leaf(leaf) => {
                if !leaf.fields().writable() {
                    return Err(Error::Unsupported(self.typ));
                }
            }
            Node::Container(c) => {
                if !c.preamble.writable() {
                    return Err(Error::Unsupported(self.typ));
                }
                for child in &c.children {
                    child.ensure_writable()?;
                }
            }
        }
        Ok(())
    }

    /// Serialize header, fields and children.
    ///
    /// `src` is the source the tree was parsed from; passthrough atoms and
    /// metadata values copy their payload out of it. Nothing is written if
    /// the subtree contains a read-only kind or an atom whose size is stale.
    pub fn write(&self, w: &mut dyn Write, src: &mut dyn ByteSource) -> Result<()> {
        self.ensure_writable()?;
        self.write_unchecked(w, src)
    }

    fn write_unchecked(&self, w: &mut dyn Write, src: &mut dyn ByteSource) -> Result<()> {
        let mut out = CountingWriter::new(w);
        out.write_u32::<BigEndian>(self.size)?;
        out.write_all(&self.typ.0)?;
        if let Some(full) = self.full {
            out.write_u8(full.version)?;
            out.write_u24::<BigEndian>(full.flags & 0x00FF_FFFF)?;
        }

        match &self.node {
            Node::Leaf(leaf) => leaf.fields().write_fields(self.typ, &mut out, src)?,
            Node::Container(c) => {
                c.preamble.write(self.typ, c.children.len(), &mut out, src)?;
                for child in &c.children {
                    child.write_unchecked(&mut out, src)?;
                }
            }
        }

        if out.count() != self.size as u64 {
            return Err(Error::SizeMismatch {
                typ: self.typ,
                declared: self.size as u64,
                written: out.count(),
            });
        }
        Ok(())
    }

    /// Indented, human-readable listing of this subtree.
    pub fn dump(&self, src: &mut dyn ByteSource) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, "", src);
        out
    }

    fn dump_into(&self, out: &mut String, indent: &str, src: &mut dyn ByteSource) {
        out.push_str(&format!(
            "{}[{}] size={}+{}",
            indent,
            self.typ,
            self.header_size(),
            self.payload_size()
        ));
        if let Some(full) = self.full {
            out.push_str(&format!(", version={}, flags={:x}", full.version, full.flags));
        }
        out.push('\n');

        let fields = match &self.node {
            Node::Leaf(leaf) => leaf.fields().describe(src),
            Node::Container(c) => c.preamble.describe(src),
        };
        for (name, value) in fields {
            out.push_str(&format!("{}  {:<21} = {}\n", indent, name, value));
        }

        let child_indent = format!("{}  ", indent);
        for child in self.children() {
            child.dump_into(out, &child_indent, src);
        }
    }
}
