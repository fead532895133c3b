use crate::api::AtomList;
use crate::boxes::{Atom, Leaf, Node};
use crate::known_boxes::KnownBox;
use crate::metadata::DataType;
use crate::parser::ByteSource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Longest binary metadata value rendered as hex.
const HEX_VALUE_LIMIT: u64 = 64;

/// A JSON-serializable representation of a single atom.
///
/// Intended for UIs and for machine-readable dumps.
#[derive(Serialize, Debug, Clone)]
pub struct JsonAtom {
    /// Absolute byte offset of the atom in the source.
    ///
    /// Derived from declared sizes: a container's children are taken to
    /// follow its header and fixed fields back to back. Every built-in
    /// decoder reads children that way and stops at the first one that does
    /// not fit, so dropped atoms only ever trail the last reported child. A
    /// custom decoder that skips bytes between children gets shifted offsets.
    pub offset: u64,
    pub size: u64,
    pub header_size: u64,
    pub payload_size: u64,

    pub typ: String,
    pub version: Option<u8>,
    pub flags: Option<u32>,
    /// "container", "full", "leaf" or "unknown" (kept as raw bytes)
    pub kind: String,
    pub full_name: String,
    /// Decoded fields, only when decoding was requested
    pub fields: Option<BTreeMap<String, String>>,
    pub children: Option<Vec<JsonAtom>>,
}

/// Parse the file at `path` and return its atom tree.
pub fn analyze_file(path: impl AsRef<Path>, decode: bool) -> anyhow::Result<Vec<JsonAtom>> {
    let f = File::open(path)?;
    let mut list = AtomList::parse(f)?;
    Ok(list.to_json(decode))
}

/// Convert parsed atoms laid out back to back from `base` into JSON nodes.
pub fn json_tree(atoms: &[Atom], base: u64, src: &mut dyn ByteSource, decode: bool) -> Vec<JsonAtom> {
    let mut offset = base;
    let mut out = Vec::with_capacity(atoms.len());
    for atom in atoms {
        out.push(build_atom(atom, offset, src, decode));
        offset += atom.size as u64;
    }
    out
}

fn build_atom(atom: &Atom, offset: u64, src: &mut dyn ByteSource, decode: bool) -> JsonAtom {
    let (kind, children) = match &atom.node {
        Node::Container(c) => {
            let first_child = offset + atom.header_size() + c.preamble.size();
            let kids = json_tree(&c.children, first_child, src, decode);
            ("container", Some(kids))
        }
        Node::Leaf(Leaf::Passthrough(_)) => ("unknown", None),
        Node::Leaf(_) if atom.is_full() => ("full", None),
        Node::Leaf(_) => ("leaf", None),
    };

    let fields = decode.then(|| decoded_fields(atom, src));

    JsonAtom {
        offset,
        size: atom.size as u64,
        header_size: atom.header_size(),
        payload_size: atom.payload_size(),
        typ: atom.typ.to_string(),
        version: atom.full.map(|f| f.version),
        flags: atom.full.map(|f| f.flags),
        kind: kind.to_string(),
        full_name: KnownBox::from(atom.typ).full_name().to_string(),
        fields,
        children,
    }
}

fn decoded_fields(atom: &Atom, src: &mut dyn ByteSource) -> BTreeMap<String, String> {
    let pairs = match &atom.node {
        Node::Leaf(leaf) => leaf.fields().describe(src),
        Node::Container(c) => c.preamble.describe(src),
    };
    let mut map: BTreeMap<String, String> =
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();

    if let Node::Leaf(Leaf::MetaValue(data)) = &atom.node {
        let opaque = !matches!(data.kind(), DataType::Utf8 | DataType::SignedIntBe);
        if opaque && data.value_size() <= HEX_VALUE_LIMIT {
            if let Ok(bytes) = data.load_bytes(src) {
                map.insert("value_hex".to_string(), hex::encode(bytes));
            }
        }
    }
    map
}
