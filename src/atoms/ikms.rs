use crate::boxes::{Atom, AtomFields, AtomHeader, FULL_HEADER_SIZE, FourCC, FullHeader, Leaf, Node};
use crate::error::Result;
use crate::parser::{ByteSource, Context};
use crate::util::{nul_terminated, padded_width, read_full_header, read_payload, write_padded};
use std::any::Any;
use std::io::Write;

/// ISMA key management server reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IkmsAtom {
    pub kms_uri: String,
    field_size: u64,
}

impl IkmsAtom {
    pub fn new(kms_uri: &str) -> Self {
        Self {
            kms_uri: kms_uri.to_string(),
            field_size: kms_uri.len() as u64 + 1,
        }
    }

    pub fn into_atom(self) -> Result<Atom> {
        Atom::leaf(FourCC(*b"iKMS"), Some(FullHeader::default()), Leaf::KmsReference(self))
    }
}

pub fn decode_ikms(hdr: &AtomHeader, src: &mut dyn ByteSource, _ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let field_size = hdr.size as u64 - FULL_HEADER_SIZE;
    let buf = read_payload(src, hdr.typ, field_size)?;

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Leaf(Leaf::KmsReference(IkmsAtom {
            kms_uri: nul_terminated(&buf),
            field_size,
        })),
    })
}

impl AtomFields for IkmsAtom {
    fn fields_size(&self) -> u64 {
        padded_width(self.field_size, &self.kms_uri)
    }

    fn write_fields(&self, _typ: FourCC, w: &mut dyn Write, _src: &mut dyn ByteSource) -> Result<()> {
        write_padded(w, &self.kms_uri, self.fields_size())?;
        Ok(())
    }

    fn describe(&self, _src: &mut dyn ByteSource) -> Vec<(&'static str, String)> {
        vec![("kms_uri", self.kms_uri.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
