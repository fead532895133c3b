use crate::boxes::{Atom, AtomFields, AtomHeader, FULL_HEADER_SIZE, FourCC, Leaf, Node};
use crate::error::{Error, Result};
use crate::parser::{ByteSource, Context};
use crate::util::{nul_terminated, read_full_header, read_payload};
use std::any::Any;
use std::io::Write;

// pre_defined(4) + handler_type(4) + reserved(12)
const FIXED_SIZE: u64 = 20;

/// Handler reference: the four-character handler type plus a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdlrAtom {
    pub handler_type: FourCC,
    pub name: String,
    payload_size: u64,
}

pub fn decode_hdlr(hdr: &AtomHeader, src: &mut dyn ByteSource, _ctx: Context<'_>) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let payload_size = hdr.size as u64 - FULL_HEADER_SIZE;
    if payload_size < FIXED_SIZE {
        return Err(Error::Truncated(hdr.typ));
    }
    let buf = read_payload(src, hdr.typ, payload_size)?;

    let handler_type = FourCC([buf[4], buf[5], buf[6], buf[7]]);

    // length-prefixed name; the length is not trusted past the end of the atom
    let name = match buf.get(FIXED_SIZE as usize) {
        Some(&declared) => {
            let start = FIXED_SIZE as usize + 1;
            let len = (declared as usize).min(buf.len() - start);
            nul_terminated(&buf[start..start + len])
        }
        None => String::new(),
    };

    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Leaf(Leaf::HandlerReference(HdlrAtom {
            handler_type,
            name,
            payload_size,
        })),
    })
}

impl AtomFields for HdlrAtom {
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
            ("handler_type", self.handler_type.to_string()),
            ("handler_name", self.name.clone()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
