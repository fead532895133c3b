//! Decoders for the atom kinds the default factory understands.

mod hdlr;
mod ikms;
mod odrm;
mod passthrough;
mod schm;
mod stsd;
mod tkhd;

pub use hdlr::{HdlrAtom, decode_hdlr};
pub use ikms::{IkmsAtom, decode_ikms};
pub use odrm::{EncryptionMethod, OdafAtom, OhdrFields, PaddingScheme, decode_odaf, decode_ohdr};
pub use passthrough::{Passthrough, Payload};
pub use schm::{SchmAtom, decode_schm};
pub use stsd::{
    AudioFields, SampleEntry, SampleEntryKind, VideoFields, decode_audio_entry, decode_generic_entry,
    decode_stsd, decode_video_entry,
};
pub use tkhd::{TkhdAtom, decode_tkhd};

use crate::boxes::{Atom, AtomHeader, Container, FULL_HEADER_SIZE, HEADER_SIZE, Node, Preamble};
use crate::error::Result;
use crate::parser::{ByteSource, Context};
use crate::util::read_full_header;

/// Plain container: children fill the whole payload.
pub fn decode_container(hdr: &AtomHeader, src: &mut dyn ByteSource, ctx: Context<'_>) -> Result<Atom> {
    let children = ctx.read_children(hdr.typ, src, hdr.size as u64 - HEADER_SIZE)?;
    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: None,
        node: Node::Container(Container {
            preamble: Preamble::None,
            children,
        }),
    })
}

/// Container with version and flags ahead of its children (`meta`, `odkm`).
pub fn decode_full_container(
    hdr: &AtomHeader,
    src: &mut dyn ByteSource,
    ctx: Context<'_>,
) -> Result<Atom> {
    let full = read_full_header(hdr, src)?;
    let children = ctx.read_children(hdr.typ, src, hdr.size as u64 - FULL_HEADER_SIZE)?;
    Ok(Atom {
        typ: hdr.typ,
        size: hdr.size,
        full: Some(full),
        node: Node::Container(Container {
            preamble: Preamble::None,
            children,
        }),
    })
}
