use crate::atoms::{
    decode_audio_entry, decode_container, decode_full_container, decode_generic_entry,
    decode_hdlr, decode_ikms, decode_odaf, decode_ohdr, decode_schm, decode_stsd, decode_tkhd,
    decode_video_entry,
};
use crate::boxes::{Atom, AtomHeader, FourCC};
use crate::error::Result;
use crate::known_boxes::KnownBox;
use crate::parser::{ByteSource, Context};
use std::collections::HashMap;

/// Decoder for one fixed atom type.
///
/// The source is positioned right after the 8-byte header. Decoders may stop
/// reading early; the factory moves the source to the end of the atom
/// afterwards.
pub trait AtomDecoder: Send + Sync {
    fn decode(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> anyhow::Result<Atom>;
}

impl<F> AtomDecoder for F
where
    F: Fn(&AtomHeader, &mut dyn ByteSource, Context<'_>) -> Result<Atom> + Send + Sync,
{
    fn decode(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> anyhow::Result<Atom> {
        Ok(self(hdr, src, ctx)?)
    }
}

/// Context-sensitive fallback consulted when the registry has no decoder.
///
/// Return `Ok(None)` to let the next handler try. `ctx.parent()` is the type
/// of the enclosing container, which is how the same code can mean different
/// things at different depths.
pub trait TypeHandler: Send + Sync {
    fn name(&self) -> &str {
        "handler"
    }

    fn create_atom(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> anyhow::Result<Option<Atom>>;
}

/// Registry of decoders keyed by atom type.
pub struct Registry {
    map: HashMap<FourCC, AtomDecoderEntry>,
}

struct AtomDecoderEntry {
    inner: Box<dyn AtomDecoder>,
    name: String,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Return a new registry with the given decoder added.
    ///
    /// `name` is human-readable and used only for debugging / logging.
    pub fn with_decoder(mut self, typ: FourCC, name: &str, dec: Box<dyn AtomDecoder>) -> Self {
        self.insert(typ, name, dec);
        self
    }

    pub fn insert(&mut self, typ: FourCC, name: &str, dec: Box<dyn AtomDecoder>) {
        self.map.insert(
            typ,
            AtomDecoderEntry {
                inner: dec,
                name: name.to_string(),
            },
        );
    }

    pub fn contains(&self, typ: FourCC) -> bool {
        self.map.contains_key(&typ)
    }

    pub fn decoder_name(&self, typ: FourCC) -> Option<&str> {
        self.map.get(&typ).map(|d| d.name.as_str())
    }

    /// Decode an atom with its registered decoder.
    ///
    /// Returns `None` if no decoder exists for the header's type.
    pub fn decode(
        &self,
        hdr: &AtomHeader,
        src: &mut dyn ByteSource,
        ctx: Context<'_>,
    ) -> Option<anyhow::Result<Atom>> {
        self.map
            .get(&hdr.typ)
            .map(|d| d.inner.decode(hdr, src, ctx))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------- Default registry ----------
pub fn default_registry() -> Registry {
    let mut reg = Registry::new()
        .with_decoder(KnownBox::Stsd.fourcc(), "stsd", Box::new(decode_stsd))
        .with_decoder(KnownBox::Schm.fourcc(), "schm", Box::new(decode_schm))
        .with_decoder(KnownBox::Ikms.fourcc(), "ikms", Box::new(decode_ikms))
        .with_decoder(KnownBox::Tkhd.fourcc(), "tkhd", Box::new(decode_tkhd))
        .with_decoder(KnownBox::Hdlr.fourcc(), "hdlr", Box::new(decode_hdlr))
        .with_decoder(KnownBox::Odaf.fourcc(), "odaf", Box::new(decode_odaf))
        .with_decoder(KnownBox::Ohdr.fourcc(), "ohdr", Box::new(decode_ohdr));

    // the rest is table driven: sample entries and plain/full containers
    for kb in KnownBox::ALL {
        let cc = kb.fourcc();
        if reg.contains(cc) {
            continue;
        }
        let name = cc.to_string();
        if kb.is_audio_entry() {
            reg.insert(cc, &name, Box::new(decode_audio_entry));
        } else if kb.is_video_entry() {
            reg.insert(cc, &name, Box::new(decode_video_entry));
        } else if kb.is_sample_entry() {
            reg.insert(cc, &name, Box::new(decode_generic_entry));
        } else if kb.is_container() && kb.is_full_box() {
            reg.insert(cc, &name, Box::new(decode_full_container));
        } else if kb.is_container() {
            reg.insert(cc, &name, Box::new(decode_container));
        }
    }
    reg
}
