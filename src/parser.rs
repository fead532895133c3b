use crate::atoms::Passthrough;
use crate::boxes::{Atom, AtomHeader, FourCC, HEADER_SIZE, Leaf, Node};
use crate::error::{Error, Result};
use crate::metadata::MetaDataTypeHandler;
use crate::registry::{AtomDecoder, Registry, TypeHandler, default_registry};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Any seekable byte source a tree can be parsed from and later read back.
pub trait ByteSource: Read + Seek {}
impl<T: Read + Seek + ?Sized> ByteSource for T {}

/// Parse state threaded through the recursive descent.
///
/// `parent` is the type of the innermost container being parsed (`None` at
/// file level). Containers call [`Context::enter`] to hand their own type to
/// their children; the caller's value is untouched, so restoring it on the
/// way out is implicit.
#[derive(Clone, Copy)]
pub struct Context<'f> {
    factory: &'f AtomFactory,
    parent: Option<FourCC>,
}

impl<'f> Context<'f> {
    pub fn new(factory: &'f AtomFactory) -> Self {
        Context { factory, parent: None }
    }

    pub fn factory(&self) -> &'f AtomFactory {
        self.factory
    }

    pub fn parent(&self) -> Option<FourCC> {
        self.parent
    }

    /// Context for the children of an atom of type `typ`.
    pub fn enter(self, typ: FourCC) -> Self {
        Context { parent: Some(typ), ..self }
    }

    pub fn create_atom(
        self,
        src: &mut dyn ByteSource,
        bytes_available: &mut u64,
    ) -> Result<Option<Atom>> {
        self.factory.create_atom_in(src, bytes_available, self)
    }

    /// Parse the children of a `typ` container from the current position
    /// until `budget` bytes are used up or the next atom does not fit.
    pub fn read_children(
        self,
        typ: FourCC,
        src: &mut dyn ByteSource,
        budget: u64,
    ) -> Result<Vec<Atom>> {
        let inner = self.enter(typ);
        let mut remaining = budget;
        let mut children = Vec::new();
        while let Some(atom) = inner.create_atom(src, &mut remaining)? {
            children.push(atom);
        }
        Ok(children)
    }
}

/// Turns a byte stream into a typed atom tree.
///
/// Type codes are resolved first against the decoder [`Registry`], then
/// against the type handlers in registration order; whatever is left becomes
/// a [`Passthrough`] atom. So does an atom whose decoder reports
/// [`Error::Truncated`], so one short atom does not cost the rest of the tree.
pub struct AtomFactory {
    registry: Registry,
    handlers: Vec<Box<dyn TypeHandler>>,
}

impl AtomFactory {
    /// Factory with every built-in decoder and the metadata item handler.
    pub fn new() -> Self {
        Self::with_registry(default_registry()).with_handler(Box::new(MetaDataTypeHandler))
    }

    /// Factory with no decoders or handlers: every atom is a passthrough.
    pub fn empty() -> Self {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            handlers: Vec::new(),
        }
    }

    /// Return a factory with `dec` used for atoms of type `typ`, replacing
    /// any built-in decoder for that type.
    pub fn with_decoder(mut self, typ: FourCC, name: &str, dec: Box<dyn AtomDecoder>) -> Self {
        self.registry.insert(typ, name, dec);
        self
    }

    pub fn with_handler(mut self, handler: Box<dyn TypeHandler>) -> Self {
        self.register_type_handler(handler);
        self
    }

    /// Append a handler to the chain. Handlers are consulted in registration
    /// order and only for types the registry does not know.
    pub fn register_type_handler(&mut self, handler: Box<dyn TypeHandler>) {
        self.handlers.push(handler);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse one atom at file level, with everything from the current
    /// position to the end of `src` as the budget.
    pub fn create_atom<R: Read + Seek>(&self, src: &mut R) -> Result<Option<Atom>> {
        let pos = src.stream_position()?;
        let len = src.seek(SeekFrom::End(0))?;
        src.seek(SeekFrom::Start(pos))?;
        let mut available = len.saturating_sub(pos);
        self.create_atom_in(src, &mut available, Context::new(self))
    }

    /// Parse atoms from the current position to the end of `src`.
    pub fn parse_all<R: Read + Seek>(&self, src: &mut R) -> Result<Vec<Atom>> {
        let pos = src.stream_position()?;
        let len = src.seek(SeekFrom::End(0))?;
        src.seek(SeekFrom::Start(pos))?;
        let mut available = len.saturating_sub(pos);

        let ctx = Context::new(self);
        let mut atoms = Vec::new();
        while let Some(atom) = self.create_atom_in(src, &mut available, ctx)? {
            atoms.push(atom);
        }
        Ok(atoms)
    }

    /// Parse one atom out of a scope with `bytes_available` bytes left.
    ///
    /// Returns `Ok(None)` when the scope is exhausted or the next atom claims
    /// more than is left; in the latter case `src` is rewound to where the
    /// atom started. On success the source is left at the end of the atom and
    /// the budget is reduced by its declared size, whatever the decoder read.
    pub fn create_atom_in(
        &self,
        src: &mut dyn ByteSource,
        bytes_available: &mut u64,
        ctx: Context<'_>,
    ) -> Result<Option<Atom>> {
        if *bytes_available < HEADER_SIZE {
            return Ok(None);
        }

        let start = src.stream_position()?;
        let declared = src.read_u32::<BigEndian>()?;
        if declared > i32::MAX as u32 {
            return Err(Error::InvalidSize {
                offset: start,
                size: declared as u64,
            });
        }

        let size = if declared == 0 {
            // extends to the end of the stream
            let end = src.seek(SeekFrom::End(0))?;
            src.seek(SeekFrom::Start(start + 4))?;
            end.saturating_sub(start)
        } else {
            declared as u64
        };

        if size > *bytes_available {
            debug!(
                offset = start,
                size,
                available = *bytes_available,
                "atom does not fit its scope, stopping"
            );
            src.seek(SeekFrom::Start(start))?;
            return Ok(None);
        }
        if declared == 1 {
            return Err(Error::ExtendedSize { offset: start });
        }
        if size < HEADER_SIZE || size > i32::MAX as u64 {
            return Err(Error::InvalidSize { offset: start, size });
        }

        let mut typ = [0u8; 4];
        src.read_exact(&mut typ)?;
        let hdr = AtomHeader {
            typ: FourCC(typ),
            size: size as u32,
            start,
        };

        let atom = self.dispatch(&hdr, src, ctx)?;
        trace!(typ = %hdr.typ, offset = start, size, "atom");

        src.seek(SeekFrom::Start(start + size))?;
        *bytes_available -= size;
        Ok(Some(atom))
    }

    fn dispatch(&self, hdr: &AtomHeader, src: &mut dyn ByteSource, ctx: Context<'_>) -> Result<Atom> {
        if let Some(res) = self.registry.decode(hdr, src, ctx) {
            match res.map_err(Error::from) {
                Ok(atom) => return Ok(atom),
                // fixed fields run past the atom: keep it as raw bytes
                Err(Error::Truncated(typ)) => {
                    debug!(
                        typ = %typ,
                        offset = hdr.start,
                        size = hdr.size,
                        "fields truncated, keeping atom as raw bytes"
                    );
                    return Ok(Self::passthrough(hdr));
                }
                Err(err) => return Err(err),
            }
        }

        for handler in &self.handlers {
            src.seek(SeekFrom::Start(hdr.payload_offset()))?;
            if let Some(atom) = handler.create_atom(hdr, src, ctx)? {
                debug!(typ = %hdr.typ, handler = handler.name(), "claimed by type handler");
                return Ok(atom);
            }
        }

        Ok(Self::passthrough(hdr))
    }

    fn passthrough(hdr: &AtomHeader) -> Atom {
        Atom {
            typ: hdr.typ,
            size: hdr.size,
            full: None,
            node: Node::Leaf(Leaf::Passthrough(Passthrough::deferred(hdr))),
        }
    }
}

impl Default for AtomFactory {
    fn default() -> Self {
        Self::new()
    }
}
