use crate::boxes::{Atom, FourCC};
use crate::error::Result;
use crate::json_api::{JsonAtom, json_tree};
use crate::movie::Movie;
use crate::parser::{AtomFactory, ByteSource};
use crate::path::{self, AtomParent};
use std::io::{Read, Seek, SeekFrom, Write};

const MOOV: FourCC = FourCC(*b"moov");

/// Every top-level atom of a source, together with the source itself.
///
/// The source is kept because passthrough atoms and metadata values are
/// read back from it on demand, and writing needs it for the same reason.
pub struct AtomList<S> {
    source: S,
    atoms: Vec<Atom>,
}

impl<S: Read + Seek> AtomList<S> {
    /// Parse `source` from its start with the default factory.
    pub fn parse(source: S) -> Result<Self> {
        Self::parse_with(source, &AtomFactory::new())
    }

    pub fn parse_with(mut source: S, factory: &AtomFactory) -> Result<Self> {
        source.seek(SeekFrom::Start(0))?;
        let atoms = factory.parse_all(&mut source)?;
        Ok(AtomList { source, atoms })
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn child(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn child_by_type(&self, typ: FourCC, index: usize) -> Option<&Atom> {
        path::find_child(&self.atoms, typ, index)
    }

    pub fn find_atom(&self, path: &str) -> Option<&Atom> {
        path::find_atom(self, path)
    }

    /// The first top-level `moov`, if any.
    pub fn movie(&self) -> Option<Movie<'_>> {
        self.child_by_type(MOOV, 0).map(Movie::new)
    }

    /// Serialize every top-level atom in order. Fails before writing
    /// anything if one of them cannot be written.
    pub fn write(&mut self, w: &mut dyn Write) -> Result<()> {
        for atom in &self.atoms {
            atom.ensure_writable()?;
        }
        for atom in &self.atoms {
            atom.write(w, &mut self.source)?;
        }
        Ok(())
    }

    pub fn dump(&mut self) -> String {
        let mut out = String::new();
        for atom in &self.atoms {
            out.push_str(&atom.dump(&mut self.source));
        }
        out
    }

    /// JSON-ready snapshot of the tree; `decode` adds decoded fields.
    pub fn to_json(&mut self, decode: bool) -> Vec<JsonAtom> {
        json_tree(&self.atoms, 0, &mut self.source, decode)
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Borrow the atoms and the source at the same time, e.g. to load a
    /// metadata value found by path.
    pub fn split(&mut self) -> (&[Atom], &mut dyn ByteSource) {
        (&self.atoms, &mut self.source)
    }

    pub fn into_parts(self) -> (Vec<Atom>, S) {
        (self.atoms, self.source)
    }
}

impl<S> AtomParent for AtomList<S> {
    fn child_atoms(&self) -> &[Atom] {
        &self.atoms
    }
}

/// Parse `r` and return the tree as JSON-serializable nodes.
///
/// Reading starts at the current position of `r`.
pub fn get_atoms<R: Read + Seek>(r: &mut R, decode: bool) -> anyhow::Result<Vec<JsonAtom>> {
    let start = r.stream_position()?;
    let atoms = AtomFactory::new().parse_all(r)?;
    Ok(json_tree(&atoms, start, r, decode))
}
