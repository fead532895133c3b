//! Slash-separated atom paths such as `moov/trak[1]/mdia/hdlr`.

use crate::boxes::{Atom, FourCC};

/// Anything that holds an ordered list of atoms.
pub trait AtomParent {
    fn child_atoms(&self) -> &[Atom];
}

impl AtomParent for Atom {
    fn child_atoms(&self) -> &[Atom] {
        self.children()
    }
}

impl AtomParent for [Atom] {
    fn child_atoms(&self) -> &[Atom] {
        self
    }
}

impl AtomParent for Vec<Atom> {
    fn child_atoms(&self) -> &[Atom] {
        self
    }
}

/// `index`-th atom (0-based) of type `typ` in `atoms`.
pub fn find_child(atoms: &[Atom], typ: FourCC, index: usize) -> Option<&Atom> {
    atoms.iter().filter(|a| a.typ == typ).nth(index)
}

/// Parse one path segment: `name` or `name[index]`.
fn parse_segment(segment: &str) -> Option<(FourCC, usize)> {
    let chars: Vec<char> = segment.chars().collect();
    if chars.len() == 4 {
        return Some((FourCC::from_name(segment)?, 0));
    }
    if chars.len() < 7 || chars[4] != '[' || chars[chars.len() - 1] != ']' {
        return None;
    }
    let name: String = chars[..4].iter().collect();
    let index: String = chars[5..chars.len() - 1].iter().collect();
    Some((FourCC::from_name(&name)?, index.parse().ok()?))
}

/// Resolve `path` below `parent`.
///
/// Each segment picks a child by type and optional 0-based index. Returns
/// `None` for a malformed segment, a missing child, or a path that continues
/// below a leaf.
pub fn find_atom<'a, P: AtomParent + ?Sized>(parent: &'a P, path: &str) -> Option<&'a Atom> {
    let mut children = parent.child_atoms();
    let mut rest = Some(path);
    let mut found = None;

    while let Some(p) = rest {
        let (segment, tail) = match p.find('/') {
            Some(i) if i > 0 => (&p[..i], Some(&p[i + 1..])),
            _ => (p, None),
        };
        rest = tail;

        let (typ, index) = parse_segment(segment)?;
        let atom = find_child(children, typ, index)?;
        if rest.is_some() && !atom.is_container() {
            return None;
        }
        children = atom.children();
        found = Some(atom);
    }
    found
}
