use crate::atoms::HdlrAtom;
use crate::boxes::{Atom, FourCC, Leaf};
use crate::path::find_atom;
use std::cell::OnceCell;
use std::fmt;

const TRAK: FourCC = FourCC(*b"trak");

/// What a track carries, from its handler type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    Video,
    Hint,
    Systems,
    Unknown,
}

impl TrackType {
    pub fn from_handler(handler_type: FourCC) -> Self {
        match &handler_type.0 {
            b"soun" => TrackType::Audio,
            b"vide" => TrackType::Video,
            b"hint" => TrackType::Hint,
            b"sdsm" | b"odsm" => TrackType::Systems,
            _ => TrackType::Unknown,
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrackType::Audio => "Audio",
            TrackType::Video => "Video",
            TrackType::Hint => "Hint",
            TrackType::Systems => "Systems",
            TrackType::Unknown => "Unknown",
        })
    }
}

/// View of one `trak` atom.
#[derive(Debug, Clone, Copy)]
pub struct Track<'a> {
    trak: &'a Atom,
    track_type: TrackType,
}

impl<'a> Track<'a> {
    pub fn new(trak: &'a Atom) -> Self {
        let track_type = Self::handler(trak)
            .map(|h| TrackType::from_handler(h.handler_type))
            .unwrap_or(TrackType::Unknown);
        Track { trak, track_type }
    }

    fn handler(trak: &'a Atom) -> Option<&'a HdlrAtom> {
        match find_atom(trak, "mdia/hdlr")?.as_leaf()? {
            Leaf::HandlerReference(h) => Some(h),
            _ => None,
        }
    }

    pub fn track_type(&self) -> TrackType {
        self.track_type
    }

    /// Track id from `tkhd`, or 0 when the track has no decodable header.
    pub fn id(&self) -> u32 {
        match self.trak.child(FourCC(*b"tkhd"), 0).and_then(Atom::as_leaf) {
            Some(Leaf::TrackHeader(tkhd)) => tkhd.track_id,
            _ => 0,
        }
    }

    pub fn handler_name(&self) -> Option<&'a str> {
        Self::handler(self.trak).map(|h| h.name.as_str())
    }

    pub fn trak(&self) -> &'a Atom {
        self.trak
    }
}

/// View of a `moov` atom and its tracks.
pub struct Movie<'a> {
    moov: &'a Atom,
    tracks: OnceCell<Vec<Track<'a>>>,
}

impl<'a> Movie<'a> {
    pub fn new(moov: &'a Atom) -> Self {
        Movie {
            moov,
            tracks: OnceCell::new(),
        }
    }

    /// Tracks in the order their `trak` atoms appear.
    pub fn tracks(&self) -> &[Track<'a>] {
        self.tracks.get_or_init(|| {
            self.moov
                .children()
                .iter()
                .filter(|a| a.typ == TRAK)
                .map(Track::new)
                .collect()
        })
    }

    pub fn track_ids(&self) -> Vec<u32> {
        self.tracks().iter().map(Track::id).collect()
    }

    pub fn track_by_id(&self, id: u32) -> Option<&Track<'a>> {
        self.tracks().iter().find(|t| t.id() == id)
    }

    pub fn track_index(&self, id: u32) -> Option<usize> {
        self.tracks().iter().position(|t| t.id() == id)
    }

    /// Resolve `path` relative to `moov`.
    pub fn find_atom(&self, path: &str) -> Option<&'a Atom> {
        find_atom(self.moov, path)
    }

    pub fn moov(&self) -> &'a Atom {
        self.moov
    }
}
