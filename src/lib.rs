//! Reading, inspecting and rewriting MP4 atom trees.
//!
//! ```no_run
//! use mp4atom::AtomList;
//! use std::fs::File;
//!
//! let list = AtomList::parse(File::open("video.mp4")?)?;
//! if let Some(movie) = list.movie() {
//!     for track in movie.tracks() {
//!         println!("track {} is {}", track.id(), track.track_type());
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod atoms;
pub mod boxes;
pub mod error;
pub mod json_api;
pub mod known_boxes;
pub mod metadata;
pub mod movie;
pub mod parser;
pub mod path;
pub mod registry;
pub mod util;

pub use api::{AtomList, get_atoms};
pub use boxes::{Atom, AtomFields, AtomHeader, Container, FourCC, FullHeader, Leaf, Node, Preamble};
pub use error::{Error, Result};
pub use json_api::{JsonAtom, analyze_file};
pub use movie::{Movie, Track, TrackType};
pub use parser::{AtomFactory, ByteSource, Context};
pub use path::{AtomParent, find_atom};
pub use registry::{AtomDecoder, Registry, TypeHandler};
