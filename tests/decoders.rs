mod common;

use common::{atom, avc1, concat, ftyp, full_atom, hdlr, mp4a, stsd};
use mp4atom::atoms::SampleEntryKind;
use mp4atom::{Atom, AtomList, FourCC, Leaf, Preamble, TrackType};
use std::io::Cursor;

fn entry(atom: &Atom) -> &mp4atom::atoms::SampleEntry {
    match &atom.as_container().expect("sample entry").preamble {
        Preamble::SampleEntry(e) => e,
        other => panic!("unexpected preamble {:?}", other),
    }
}

#[test]
fn handler_name_length_is_clamped() -> anyhow::Result<()> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(b"soun");
    p.extend_from_slice(&[0u8; 12]);
    p.push(200); // claims far more than is there
    p.extend_from_slice(b"Sound");
    let list = AtomList::parse(Cursor::new(full_atom(b"hdlr", 0, 0, &p)))?;

    match list.atoms()[0].as_leaf() {
        Some(Leaf::HandlerReference(h)) => {
            assert_eq!(h.handler_type, FourCC(*b"soun"));
            assert_eq!(h.name, "Sound");
        }
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn handler_without_name_is_accepted() -> anyhow::Result<()> {
    let mut p = vec![0u8; 4];
    p.extend_from_slice(b"vide");
    p.extend_from_slice(&[0u8; 12]);
    let list = AtomList::parse(Cursor::new(full_atom(b"hdlr", 0, 0, &p)))?;

    match list.atoms()[0].as_leaf() {
        Some(Leaf::HandlerReference(h)) => assert_eq!(h.name, ""),
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn track_header_version_one_skips_wide_times() -> anyhow::Result<()> {
    let mut p = vec![0xEEu8; 32];
    p.extend_from_slice(&[0u8; 8]);
    p.extend_from_slice(&3u16.to_be_bytes()); // layer
    p.extend_from_slice(&1u16.to_be_bytes()); // alternate group
    p.extend_from_slice(&0u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 2 + 36]);
    p.extend_from_slice(&(640i32 << 16).to_be_bytes());
    p.extend_from_slice(&(480i32 << 16).to_be_bytes());
    let list = AtomList::parse(Cursor::new(full_atom(b"tkhd", 1, 3, &p)))?;

    let tkhd = &list.atoms()[0];
    assert_eq!(tkhd.version(), 1);
    match tkhd.as_leaf() {
        Some(Leaf::TrackHeader(t)) => {
            assert_eq!(t.track_id, 0);
            assert_eq!(t.layer, 3);
            assert_eq!(t.alternate_group, 1);
            assert_eq!(t.width >> 16, 640);
            assert_eq!(t.height >> 16, 480);
        }
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn short_track_header_is_kept_raw() -> anyhow::Result<()> {
    let input = full_atom(b"tkhd", 0, 0, &[0u8; 40]);
    let mut list = AtomList::parse(Cursor::new(input.clone()))?;

    let tkhd = &list.atoms()[0];
    assert_eq!(tkhd.typ, FourCC(*b"tkhd"));
    assert_eq!(tkhd.size, 52);
    assert!(matches!(tkhd.as_leaf(), Some(Leaf::Passthrough(_))));

    let mut out: Vec<u8> = Vec::new();
    list.write(&mut out)?;
    assert_eq!(out, input);
    Ok(())
}

#[test]
fn short_track_header_does_not_lose_the_rest_of_the_file() -> anyhow::Result<()> {
    let trak = atom(b"trak", &concat(&[
        full_atom(b"tkhd", 0, 0, &[0u8; 10]),
        atom(b"mdia", &hdlr(b"vide", "Video")),
    ]));
    let input = concat(&[ftyp(), atom(b"moov", &trak), atom(b"free", &[])]);
    let list = AtomList::parse(Cursor::new(input))?;

    let types: Vec<_> = list.atoms().iter().map(|a| a.typ).collect();
    assert_eq!(types, vec![FourCC(*b"ftyp"), FourCC(*b"moov"), FourCC(*b"free")]);
    assert!(matches!(
        list.find_atom("moov/trak/tkhd").and_then(Atom::as_leaf),
        Some(Leaf::Passthrough(_))
    ));

    let movie = list.movie().expect("moov");
    let track = &movie.tracks()[0];
    assert_eq!(track.track_type(), TrackType::Video);
    assert_eq!(track.id(), 0);
    Ok(())
}

#[test]
fn sample_entry_fields_are_decoded() -> anyhow::Result<()> {
    let input = stsd(&[mp4a(&atom(b"esds", &[0; 4])), avc1("x264", &[])]);
    let list = AtomList::parse(Cursor::new(input))?;
    let table = &list.atoms()[0];
    assert!(matches!(
        table.as_container().map(|c| &c.preamble),
        Some(Preamble::SampleDescription { entry_count: 2 })
    ));

    let audio = entry(&table.children()[0]);
    assert_eq!(audio.data_reference_index, 1);
    let a = audio.audio().expect("audio fields");
    assert_eq!(a.channel_count, 2);
    assert_eq!(a.sample_size, 16);
    assert_eq!(a.sample_rate_hz(), 44100);

    let video = entry(&table.children()[1]);
    match &video.kind {
        SampleEntryKind::Video(v) => {
            assert_eq!((v.width, v.height), (320, 240));
            assert_eq!(v.frame_count, 1);
            assert_eq!(v.depth, 0x18);
            assert_eq!(v.compressor_name, "x264");
        }
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn sample_entry_shorter_than_its_fields_is_kept_raw() -> anyhow::Result<()> {
    let input = stsd(&[atom(b"mp4a", &[0u8; 12]), avc1("x264", &[])]);
    let list = AtomList::parse(Cursor::new(input))?;

    let table = &list.atoms()[0];
    assert_eq!(table.children().len(), 2);
    assert!(matches!(table.children()[0].as_leaf(), Some(Leaf::Passthrough(_))));
    assert_eq!(entry(&table.children()[1]).video().map(|v| v.width), Some(320));
    Ok(())
}
