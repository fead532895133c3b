mod common;

use common::{atom, avc1, concat, ftyp, full_atom, hdlr, stsd, trak};
use mp4atom::known_boxes::KnownBox;
use mp4atom::registry::default_registry;
use mp4atom::{AtomList, FourCC, get_atoms};
use serde_json::Value;
use std::io::{Cursor, Seek, SeekFrom};

fn small_movie() -> Vec<u8> {
    concat(&[ftyp(), atom(b"moov", &trak(1, Some(b"soun")))])
}

#[test]
fn json_tree_has_offsets_and_kinds() -> anyhow::Result<()> {
    let mut cur = Cursor::new(small_movie());
    let atoms = get_atoms(&mut cur, false)?;
    let v: Value = serde_json::to_value(&atoms)?;

    assert_eq!(v[0]["typ"], "ftyp");
    assert_eq!(v[0]["kind"], "unknown");
    assert_eq!(v[0]["offset"], 0);
    assert!(v[0]["fields"].is_null());

    let moov = &v[1];
    assert_eq!(moov["typ"], "moov");
    assert_eq!(moov["offset"], 20);
    assert_eq!(moov["kind"], "container");
    assert_eq!(moov["full_name"], "Movie Box");

    let trak = &moov["children"][0];
    assert_eq!(trak["offset"], 28);
    let tkhd = &trak["children"][0];
    assert_eq!(tkhd["offset"], 36);
    assert_eq!(tkhd["kind"], "full");
    assert_eq!(tkhd["version"], 0);
    assert_eq!(tkhd["flags"], 7);
    assert_eq!(tkhd["header_size"], 12);
    assert_eq!(tkhd["payload_size"], 80);

    let mdia = &trak["children"][1];
    assert_eq!(mdia["offset"], 36 + 92);
    Ok(())
}

#[test]
fn decoded_json_carries_fields() -> anyhow::Result<()> {
    let mut list = AtomList::parse(Cursor::new(small_movie()))?;
    let v = serde_json::to_value(list.to_json(true))?;

    let tkhd = &v[1]["children"][0]["children"][0];
    assert_eq!(tkhd["fields"]["track_id"], "1");
    assert_eq!(tkhd["fields"]["duration"], "1000");

    let hdlr = &v[1]["children"][0]["children"][1]["children"][0];
    assert_eq!(hdlr["typ"], "hdlr");
    assert_eq!(hdlr["fields"]["handler_type"], "soun");
    assert_eq!(hdlr["fields"]["handler_name"], "handler");

    assert_eq!(v[0]["fields"]["payload_head"], "69736f6d0000020069736f6d");
    Ok(())
}

#[test]
fn json_offsets_start_at_the_read_position() -> anyhow::Result<()> {
    let mut data = vec![0u8; 4];
    data.extend_from_slice(&ftyp());
    let mut cur = Cursor::new(data);
    cur.seek(SeekFrom::Start(4))?;

    let atoms = get_atoms(&mut cur, false)?;
    assert_eq!(atoms.len(), 1);
    assert_eq!(atoms[0].offset, 4);
    assert_eq!(atoms[0].size, 20);
    Ok(())
}

#[test]
fn dump_lists_fields_under_each_atom() -> anyhow::Result<()> {
    let input = atom(b"stbl", &stsd(&[avc1("Codec", &[])]));
    let mut list = AtomList::parse(Cursor::new(concat(&[input, hdlr(b"vide", "Video")])))?;
    let text = list.dump();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "[stbl] size=8+102");
    assert_eq!(lines[1], "  [stsd] size=12+90, version=0, flags=0");
    assert_eq!(lines[2], format!("    {:<21} = {}", "entry_count", 1));
    assert_eq!(lines[3], "    [avc1] size=8+78");
    assert!(lines.contains(&format!("      {:<21} = {}", "width", 320).as_str()));
    assert!(lines.contains(&format!("      {:<21} = {}", "compressor_name", "Codec").as_str()));
    assert!(text.contains("[hdlr] size=12+"));
    assert!(lines.contains(&format!("  {:<21} = {}", "handler_type", "vide").as_str()));
    Ok(())
}

#[test]
fn known_box_table() {
    for (name, container, full) in [
        ("moov", true, false),
        ("ilst", true, false),
        ("moof", true, false),
        ("meta", true, true),
        ("odkm", true, true),
        ("stsd", true, true),
        ("ohdr", true, true),
        ("avc1", true, false),
        ("tkhd", false, true),
        ("iKMS", false, true),
        ("ftyp", false, false),
    ] {
        let kb = KnownBox::from(FourCC::from_name(name).expect("ascii"));
        assert_eq!(kb.is_container(), container, "{name}");
        assert_eq!(kb.is_full_box(), full, "{name}");
    }
    assert!(KnownBox::from(FourCC(*b"enca")).is_audio_entry());
    assert!(KnownBox::from(FourCC(*b"encv")).is_video_entry());
    assert!(KnownBox::from(FourCC(*b"mp4s")).is_sample_entry());
    assert_eq!(KnownBox::from(FourCC(*b"ftyp")), KnownBox::Unknown(FourCC(*b"ftyp")));
}

#[test]
fn default_registry_covers_every_known_box() {
    let reg = default_registry();
    for kb in KnownBox::ALL {
        assert!(reg.contains(kb.fourcc()), "{}", kb.fourcc());
    }
    assert!(!reg.contains(FourCC(*b"ftyp")));
    assert!(!reg.contains(FourCC(*b"data")));
    assert_eq!(reg.decoder_name(FourCC(*b"iKMS")), Some("ikms"));
}

#[test]
fn full_container_version_survives() -> anyhow::Result<()> {
    let input = full_atom(b"meta", 1, 0x000002, &atom(b"free", &[]));
    let list = AtomList::parse(Cursor::new(input))?;
    let meta = &list.atoms()[0];
    assert_eq!(meta.version(), 1);
    assert_eq!(meta.flags(), 2);
    assert_eq!(meta.children().len(), 1);
    Ok(())
}

#[test]
fn offsets_hold_after_dropped_atoms() -> anyhow::Result<()> {
    // stsd declares two entries; the second claims more than is left
    let mut table = 2u32.to_be_bytes().to_vec();
    table.extend_from_slice(&atom(b"mp4s", &[0, 0, 0, 0, 0, 0, 0, 1]));
    table.extend_from_slice(&100u32.to_be_bytes());
    table.extend_from_slice(b"mp4s");
    let stbl = atom(b"stbl", &full_atom(b"stsd", 0, 0, &table));

    // moov whose only child claims 64 bytes
    let mut child = 64u32.to_be_bytes().to_vec();
    child.extend_from_slice(b"free");
    child.extend_from_slice(&[0u8; 4]);
    let input = concat(&[stbl, atom(b"moov", &child), ftyp()]);

    let mut cur = Cursor::new(input);
    let v = serde_json::to_value(get_atoms(&mut cur, false)?)?;

    let stsd = &v[0]["children"][0];
    assert_eq!(stsd["offset"], 8);
    assert_eq!(stsd["size"], 40);
    assert_eq!(stsd["children"].as_array().map(Vec::len), Some(1));
    assert_eq!(stsd["children"][0]["offset"], 24);

    assert_eq!(v[1]["typ"], "moov");
    assert_eq!(v[1]["offset"], 48);
    assert_eq!(v[1]["children"].as_array().map(Vec::len), Some(0));
    assert_eq!(v[2]["typ"], "ftyp");
    assert_eq!(v[2]["offset"], 68);
    Ok(())
}
