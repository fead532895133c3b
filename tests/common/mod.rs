#![allow(dead_code)]

//! Byte builders for in-memory fixtures.

pub fn atom(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

pub fn full_atom(typ: &[u8; 4], version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![version];
    body.extend_from_slice(&flags.to_be_bytes()[1..]);
    body.extend_from_slice(payload);
    atom(typ, &body)
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

pub fn ftyp() -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(b"isom");
    p.extend_from_slice(&512u32.to_be_bytes());
    p.extend_from_slice(b"isom");
    atom(b"ftyp", &p)
}

pub fn hdlr(handler: &[u8; 4], name: &str) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&0u32.to_be_bytes()); // pre_defined
    p.extend_from_slice(handler);
    p.extend_from_slice(&[0u8; 12]);
    p.push(name.len() as u8);
    p.extend_from_slice(name.as_bytes());
    full_atom(b"hdlr", 0, 0, &p)
}

/// Version 0 track header.
pub fn tkhd(track_id: u32) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&1u32.to_be_bytes()); // creation
    p.extend_from_slice(&2u32.to_be_bytes()); // modification
    p.extend_from_slice(&track_id.to_be_bytes());
    p.extend_from_slice(&0u32.to_be_bytes());
    p.extend_from_slice(&1000u32.to_be_bytes()); // duration
    p.extend_from_slice(&[0u8; 8]);
    p.extend_from_slice(&0u16.to_be_bytes()); // layer
    p.extend_from_slice(&0u16.to_be_bytes()); // alternate group
    p.extend_from_slice(&0x0100u16.to_be_bytes()); // volume
    p.extend_from_slice(&[0u8; 2]);
    p.extend_from_slice(&[0u8; 36]); // matrix
    p.extend_from_slice(&(320i32 << 16).to_be_bytes());
    p.extend_from_slice(&(240i32 << 16).to_be_bytes());
    full_atom(b"tkhd", 0, 7, &p)
}

pub fn trak(track_id: u32, handler: Option<&[u8; 4]>) -> Vec<u8> {
    let mut body = tkhd(track_id);
    if let Some(h) = handler {
        body.extend_from_slice(&atom(b"mdia", &hdlr(h, "handler")));
    }
    atom(b"trak", &body)
}

pub fn data(data_type: u32, value: &[u8]) -> Vec<u8> {
    let mut p = Vec::new();
    p.extend_from_slice(&data_type.to_be_bytes());
    p.extend_from_slice(&0u32.to_be_bytes());
    p.extend_from_slice(value);
    atom(b"data", &p)
}

pub fn string_atom(typ: &[u8; 4], s: &str) -> Vec<u8> {
    let mut p = 0u32.to_be_bytes().to_vec();
    p.extend_from_slice(s.as_bytes());
    atom(typ, &p)
}

/// `moov/udta/meta/ilst` holding the given items.
pub fn movie_with_items(items: &[Vec<u8>]) -> Vec<u8> {
    let ilst = atom(b"ilst", &concat(items));
    let meta = full_atom(b"meta", 0, 0, &ilst);
    let udta = atom(b"udta", &meta);
    atom(b"moov", &udta)
}

pub fn mp4a(children: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8; 6];
    p.extend_from_slice(&1u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 8]);
    p.extend_from_slice(&2u16.to_be_bytes());
    p.extend_from_slice(&16u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 4]);
    p.extend_from_slice(&(44100u32 << 16).to_be_bytes());
    p.extend_from_slice(children);
    atom(b"mp4a", &p)
}

pub fn avc1(compressor: &str, children: &[u8]) -> Vec<u8> {
    let mut p = vec![0u8; 6];
    p.extend_from_slice(&1u16.to_be_bytes());
    p.extend_from_slice(&[0u8; 16]);
    p.extend_from_slice(&320u16.to_be_bytes());
    p.extend_from_slice(&240u16.to_be_bytes());
    p.extend_from_slice(&0x0048_0000i32.to_be_bytes());
    p.extend_from_slice(&0x0048_0000i32.to_be_bytes());
    p.extend_from_slice(&[0u8; 4]);
    p.extend_from_slice(&1u16.to_be_bytes());
    let mut name = [0u8; 32];
    name[0] = compressor.len() as u8;
    name[1..1 + compressor.len()].copy_from_slice(compressor.as_bytes());
    p.extend_from_slice(&name);
    p.extend_from_slice(&0x18u16.to_be_bytes());
    p.extend_from_slice(&(-1i16).to_be_bytes());
    p.extend_from_slice(children);
    atom(b"avc1", &p)
}

pub fn stsd(entries: &[Vec<u8>]) -> Vec<u8> {
    let mut p = (entries.len() as u32).to_be_bytes().to_vec();
    p.extend_from_slice(&concat(entries));
    full_atom(b"stsd", 0, 0, &p)
}
