mod common;

use common::{atom, concat, full_atom};
use mp4atom::atoms::{EncryptionMethod, OhdrFields, PaddingScheme};
use mp4atom::{Atom, AtomList, Error, FourCC, Leaf, Preamble};
use std::io::Cursor;

fn ohdr_payload(lengths: [u16; 3], strings: &[u8], children: &[u8]) -> Vec<u8> {
    let mut p = vec![1u8, 1u8]; // AES CBC, RFC 2630
    p.extend_from_slice(&1000u64.to_be_bytes());
    for len in lengths {
        p.extend_from_slice(&len.to_be_bytes());
    }
    p.extend_from_slice(strings);
    p.extend_from_slice(children);
    p
}

fn content_header(atom: &Atom) -> &OhdrFields {
    match &atom.as_container().expect("ohdr is a container").preamble {
        Preamble::ContentHeader(h) => h,
        other => panic!("unexpected preamble {:?}", other),
    }
}

#[test]
fn common_headers_with_child_atoms() -> anyhow::Result<()> {
    let ohdr = full_atom(
        b"ohdr",
        0,
        0,
        &ohdr_payload([3, 9, 0], b"cidhttp://ri", &atom(b"grpi", &[0; 6])),
    );
    let odaf = full_atom(b"odaf", 0, 0, &[0x80, 4, 16]);
    let input = atom(b"schi", &full_atom(b"odkm", 0, 0, &concat(&[odaf, ohdr])));

    let list = AtomList::parse(Cursor::new(input))?;
    let odkm = list.find_atom("schi/odkm").expect("odkm");
    assert!(odkm.is_full());
    assert_eq!(odkm.children().len(), 2);

    let ohdr = list.find_atom("schi/odkm/ohdr").expect("ohdr");
    let h = content_header(ohdr);
    assert_eq!(h.encryption_method, EncryptionMethod::AesCbc);
    assert_eq!(h.padding_scheme, PaddingScheme::Rfc2630);
    assert_eq!(h.encryption_method.to_string(), "AES CBC");
    assert_eq!(h.padding_scheme.to_string(), "RFC 2630");
    assert_eq!(h.plaintext_length, 1000);
    assert_eq!(h.content_id, "cid");
    assert_eq!(h.rights_issuer_url, "http://ri");
    assert_eq!(h.textual_headers, "");
    assert_eq!(ohdr.children()[0].typ, FourCC(*b"grpi"));

    match list.find_atom("schi/odkm/odaf").and_then(Atom::as_leaf) {
        Some(Leaf::SelectiveEncryption(f)) => {
            assert!(f.selective_encryption);
            assert_eq!(f.key_indicator_length, 4);
            assert_eq!(f.iv_length, 16);
        }
        other => panic!("unexpected {:?}", other),
    }
    Ok(())
}

#[test]
fn string_lengths_are_clamped_to_the_atom() -> anyhow::Result<()> {
    // textual headers claim 50 bytes, only 5 remain
    let ohdr = full_atom(b"ohdr", 0, 0, &ohdr_payload([1, 0, 50], b"cX-H:1", &[]));

    let list = AtomList::parse(Cursor::new(ohdr))?;
    let h = content_header(&list.atoms()[0]);
    assert_eq!(h.content_id, "c");
    assert_eq!(h.textual_headers, "X-H:1");
    assert!(list.atoms()[0].children().is_empty());
    Ok(())
}

#[test]
fn unknown_methods_are_preserved() -> anyhow::Result<()> {
    let mut p = ohdr_payload([0, 0, 0], &[], &[]);
    p[0] = 9;
    p[1] = 0;
    let list = AtomList::parse(Cursor::new(full_atom(b"ohdr", 0, 0, &p)))?;
    let h = content_header(&list.atoms()[0]);
    assert_eq!(h.encryption_method, EncryptionMethod::Unknown(9));
    assert_eq!(h.encryption_method.to_string(), "Unknown");
    assert_eq!(h.padding_scheme, PaddingScheme::None);
    Ok(())
}

#[test]
fn truncated_fixed_fields_are_kept_raw() -> anyhow::Result<()> {
    let input = full_atom(
        b"odkm",
        0,
        0,
        &concat(&[
            full_atom(b"ohdr", 0, 0, &[1, 1, 0, 0]),
            full_atom(b"odaf", 0, 0, &[0x80]),
        ]),
    );
    let mut list = AtomList::parse(Cursor::new(input.clone()))?;

    let odkm = &list.atoms()[0];
    assert_eq!(odkm.children().len(), 2);
    for child in odkm.children() {
        assert!(matches!(child.as_leaf(), Some(Leaf::Passthrough(_))), "{}", child.typ);
    }

    // raw atoms are writable again
    let mut out: Vec<u8> = Vec::new();
    list.write(&mut out)?;
    assert_eq!(out, input);
    Ok(())
}

#[test]
fn rights_headers_are_read_only() -> anyhow::Result<()> {
    let input = full_atom(b"odkm", 0, 0, &full_atom(b"ohdr", 0, 0, &ohdr_payload([0, 0, 0], &[], &[])));
    let mut list = AtomList::parse(Cursor::new(input))?;

    let mut out: Vec<u8> = Vec::new();
    let err = list.write(&mut out).unwrap_err();
    assert!(matches!(err, Error::Unsupported(t) if t == FourCC(*b"ohdr")));
    assert!(out.is_empty());
    Ok(())
}
