use crate::boxes::FourCC;

/// Atom types with a built-in decoder.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)` and is left
/// to the type handler chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // plain containers
    Moov,
    Trak,
    Hnti,
    Stbl,
    Mdia,
    Dinf,
    Minf,
    Schi,
    Sinf,
    Udta,
    Ilst,
    Edts,
    Mvex,
    Moof,
    Traf,
    Mfra,

    // full containers
    Meta,
    Odkm,

    // fixed-layout atoms
    Tkhd,
    Hdlr,
    Stsd,
    Schm,

    // protection headers
    Ikms,
    Ohdr,
    Odaf,

    // sample entries
    Mp4a,
    Enca,
    Mp4v,
    Avc1,
    Hvc1,
    Hev1,
    Encv,
    Mp4s,

    Unknown(FourCC),
}

impl KnownBox {
    /// Every built-in kind, in registration order.
    pub const ALL: [KnownBox; 33] = [
        KnownBox::Moov,
        KnownBox::Trak,
        KnownBox::Hnti,
        KnownBox::Stbl,
        KnownBox::Mdia,
        KnownBox::Dinf,
        KnownBox::Minf,
        KnownBox::Schi,
        KnownBox::Sinf,
        KnownBox::Udta,
        KnownBox::Ilst,
        KnownBox::Edts,
        KnownBox::Mvex,
        KnownBox::Moof,
        KnownBox::Traf,
        KnownBox::Mfra,
        KnownBox::Meta,
        KnownBox::Odkm,
        KnownBox::Tkhd,
        KnownBox::Hdlr,
        KnownBox::Stsd,
        KnownBox::Schm,
        KnownBox::Ikms,
        KnownBox::Ohdr,
        KnownBox::Odaf,
        KnownBox::Mp4a,
        KnownBox::Enca,
        KnownBox::Mp4v,
        KnownBox::Avc1,
        KnownBox::Hvc1,
        KnownBox::Hev1,
        KnownBox::Encv,
        KnownBox::Mp4s,
    ];

    pub fn fourcc(&self) -> FourCC {
        FourCC(match self {
            KnownBox::Moov => *b"moov",
            KnownBox::Trak => *b"trak",
            KnownBox::Hnti => *b"hnti",
            KnownBox::Stbl => *b"stbl",
            KnownBox::Mdia => *b"mdia",
            KnownBox::Dinf => *b"dinf",
            KnownBox::Minf => *b"minf",
            KnownBox::Schi => *b"schi",
            KnownBox::Sinf => *b"sinf",
            KnownBox::Udta => *b"udta",
            KnownBox::Ilst => *b"ilst",
            KnownBox::Edts => *b"edts",
            KnownBox::Mvex => *b"mvex",
            KnownBox::Moof => *b"moof",
            KnownBox::Traf => *b"traf",
            KnownBox::Mfra => *b"mfra",
            KnownBox::Meta => *b"meta",
            KnownBox::Odkm => *b"odkm",
            KnownBox::Tkhd => *b"tkhd",
            KnownBox::Hdlr => *b"hdlr",
            KnownBox::Stsd => *b"stsd",
            KnownBox::Schm => *b"schm",
            KnownBox::Ikms => *b"iKMS",
            KnownBox::Ohdr => *b"ohdr",
            KnownBox::Odaf => *b"odaf",
            KnownBox::Mp4a => *b"mp4a",
            KnownBox::Enca => *b"enca",
            KnownBox::Mp4v => *b"mp4v",
            KnownBox::Avc1 => *b"avc1",
            KnownBox::Hvc1 => *b"hvc1",
            KnownBox::Hev1 => *b"hev1",
            KnownBox::Encv => *b"encv",
            KnownBox::Mp4s => *b"mp4s",
            KnownBox::Unknown(cc) => cc.0,
        })
    }

    /// Does this atom hold child atoms (possibly after some fields)?
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Moov
                | KnownBox::Trak
                | KnownBox::Hnti
                | KnownBox::Stbl
                | KnownBox::Mdia
                | KnownBox::Dinf
                | KnownBox::Minf
                | KnownBox::Schi
                | KnownBox::Sinf
                | KnownBox::Udta
                | KnownBox::Ilst
                | KnownBox::Edts
                | KnownBox::Mvex
                | KnownBox::Moof
                | KnownBox::Traf
                | KnownBox::Mfra
                | KnownBox::Meta
                | KnownBox::Odkm
                | KnownBox::Stsd
                | KnownBox::Ohdr
        ) || self.is_sample_entry()
    }

    /// Is this a full atom (version + flags)?
    pub fn is_full_box(&self) -> bool {
        matches!(
            self,
            KnownBox::Meta
                | KnownBox::Odkm
                | KnownBox::Tkhd
                | KnownBox::Hdlr
                | KnownBox::Stsd
                | KnownBox::Schm
                | KnownBox::Ikms
                | KnownBox::Ohdr
                | KnownBox::Odaf
        )
    }

    pub fn is_sample_entry(&self) -> bool {
        self.is_audio_entry() || self.is_video_entry() || matches!(self, KnownBox::Mp4s)
    }

    pub fn is_audio_entry(&self) -> bool {
        matches!(self, KnownBox::Mp4a | KnownBox::Enca)
    }

    pub fn is_video_entry(&self) -> bool {
        matches!(
            self,
            KnownBox::Mp4v | KnownBox::Avc1 | KnownBox::Hvc1 | KnownBox::Hev1 | KnownBox::Encv
        )
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Moov => "Movie Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Hnti => "Hint Information Box",
            KnownBox::Stbl => "Sample Table Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Dinf => "Data Information Box",
            KnownBox::Minf => "Media Information Box",
            KnownBox::Schi => "Scheme Information Box",
            KnownBox::Sinf => "Protection Scheme Information Box",
            KnownBox::Udta => "User Data Box",
            KnownBox::Ilst => "Metadata Item List Box",
            KnownBox::Edts => "Edit Box",
            KnownBox::Mvex => "Movie Extends Box",
            KnownBox::Moof => "Movie Fragment Box",
            KnownBox::Traf => "Track Fragment Box",
            KnownBox::Mfra => "Movie Fragment Random Access Box",
            KnownBox::Meta => "Meta Box",
            KnownBox::Odkm => "OMA DRM Key Management Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Stsd => "Sample Description Box",
            KnownBox::Schm => "Scheme Type Box",
            KnownBox::Ikms => "ISMA KMS Box",
            KnownBox::Ohdr => "OMA DRM Common Headers Box",
            KnownBox::Odaf => "OMA DRM Access Unit Format Box",
            KnownBox::Mp4a => "MPEG-4 Audio Sample Entry",
            KnownBox::Enca => "Encrypted Audio Sample Entry",
            KnownBox::Mp4v => "MPEG-4 Visual Sample Entry",
            KnownBox::Avc1 => "AVC Sample Entry",
            KnownBox::Hvc1 | KnownBox::Hev1 => "HEVC Sample Entry",
            KnownBox::Encv => "Encrypted Video Sample Entry",
            KnownBox::Mp4s => "MPEG-4 Systems Sample Entry",
            KnownBox::Unknown(_) => "Unknown Box",
        }
    }
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"moov" => KnownBox::Moov,
            b"trak" => KnownBox::Trak,
            b"hnti" => KnownBox::Hnti,
            b"stbl" => KnownBox::Stbl,
            b"mdia" => KnownBox::Mdia,
            b"dinf" => KnownBox::Dinf,
            b"minf" => KnownBox::Minf,
            b"schi" => KnownBox::Schi,
            b"sinf" => KnownBox::Sinf,
            b"udta" => KnownBox::Udta,
            b"ilst" => KnownBox::Ilst,
            b"edts" => KnownBox::Edts,
            b"mvex" => KnownBox::Mvex,
            b"moof" => KnownBox::Moof,
            b"traf" => KnownBox::Traf,
            b"mfra" => KnownBox::Mfra,

            b"meta" => KnownBox::Meta,
            b"odkm" => KnownBox::Odkm,

            b"tkhd" => KnownBox::Tkhd,
            b"hdlr" => KnownBox::Hdlr,
            b"stsd" => KnownBox::Stsd,
            b"schm" => KnownBox::Schm,

            b"iKMS" => KnownBox::Ikms,
            b"ohdr" => KnownBox::Ohdr,
            b"odaf" => KnownBox::Odaf,

            b"mp4a" => KnownBox::Mp4a,
            b"enca" => KnownBox::Enca,
            b"mp4v" => KnownBox::Mp4v,
            b"avc1" => KnownBox::Avc1,
            b"hvc1" => KnownBox::Hvc1,
            b"hev1" => KnownBox::Hev1,
            b"encv" => KnownBox::Encv,
            b"mp4s" => KnownBox::Mp4s,

            _ => KnownBox::Unknown(cc),
        }
    }
}
