//! JPEG marker codes (ITU-T T.81 Table B.1), adapted to keep this module easy
//! to diff against any general-purpose JPEG marker table.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Sof(u8),
    Dht,
    Dac,
    Rst(u8),
    Soi,
    Eoi,
    Sos,
    Dqt,
    Dnl,
    Dri,
    Dhp,
    Exp,
    App(u8),
    Jpgn(u8),
    Com,
    Tem,
    Res,
}

impl Marker {
    /// Whether this marker is followed by a two-byte length field.
    pub fn has_length(self) -> bool {
        !matches!(
            self,
            Marker::Soi | Marker::Eoi | Marker::Rst(_) | Marker::Tem
        )
    }

    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0x00 | 0xFF => None,
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => Some(Marker::Sof(byte - 0xC0)),
            0xC4 => Some(Marker::Dht),
            0xC8 => Some(Marker::Jpgn(byte - 0xC0)),
            0xCC => Some(Marker::Dac),
            0xD0..=0xD7 => Some(Marker::Rst(byte - 0xD0)),
            0xD8 => Some(Marker::Soi),
            0xD9 => Some(Marker::Eoi),
            0xDA => Some(Marker::Sos),
            0xDB => Some(Marker::Dqt),
            0xDC => Some(Marker::Dnl),
            0xDD => Some(Marker::Dri),
            0xDE => Some(Marker::Dhp),
            0xDF => Some(Marker::Exp),
            0xE0..=0xEF => Some(Marker::App(byte - 0xE0)),
            0xF0..=0xFD => Some(Marker::Jpgn(byte - 0xC0)),
            0xFE => Some(Marker::Com),
            0x01 => Some(Marker::Tem),
            0x02..=0xBF => Some(Marker::Res),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Marker::Sof(n) => 0xC0 + n,
            Marker::Dht => 0xC4,
            Marker::Jpgn(n) => 0xC0 + n,
            Marker::Dac => 0xCC,
            Marker::Rst(n) => 0xD0 + n,
            Marker::Soi => 0xD8,
            Marker::Eoi => 0xD9,
            Marker::Sos => 0xDA,
            Marker::Dqt => 0xDB,
            Marker::Dnl => 0xDC,
            Marker::Dri => 0xDD,
            Marker::Dhp => 0xDE,
            Marker::Exp => 0xDF,
            Marker::App(n) => 0xE0 + n,
            Marker::Com => 0xFE,
            Marker::Tem => 0x01,
            Marker::Res => 0x02,
        }
    }
}
