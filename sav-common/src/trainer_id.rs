//! Trainer ID pair.

/// A trainer's public and secret ID.
///
/// On the wire this is a single little-endian `u32` with the public half
/// in the low 16 bits. The public half is what the games print on the
/// trainer card; the secret half only ever participates in internal
/// checks such as shiny determination and the save-record cipher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TrainerId {
    /// ID shown in-game.
    pub public: u16,
    /// Hidden half of the ID.
    pub secret: u16,
}

impl TrainerId {
    /// Split a packed 32-bit ID into its halves.
    pub fn from_full(full: u32) -> Self {
        Self {
            public: (full & 0xFFFF) as u16,
            secret: (full >> 16) as u16,
        }
    }

    /// Pack both halves back into the 32-bit form.
    pub fn full(&self) -> u32 {
        u32::from(self.secret) << 16 | u32::from(self.public)
    }
}

impl From<u32> for TrainerId {
    fn from(full: u32) -> Self {
        Self::from_full(full)
    }
}

impl From<TrainerId> for u32 {
    fn from(id: TrainerId) -> Self {
        id.full()
    }
}
