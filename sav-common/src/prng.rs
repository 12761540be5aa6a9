//! Pseudo-random number generators used by the handheld games.
//!
//! [`Lcrng`] is the 32-bit linear congruential generator every mainline
//! game from Generation III onward advances for personality values, IVs
//! and encounter rolls. [`Mt19937`] is the stock Mersenne Twister the
//! later engines seed alongside it. Both are deterministic given a seed,
//! which is what save tooling needs to reproduce in-game sequences.

/// Linear congruential generator (`seed * 0x41C64E6D + 0x6073`).
///
/// Each step advances the full 32-bit state once; the games consume the
/// high 16 bits of the new state as the random output.
#[derive(Clone, Copy, Debug)]
pub struct Lcrng {
    seed: u32,
}

impl Lcrng {
    const MULTIPLIER: u32 = 0x41C6_4E6D;
    const INCREMENT: u32 = 0x6073;

    /// Create a generator from an initial seed.
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// The current state.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance one step and return the high 16 bits of the new state.
    pub fn next_u16(&mut self) -> u16 {
        self.seed = self
            .seed
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        (self.seed >> 16) as u16
    }
}

const MT_N: usize = 624;
const MT_M: usize = 397;

/// MT19937 Mersenne Twister.
#[derive(Clone)]
pub struct Mt19937 {
    state: [u32; MT_N],
    index: usize,
}

impl Mt19937 {
    /// Create a generator from an initial seed.
    pub fn new(seed: u32) -> Self {
        let mut state = [0u32; MT_N];
        state[0] = seed;
        for i in 1..MT_N {
            state[i] = 1_812_433_253u32
                .wrapping_mul(state[i - 1] ^ (state[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        Self {
            state,
            index: MT_N,
        }
    }

    /// Produce the next 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= MT_N {
            self.twist();
        }

        let mut y = self.state[self.index];
        self.index += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9D2C_5680;
        y ^= (y << 15) & 0xEFC6_0000;
        y ^ (y >> 18)
    }

    fn twist(&mut self) {
        for i in 0..MT_N {
            let y = (self.state[i] & 0x8000_0000) | (self.state[(i + 1) % MT_N] & 0x7FFF_FFFF);
            let mut next = y >> 1;
            if y & 1 != 0 {
                next ^= 0x9908_B0DF;
            }
            self.state[i] = self.state[(i + MT_M) % MT_N] ^ next;
        }
        self.index = 0;
    }
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937").field("index", &self.index).finish()
    }
}
