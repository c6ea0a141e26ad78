use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LCG_MUL: u64 = 6364136223846793005;
const LCG_INC: u64 = 1442695040888963407;

/// Hands out one generator per named stage.
///
/// A stream's seed is a function of the master seed and the stage name only.
/// Adding, removing or reordering other stages leaves it unchanged.
pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    /// Borrow the stream for `name`. A second request continues the same sequence.
    pub fn stream(&mut self, name: &str) -> StageRng<'_> {
        let seed = self.seed;
        let inner = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(stream_seed(seed, name)));
        StageRng { inner }
    }
}

/// FNV-1a over the name, folded into the master seed with an LCG step.
fn stream_seed(master: u64, name: &str) -> u64 {
    let name_hash = name
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
    let mut seed = master.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC);
    seed ^= name_hash;
    seed.wrapping_mul(LCG_MUL).wrapping_add(LCG_INC)
}

pub struct StageRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl RngCore for StageRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
