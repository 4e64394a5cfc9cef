use rand::RngCore;
use rand::rngs::ThreadRng;
use tracing::debug;

use crate::threefry::ThreefryRng;

pub const SAMPLE_SEED_ENV: &str = "TMX_SAMPLE_SEED";

/// Default randomness for sampled buffers and quantization parameters.
///
/// Unless a seed is supplied, draws come from the thread-local OS-seeded
/// generator and are not reproducible across runs.
#[derive(Debug)]
pub enum EntropySource {
    Thread(ThreadRng),
    Seeded { seed: u64, rng: ThreefryRng },
}

impl EntropySource {
    /// Seeded when `TMX_SAMPLE_SEED` holds a `u64`, fresh entropy otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        match capture_sample_seed() {
            Some(seed) => {
                debug!(seed, "sampling from seeded threefry stream");
                Self::seeded(seed)
            }
            None => {
                debug!("sampling from thread-local entropy");
                Self::entropy()
            }
        }
    }

    #[must_use]
    pub fn entropy() -> Self {
        Self::Thread(rand::thread_rng())
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded {
            seed,
            rng: ThreefryRng::new(seed),
        }
    }

    /// The seed to replay this source with, if it has one.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        match self {
            Self::Thread(_) => None,
            Self::Seeded { seed, .. } => Some(*seed),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::from_env()
    }
}

impl RngCore for EntropySource {
    fn next_u32(&mut self) -> u32 {
        match self {
            Self::Thread(rng) => rng.next_u32(),
            Self::Seeded { rng, .. } => rng.next_u32(),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match self {
            Self::Thread(rng) => rng.next_u64(),
            Self::Seeded { rng, .. } => rng.next_u64(),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        match self {
            Self::Thread(rng) => rng.fill_bytes(dest),
            Self::Seeded { rng, .. } => rng.fill_bytes(dest),
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        match self {
            Self::Thread(rng) => rng.try_fill_bytes(dest),
            Self::Seeded { rng, .. } => rng.try_fill_bytes(dest),
        }
    }
}

#[must_use]
pub fn capture_sample_seed() -> Option<u64> {
    if let Ok(raw) = std::env::var(SAMPLE_SEED_ENV)
        && let Ok(seed) = raw.trim().parse::<u64>()
    {
        return Some(seed);
    }

    None
}
