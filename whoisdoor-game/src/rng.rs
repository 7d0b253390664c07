//! Random stream behind the companion draw.
//!
//! Each arrival makes one fresh draw from the stream; nothing about the draw
//! is derived from the game state. Seeded construction exists for
//! reproducible test runs.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

const COMPANION_DOMAIN: &[u8] = b"whoisdoor.companion";

/// RNG wrapper that counts draw calls.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    digest
        .first_chunk::<8>()
        .map_or(user_seed, |bytes| u64::from_le_bytes(*bytes))
}

/// Companion stream owned by a session.
#[derive(Debug, Clone)]
pub struct CompanionRng {
    seed: u64,
    stream: CountingRng<SmallRng>,
}

impl CompanionRng {
    /// Construct the stream from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            stream: CountingRng::new(derive_stream_seed(seed, COMPANION_DOMAIN)),
        }
    }

    /// Construct the stream from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_user_seed(rand::random())
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.stream.draws()
    }

    /// One independent draw: `true` with probability `chance`.
    pub fn roll_companion(&mut self, chance: f64) -> bool {
        let roll = self.stream.r#gen::<f64>();
        log::trace!(target: crate::constants::LOG_TARGET, "companion roll {roll:.4} vs {chance:.2}");
        roll < chance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_replays_the_same_sequence() {
        let mut a = CompanionRng::from_user_seed(42);
        let mut b = CompanionRng::from_user_seed(42);
        let seq_a: Vec<bool> = (0..32).map(|_| a.roll_companion(0.6)).collect();
        let seq_b: Vec<bool> = (0..32).map(|_| b.roll_companion(0.6)).collect();
        assert_eq!(seq_a, seq_b);
        assert_eq!(a.draws(), b.draws());
    }

    #[test]
    fn each_roll_is_a_fresh_draw() {
        let mut rng = CompanionRng::from_user_seed(7);
        let before = rng.draws();
        let _ = rng.roll_companion(0.6);
        let _ = rng.roll_companion(0.6);
        assert!(rng.draws() >= before + 2);
    }

    #[test]
    fn degenerate_chances_are_deterministic() {
        let mut rng = CompanionRng::from_user_seed(3);
        assert!((0..100).all(|_| !rng.roll_companion(0.0)));
        assert!((0..100).all(|_| rng.roll_companion(1.0)));
    }

    #[test]
    fn stream_seed_is_domain_separated() {
        assert_ne!(derive_stream_seed(1, b"a"), derive_stream_seed(1, b"b"));
        assert_ne!(derive_stream_seed(1, b"a"), derive_stream_seed(2, b"a"));
    }
}
