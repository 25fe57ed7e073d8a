// Seeded random streams for Beatsmith.
//
// `PatternRng` is xoshiro256++ (Blackman & Vigna) seeded through SplitMix64.
// The bit stream for a seed is fixed across platforms and dependency
// upgrades; `rand` is never consulted once a seed is known.
//
// Generation draws tempo and harmony from one master stream, then forks one
// child per layer in a fixed order. A child is seeded from a single parent
// draw, so how much a layer consumes never shifts what any other layer sees.
//
// Only integer arithmetic runs inside the generator. Floats appear solely
// when mapping output onto [0, 1) for probability checks.

use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Xoshiro256++ state. Serializable so a stream can be checkpointed and
/// resumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRng {
    state: [u64; 4],
}

impl PatternRng {
    pub fn new(seed: u64) -> Self {
        let mut expander = SplitMix64(seed);
        let state = std::array::from_fn(|_| expander.mix());
        PatternRng { state }
    }

    /// A child stream. Costs the parent exactly one draw.
    pub fn fork(&mut self) -> PatternRng {
        let seed = self.next_u64();
        PatternRng::new(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        let [a, b, c, d] = &mut self.state;
        let out = a.wrapping_add(*d).rotate_left(23).wrapping_add(*a);
        let shifted = *b << 17;
        *c ^= *a;
        *d ^= *b;
        *b ^= *c;
        *a ^= *d;
        *c ^= shifted;
        *d = d.rotate_left(45);
        out
    }

    /// Uniform in [0, 1), 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
        (self.next_u64() >> 11) as f64 * SCALE
    }

    /// Uniform in `0..bound` using Lemire's widening multiply, rejecting the
    /// biased low slice. `bound` must be non-zero.
    fn below(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0);
        let reject_under = bound.wrapping_neg() % bound;
        loop {
            let wide = u128::from(self.next_u64()) * u128::from(bound);
            if (wide as u64) >= reject_under {
                return (wide >> 64) as u64;
            }
        }
    }

    /// Uniform in `low..=high`.
    ///
    /// # Panics
    /// If `low > high`.
    pub fn range_u32_inclusive(&mut self, low: u32, high: u32) -> u32 {
        assert!(low <= high, "empty range {low}..={high}");
        let span = u64::from(high - low) + 1;
        low + self.below(span) as u32
    }

    /// Uniform in `low..=high`; handles negative bounds.
    ///
    /// # Panics
    /// If `low > high`.
    pub fn range_i32_inclusive(&mut self, low: i32, high: i32) -> i32 {
        assert!(low <= high, "empty range {low}..={high}");
        let span = (i64::from(high) - i64::from(low)) as u64 + 1;
        (i64::from(low) + self.below(span) as i64) as i32
    }

    /// True with probability `p`. Always consumes one draw, so callers can
    /// branch on it without desynchronizing the stream.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// A uniformly chosen element, or `None` for an empty slice (no draw).
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.below(items.len() as u64) as usize;
        items.get(index)
    }
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn mix(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }
}
