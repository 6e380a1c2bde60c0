//! Simulated latency and the randomness behind it.
//!
//! Every mock stage suspends through a [`Jitter`] before producing output.
//! `Jitter` pairs a seeded [`StdRng`] with a [`Sleeper`], so the same code
//! path can run against real timers ([`TokioSleeper`]) or complete instantly
//! and reproducibly ([`NoSleep`] + a fixed seed) under test.
//!
//! ```rust
//! use std::time::Duration;
//! use voice_agent_sim::stages::{DelayRange, Jitter};
//!
//! let jitter = Jitter::instant(42);
//! let d = DelayRange::new(50, 150).sample(&mut *jitter.rng());
//! assert!(d >= Duration::from_millis(50) && d <= Duration::from_millis(150));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

/// Suspension point used by the mocks.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock delays on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

// ---------------------------------------------------------------------------
// DelayRange
// ---------------------------------------------------------------------------

/// Inclusive range of milliseconds a simulated delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Draw a uniformly distributed delay.  A reversed range is swapped.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        Duration::from_millis(rng.gen_range(lo..=hi))
    }
}

// ---------------------------------------------------------------------------
// StageTiming
// ---------------------------------------------------------------------------

/// Delay table for every mock stage, serialised as the `[timing]` section of
/// `settings.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTiming {
    /// Before the first transcript word.
    pub stt_startup: DelayRange,
    /// Before each further transcript word.
    pub stt_word: DelayRange,
    /// Before the first completion token.
    pub llm_startup: DelayRange,
    /// Before each completion token.
    pub llm_token: DelayRange,
    /// Whole synthesis call.
    pub tts: DelayRange,
    /// Whole tool call.
    pub tool: DelayRange,
    /// Whole transform call.
    pub transform: DelayRange,
}

impl Default for StageTiming {
    fn default() -> Self {
        Self {
            stt_startup: DelayRange::new(100, 300),
            stt_word: DelayRange::new(50, 150),
            llm_startup: DelayRange::new(200, 600),
            llm_token: DelayRange::new(30, 100),
            tts: DelayRange::new(300, 800),
            tool: DelayRange::new(100, 400),
            transform: DelayRange::new(50, 150),
        }
    }
}

// ---------------------------------------------------------------------------
// Jitter
// ---------------------------------------------------------------------------

/// Random source plus suspension point, shared by all mocks of one run.
pub struct Jitter {
    rng: Mutex<StdRng>,
    sleeper: Arc<dyn Sleeper>,
}

impl Jitter {
    pub fn new(rng: StdRng, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            rng: Mutex::new(rng),
            sleeper,
        }
    }

    /// OS-seeded RNG with real delays.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), Arc::new(TokioSleeper))
    }

    /// Reproducible RNG with real delays.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), Arc::new(TokioSleeper))
    }

    /// Reproducible RNG with zero-length delays.
    pub fn instant(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), Arc::new(NoSleep))
    }

    /// Lock the RNG.  Never hold the guard across an `.await`.
    pub fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for a duration drawn from `range`.
    pub async fn pause(&self, range: DelayRange) {
        let delay = range.sample(&mut *self.rng());
        self.sleeper.sleep(delay).await;
    }
}

impl std::fmt::Debug for Jitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jitter").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_stays_in_range() {
        let jitter = Jitter::instant(1);
        let range = DelayRange::new(30, 100);
        for _ in 0..200 {
            let d = range.sample(&mut *jitter.rng());
            assert!(d >= Duration::from_millis(30) && d <= Duration::from_millis(100));
        }
    }

    #[test]
    fn reversed_range_is_swapped() {
        let jitter = Jitter::instant(2);
        let d = DelayRange::new(10, 5).sample(&mut *jitter.rng());
        assert!(d >= Duration::from_millis(5) && d <= Duration::from_millis(10));
    }

    #[test]
    fn degenerate_range_is_exact() {
        let jitter = Jitter::instant(3);
        let d = DelayRange::new(7, 7).sample(&mut *jitter.rng());
        assert_eq!(d, Duration::from_millis(7));
    }

    #[test]
    fn same_seed_same_draws() {
        let a = Jitter::instant(99);
        let b = Jitter::instant(99);
        let xs: Vec<u32> = (0..10).map(|_| a.rng().gen()).collect();
        let ys: Vec<u32> = (0..10).map(|_| b.rng().gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn default_timing_matches_documented_ranges() {
        let t = StageTiming::default();
        assert_eq!(t.stt_startup, DelayRange::new(100, 300));
        assert_eq!(t.stt_word, DelayRange::new(50, 150));
        assert_eq!(t.llm_startup, DelayRange::new(200, 600));
        assert_eq!(t.llm_token, DelayRange::new(30, 100));
        assert_eq!(t.tts, DelayRange::new(300, 800));
        assert_eq!(t.tool, DelayRange::new(100, 400));
        assert_eq!(t.transform, DelayRange::new(50, 150));
    }

    #[tokio::test]
    async fn tokio_sleeper_waits_drawn_delay() {
        let jitter = Jitter::seeded(5);
        let before = std::time::Instant::now();
        jitter.pause(DelayRange::new(20, 20)).await;
        assert!(before.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn no_sleep_returns_immediately() {
        let jitter = Jitter::instant(5);
        let before = std::time::Instant::now();
        jitter.pause(DelayRange::new(10_000, 10_000)).await;
        assert!(before.elapsed() < Duration::from_secs(1));
    }
}
