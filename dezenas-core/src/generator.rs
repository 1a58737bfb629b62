//! Guaranteed-match game generation.
//!
//! A run goes through seeding (reuse of the caller's existing games) and then generation,
//! either exhaustive or randomized, and ends as complete, stopped by the caller, or exhausted.
//! No two accepted games share a subset of `guaranteed` numbers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::combinatorics::{Fingerprint, binomial, k_subsets_flat, subset_fingerprints};
use crate::config::{GenerationConfig, GenerationMode};
use crate::error::GenerationError;
use crate::models::Game;
use crate::sampler::weighted_sample_without_replacement;

/// Randomized mode also reports every this many attempts, so a saturated search stays visible.
const ATTEMPTS_PER_REPORT: u64 = 10_000;
const ACCEPTED_PER_REPORT: usize = 10;
/// Exhaustive mode indexes combinations with `u32`.
pub const MAX_EXHAUSTIVE_COMBINATIONS: u64 = u32::MAX as u64;

/// Shared stop flag. The owner may set it from any thread; the generator polls it
/// before every candidate.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressDetail {
    Seeding { reused: usize },
    Exhaustive { tested: u64, total: u64 },
    Randomized { attempts: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub accepted: usize,
    pub target: usize,
    pub mode: GenerationMode,
    pub detail: ProgressDetail,
}

impl ProgressEvent {
    /// Share of combinations already tested, exhaustive mode only.
    pub fn percent(&self) -> Option<f64> {
        match self.detail {
            ProgressDetail::Exhaustive { tested, total } if total > 0 => {
                Some(tested as f64 / total as f64 * 100.0)
            }
            _ => None,
        }
    }
}

/// Receives progress events. Purely observational.
pub trait ProgressSink {
    fn report(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionCause {
    /// Every combination of the working pool was tested.
    CombinationsExhausted,
    /// Randomized search went too long without accepting a game.
    IdleTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Complete,
    Stopped,
    Exhausted(ExhaustionCause),
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationStatus::Complete => write!(f, "complete"),
            GenerationStatus::Stopped => write!(f, "stopped by user"),
            GenerationStatus::Exhausted(ExhaustionCause::CombinationsExhausted) => {
                write!(f, "combinations exhausted")
            }
            GenerationStatus::Exhausted(ExhaustionCause::IdleTimeout) => {
                write!(f, "idle time limit reached")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Accepted games, reused ones first, in acceptance order.
    pub games: Vec<Game>,
    /// How many of `games` came from the existing games.
    pub reused: usize,
    pub status: GenerationStatus,
    pub target: usize,
    /// Numbers new games were drawn from.
    pub working_pool: Vec<u8>,
    /// Candidates tested during generation (seeding not included).
    pub evaluated: u64,
    pub elapsed: Duration,
}

impl GenerationOutcome {
    pub fn shortfall(&self) -> usize {
        self.target.saturating_sub(self.games.len())
    }

    pub fn is_complete(&self) -> bool {
        self.status == GenerationStatus::Complete
    }

    pub fn generated(&self) -> usize {
        self.games.len() - self.reused
    }
}

/// Fingerprints consumed by accepted games. Only grows.
#[derive(Debug, Clone)]
pub struct FingerprintRegistry {
    size: usize,
    used: FxHashSet<Fingerprint>,
}

impl FingerprintRegistry {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            used: FxHashSet::default(),
        }
    }

    pub fn conflicts(&self, numbers: &[u8]) -> bool {
        subset_fingerprints(numbers, self.size)
            .iter()
            .any(|fp| self.used.contains(fp))
    }

    /// Registers every subset of `numbers` unless one is already taken.
    pub fn try_register(&mut self, numbers: &[u8]) -> bool {
        let prints = subset_fingerprints(numbers, self.size);
        if prints.iter().any(|fp| self.used.contains(fp)) {
            return false;
        }
        self.used.extend(prints);
        true
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Appearances of each number across accepted games.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: Vec<u32>,
}

impl FrequencyTable {
    pub fn new(pool_size: u8) -> Self {
        Self {
            counts: vec![0; pool_size as usize + 1],
        }
    }

    pub fn record(&mut self, numbers: &[u8]) {
        for &n in numbers {
            if let Some(count) = self.counts.get_mut(n as usize) {
                *count += 1;
            }
        }
    }

    pub fn count(&self, number: u8) -> u32 {
        self.counts.get(number as usize).copied().unwrap_or(0)
    }

    /// Inverse-frequency weight `1 / (count + 1)` for each number.
    pub fn weights(&self, numbers: &[u8]) -> Vec<f64> {
        numbers
            .iter()
            .map(|&n| 1.0 / (self.count(n) as f64 + 1.0))
            .collect()
    }
}

/// One generation run. Owns its registry, frequency table and output.
pub struct Generator {
    config: GenerationConfig,
    universe: Vec<u8>,
    seeding_universe: Vec<u8>,
    registry: FingerprintRegistry,
    frequency: FrequencyTable,
    games: Vec<Game>,
    reused: usize,
    evaluated: u64,
    rng: StdRng,
}

impl Generator {
    /// Validates the configuration and resolves the universe. No search happens here.
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let universe = config.resolve_universe(&mut rng);
        if universe.len() < config.draw_size as usize {
            return Err(GenerationError::Infeasible {
                pool: universe.len(),
                draw_size: config.draw_size as usize,
            });
        }
        let seeding_universe = config.seeding_universe(&universe);

        log::debug!(
            "generator ready: {} numbers, {} per game, guarantee {}, target {}",
            universe.len(),
            config.draw_size,
            config.guaranteed,
            config.target
        );

        Ok(Self {
            registry: FingerprintRegistry::new(config.guaranteed as usize),
            frequency: FrequencyTable::new(config.pool_size),
            games: Vec::new(),
            reused: 0,
            evaluated: 0,
            universe,
            seeding_universe,
            config,
            rng,
        })
    }

    /// Universe resolved from the configuration, before any narrowing.
    pub fn universe(&self) -> &[u8] {
        &self.universe
    }

    pub fn run(
        mut self,
        existing: &[Vec<u8>],
        cancel: &CancellationToken,
        progress: &mut dyn ProgressSink,
    ) -> Result<GenerationOutcome, GenerationError> {
        let start = Instant::now();

        if !existing.is_empty() {
            if self.seed(existing, cancel) {
                let pool = self.universe.clone();
                return Ok(self.finish(GenerationStatus::Stopped, pool, start));
            }
            progress.report(&self.event(ProgressDetail::Seeding {
                reused: self.reused,
            }));
        }

        let pool = self.working_pool();

        if self.games.len() >= self.config.target {
            return Ok(self.finish(GenerationStatus::Complete, pool, start));
        }
        let draw_size = self.config.draw_size as usize;
        if pool.len() < draw_size {
            return Err(GenerationError::Infeasible {
                pool: pool.len(),
                draw_size,
            });
        }
        if self.config.guaranteed > 0 && pool.len() < self.config.guaranteed as usize {
            log::warn!(
                "working pool ({}) is smaller than the guaranteed matches ({})",
                pool.len(),
                self.config.guaranteed
            );
        }
        if cancel.is_cancelled() {
            return Ok(self.finish(GenerationStatus::Stopped, pool, start));
        }

        if self.config.mode == GenerationMode::Exhaustive {
            let combinations = binomial(pool.len(), draw_size);
            if combinations > MAX_EXHAUSTIVE_COMBINATIONS {
                return Err(GenerationError::TooManyCombinations {
                    combinations,
                    limit: MAX_EXHAUSTIVE_COMBINATIONS,
                });
            }
        }

        log::info!(
            "generating up to {} new games ({} mode) from {} numbers",
            self.config.target - self.games.len(),
            self.config.mode,
            pool.len()
        );
        let status = match self.config.mode {
            GenerationMode::Exhaustive => self.run_exhaustive(&pool, cancel, progress),
            GenerationMode::Randomized => self.run_randomized(&pool, cancel, progress),
        };
        Ok(self.finish(status, pool, start))
    }

    /// Accepts the existing games that fit. Returns true if cancellation was observed.
    fn seed(&mut self, existing: &[Vec<u8>], cancel: &CancellationToken) -> bool {
        log::info!("checking {} existing games", existing.len());
        for (i, candidate) in existing.iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!("stopped while reusing existing games");
                return true;
            }
            if self.games.len() >= self.config.target {
                break;
            }
            if candidate.len() != self.config.draw_size as usize {
                log::debug!("existing game #{} skipped: {} numbers", i + 1, candidate.len());
                continue;
            }
            let Some(game) = Game::new(candidate.clone()) else {
                log::debug!("existing game #{} skipped: repeated number", i + 1);
                continue;
            };
            if let Some(n) = game
                .numbers()
                .iter()
                .find(|n| self.seeding_universe.binary_search(n).is_err())
            {
                log::debug!("existing game #{} skipped: {} is outside the pool", i + 1, n);
                continue;
            }
            if self.accept(game.numbers()) {
                self.reused += 1;
            } else {
                log::debug!("existing game #{} skipped: guaranteed subset already used", i + 1);
            }
        }
        log::info!("{} existing games reused", self.reused);
        false
    }

    /// Numbers new games are drawn from: the reused games' own numbers, unless pinned.
    fn working_pool(&self) -> Vec<u8> {
        if self.reused == 0 || self.config.keep_universe {
            return self.universe.clone();
        }
        let mut numbers: Vec<u8> = self
            .games
            .iter()
            .flat_map(|g| g.numbers().iter().copied())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        log::info!("pool narrowed to the {} numbers of the reused games", numbers.len());
        numbers
    }

    fn run_exhaustive(
        &mut self,
        pool: &[u8],
        cancel: &CancellationToken,
        progress: &mut dyn ProgressSink,
    ) -> GenerationStatus {
        let draw_size = self.config.draw_size as usize;
        // combination i is candidates[i * draw_size..(i + 1) * draw_size]
        let candidates = k_subsets_flat(pool, draw_size);
        let mut order: Vec<u32> = (0..(candidates.len() / draw_size) as u32).collect();
        order.shuffle(&mut self.rng);

        let total = order.len() as u64;
        let step = (total / 100).max(1);
        log::debug!("{} combinations to test", total);

        let mut tested = 0u64;
        for i in order {
            if cancel.is_cancelled() {
                return GenerationStatus::Stopped;
            }
            if self.games.len() >= self.config.target {
                break;
            }
            tested += 1;
            self.evaluated += 1;
            let start = i as usize * draw_size;
            self.accept(&candidates[start..start + draw_size]);

            if tested % step == 0 || tested == total {
                progress.report(&self.event(ProgressDetail::Exhaustive { tested, total }));
            }
        }

        if self.games.len() >= self.config.target {
            GenerationStatus::Complete
        } else {
            log::warn!(
                "only {} of {} games possible with these constraints",
                self.games.len(),
                self.config.target
            );
            GenerationStatus::Exhausted(ExhaustionCause::CombinationsExhausted)
        }
    }

    fn run_randomized(
        &mut self,
        pool: &[u8],
        cancel: &CancellationToken,
        progress: &mut dyn ProgressSink,
    ) -> GenerationStatus {
        let draw_size = self.config.draw_size as usize;
        let idle_limit = self.config.idle_timeout();
        let mut last_accept = Instant::now();
        let mut attempts = 0u64;

        while self.games.len() < self.config.target {
            if cancel.is_cancelled() {
                return GenerationStatus::Stopped;
            }
            if let Some(limit) = idle_limit {
                if last_accept.elapsed() > limit {
                    log::warn!(
                        "no new game in {:?}, stopping with {} games",
                        limit,
                        self.games.len()
                    );
                    return GenerationStatus::Exhausted(ExhaustionCause::IdleTimeout);
                }
            }
            attempts += 1;
            self.evaluated += 1;

            let weights = self.frequency.weights(pool);
            let mut numbers =
                weighted_sample_without_replacement(pool, &weights, draw_size, &mut self.rng);
            numbers.sort_unstable();

            if self.accept(&numbers) {
                last_accept = Instant::now();
                let accepted = self.games.len();
                if accepted % ACCEPTED_PER_REPORT == 0 || accepted == self.config.target {
                    progress.report(&self.event(ProgressDetail::Randomized { attempts }));
                }
            }
            if attempts % ATTEMPTS_PER_REPORT == 0 {
                progress.report(&self.event(ProgressDetail::Randomized { attempts }));
            }
        }

        GenerationStatus::Complete
    }

    /// `numbers` must be ascending and distinct.
    fn accept(&mut self, numbers: &[u8]) -> bool {
        if !self.registry.try_register(numbers) {
            return false;
        }
        self.frequency.record(numbers);
        self.games.push(Game::from_sorted(numbers.to_vec()));
        true
    }

    fn event(&self, detail: ProgressDetail) -> ProgressEvent {
        ProgressEvent {
            accepted: self.games.len(),
            target: self.config.target,
            mode: self.config.mode,
            detail,
        }
    }

    fn finish(self, status: GenerationStatus, working_pool: Vec<u8>, start: Instant) -> GenerationOutcome {
        log::info!(
            "generation {}: {} games ({} reused) of {} wanted",
            status,
            self.games.len(),
            self.reused,
            self.config.target
        );
        GenerationOutcome {
            reused: self.reused,
            status,
            target: self.config.target,
            working_pool,
            evaluated: self.evaluated,
            elapsed: start.elapsed(),
            games: self.games,
        }
    }
}

/// Builds a generator and runs it.
pub fn generate(
    config: GenerationConfig,
    existing: &[Vec<u8>],
    cancel: &CancellationToken,
    progress: &mut dyn ProgressSink,
) -> Result<GenerationOutcome, GenerationError> {
    Generator::new(config)?.run(existing, cancel, progress)
}
