//! Historical analysis: how a set of user games would have done against past draws.

pub mod repetition;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::combinatorics::k_subsets;
use crate::error::AnalysisError;
use crate::models::{Game, HistoricalDraw, PrizeTable, Tier, Variant};

pub use repetition::{RepeatedSubset, RepetitionSummary, analyze_repetition};

/// Cost-ratio buckets: ten 10% bins plus one for 100% and above.
pub const COST_RATIO_BUCKETS: usize = 11;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Keep the repeated subsets themselves, not only their count.
    pub list_repeated: bool,
}

/// Prize-tier hits of the user games in a single past draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawBreakdown {
    pub index: usize,
    pub numbers: Vec<u8>,
    /// Hits per tier, in the variant's tier order.
    pub hits: Vec<u32>,
    pub prize: f64,
    pub prize_excluding_top: f64,
}

impl DrawBreakdown {
    pub fn total_hits(&self) -> u32 {
        self.hits.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSummary {
    pub tier: Tier,
    pub prize: f64,
    pub total_hits: u64,
    pub min_hits: u32,
    pub max_hits: u32,
    pub draws_without_hits: usize,
    /// Hits in a draw -> number of draws with exactly that many, zero included.
    pub hit_frequency: BTreeMap<u32, usize>,
}

impl TierSummary {
    fn new(tier: Tier, prize: f64) -> Self {
        Self {
            tier,
            prize,
            total_hits: 0,
            min_hits: u32::MAX,
            max_hits: 0,
            draws_without_hits: 0,
            hit_frequency: BTreeMap::new(),
        }
    }

    fn record(&mut self, hits: u32) {
        self.total_hits += hits as u64;
        self.min_hits = self.min_hits.min(hits);
        self.max_hits = self.max_hits.max(hits);
        if hits == 0 {
            self.draws_without_hits += 1;
        }
        *self.hit_frequency.entry(hits).or_insert(0) += 1;
    }

    pub fn mean_hits(&self, draws: usize) -> f64 {
        if draws == 0 {
            0.0
        } else {
            self.total_hits as f64 / draws as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRatioBucket {
    /// Lower bound as a fraction of the cost per draw.
    pub lower: f64,
    /// `None` for the open-ended last bucket.
    pub upper: Option<f64>,
    pub draws: usize,
    pub share: f64,
}

impl CostRatioBucket {
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{:.0}% - {:.0}%", self.lower * 100.0, upper * 100.0),
            None => format!(">= {:.0}%", self.lower * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub variant: Variant,
    pub user_games: usize,
    pub numbers_used: Vec<u8>,
    pub draws: usize,
    pub bet_cost: f64,
    pub tiers: Vec<TierSummary>,
    pub breakdown: Vec<DrawBreakdown>,
    pub total_prize: f64,
    pub total_prize_excluding_top: f64,
    pub mean_prize: f64,
    pub mean_prize_excluding_top: f64,
    pub cost_per_draw: f64,
    pub roi: f64,
    pub roi_excluding_top: f64,
    pub cost_ratio: Vec<CostRatioBucket>,
    pub repetition: Vec<RepetitionSummary>,
}

/// Turns raw user rows into simple bets of exactly `draw_size` numbers.
///
/// Rows longer than a bet are expanded into every combination of `draw_size` of their numbers.
/// Shorter rows are skipped. Repeated numbers within a row count once.
pub fn expand_user_games(rows: &[Vec<u8>], variant: Variant) -> Result<Vec<Game>, AnalysisError> {
    if rows.is_empty() {
        return Err(AnalysisError::NoUserGames);
    }
    let k = variant.draw_size() as usize;
    let pool_size = variant.pool_size();

    let mut games = Vec::new();
    let mut skipped = 0usize;
    let mut expanded = 0usize;
    for row in rows {
        let mut numbers = row.clone();
        numbers.sort_unstable();
        numbers.dedup();
        if let Some(&number) = numbers.iter().find(|&&n| n == 0 || n > pool_size) {
            return Err(AnalysisError::NumberOutOfRange { number, pool_size });
        }

        match numbers.len().cmp(&k) {
            std::cmp::Ordering::Less => skipped += 1,
            std::cmp::Ordering::Equal => games.push(Game::from_sorted(numbers)),
            std::cmp::Ordering::Greater => {
                expanded += 1;
                games.extend(k_subsets(&numbers, k).into_iter().map(Game::from_sorted));
            }
        }
    }

    if skipped > 0 {
        log::warn!("{} rows with fewer than {} numbers ignored", skipped, k);
    }
    if expanded > 0 {
        log::info!("{} rows expanded into simple bets ({} bets total)", expanded, games.len());
    }
    if games.is_empty() {
        return Err(AnalysisError::NothingToExpand { draw_size: k });
    }
    Ok(games)
}

fn validate_games(games: &[Game], variant: Variant) -> Result<(), AnalysisError> {
    if games.is_empty() {
        return Err(AnalysisError::NoUserGames);
    }
    let k = variant.draw_size() as usize;
    let pool_size = variant.pool_size();
    for (i, game) in games.iter().enumerate() {
        if game.len() != k {
            return Err(AnalysisError::GameSize {
                index: i + 1,
                expected: k,
                found: game.len(),
            });
        }
        if let Some(&number) = game.numbers().iter().find(|&&n| n == 0 || n > pool_size) {
            return Err(AnalysisError::NumberOutOfRange { number, pool_size });
        }
    }
    Ok(())
}

fn validate_draws(draws: &[HistoricalDraw], variant: Variant) -> Result<(), AnalysisError> {
    if draws.is_empty() {
        return Err(AnalysisError::NoDraws);
    }
    let k = variant.draw_size() as usize;
    let pool_size = variant.pool_size();
    for draw in draws {
        if draw.numbers.len() != k {
            return Err(AnalysisError::DrawSize {
                index: draw.index,
                expected: k,
                found: draw.numbers.len(),
            });
        }
        if let Some(&number) = draw.numbers.iter().find(|&&n| n == 0 || n > pool_size) {
            return Err(AnalysisError::NumberOutOfRange { number, pool_size });
        }
        let mut sorted = draw.numbers.clone();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(AnalysisError::DuplicateInDraw {
                index: draw.index,
                number: w[0],
            });
        }
    }
    Ok(())
}

/// Bucket of a draw's prize relative to the cost per draw. Zero cost puts everything in the first bucket.
fn cost_ratio_bucket(prize: f64, cost_per_draw: f64) -> usize {
    if cost_per_draw <= 0.0 {
        return 0;
    }
    let tenths = (prize * 10.0 / cost_per_draw).floor();
    if tenths <= 0.0 {
        0
    } else {
        (tenths as usize).min(COST_RATIO_BUCKETS - 1)
    }
}

fn cost_ratio_histogram(breakdown: &[DrawBreakdown], cost_per_draw: f64) -> Vec<CostRatioBucket> {
    let mut counts = [0usize; COST_RATIO_BUCKETS];
    for draw in breakdown {
        counts[cost_ratio_bucket(draw.prize, cost_per_draw)] += 1;
    }
    let total = breakdown.len().max(1) as f64;
    counts
        .iter()
        .enumerate()
        .map(|(i, &draws)| CostRatioBucket {
            lower: i as f64 / 10.0,
            upper: (i + 1 < COST_RATIO_BUCKETS).then(|| (i + 1) as f64 / 10.0),
            draws,
            share: draws as f64 / total,
        })
        .collect()
}

/// Runs every user game against every past draw.
pub fn analyze(
    games: &[Game],
    draws: &[HistoricalDraw],
    variant: Variant,
    prizes: &PrizeTable,
    options: AnalysisOptions,
) -> Result<AnalysisReport, AnalysisError> {
    validate_games(games, variant)?;
    validate_draws(draws, variant)?;
    prizes.validate()?;

    let tiers = variant.tiers();
    log::info!(
        "analyzing {} games against {} {} draws",
        games.len(),
        draws.len(),
        variant
    );

    let mut summaries: Vec<TierSummary> = tiers
        .iter()
        .map(|t| TierSummary::new(*t, prizes.value_for(t.matches)))
        .collect();
    let mut breakdown = Vec::with_capacity(draws.len());
    let mut total_prize = 0.0;
    let mut total_prize_excluding_top = 0.0;

    for draw in draws {
        let mut drawn = [false; 256];
        for &n in &draw.numbers {
            drawn[n as usize] = true;
        }

        let mut hits = vec![0u32; tiers.len()];
        for game in games {
            let matches = game.numbers().iter().filter(|&&n| drawn[n as usize]).count();
            if let Some(idx) = variant.tier_index(matches) {
                hits[idx] += 1;
            }
        }

        let mut prize = 0.0;
        let mut prize_excluding_top = 0.0;
        for (idx, summary) in summaries.iter_mut().enumerate() {
            let value = hits[idx] as f64 * summary.prize;
            prize += value;
            if !variant.is_jackpot(&summary.tier) {
                prize_excluding_top += value;
            }
            summary.record(hits[idx]);
        }

        total_prize += prize;
        total_prize_excluding_top += prize_excluding_top;
        breakdown.push(DrawBreakdown {
            index: draw.index,
            numbers: draw.numbers.clone(),
            hits,
            prize,
            prize_excluding_top,
        });
    }

    let n_draws = draws.len() as f64;
    let mean_prize = total_prize / n_draws;
    let mean_prize_excluding_top = total_prize_excluding_top / n_draws;
    let cost_per_draw = games.len() as f64 * prizes.bet_cost;
    let (roi, roi_excluding_top) = if cost_per_draw > 0.0 {
        (mean_prize / cost_per_draw, mean_prize_excluding_top / cost_per_draw)
    } else {
        (0.0, 0.0)
    };

    let numbers_used: Vec<u8> = games
        .iter()
        .flat_map(|g| g.numbers().iter().copied())
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .collect();

    let cost_ratio = cost_ratio_histogram(&breakdown, cost_per_draw);
    let repetition = analyze_repetition(games, variant, options.list_repeated);

    log::info!("mean prize per draw {:.2}, ROI {:.4}", mean_prize, roi);

    Ok(AnalysisReport {
        variant,
        user_games: games.len(),
        numbers_used,
        draws: draws.len(),
        bet_cost: prizes.bet_cost,
        tiers: summaries,
        breakdown,
        total_prize,
        total_prize_excluding_top,
        mean_prize,
        mean_prize_excluding_top,
        cost_per_draw,
        roi,
        roi_excluding_top,
        cost_ratio,
        repetition,
    })
}
