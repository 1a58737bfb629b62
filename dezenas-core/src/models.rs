use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, ConfigError};

/// One bet: distinct numbers, always kept in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Game(Vec<u8>);

impl Game {
    /// Sorts the numbers. Returns `None` if a number is repeated.
    pub fn new(numbers: Vec<u8>) -> Option<Self> {
        Self::try_from(numbers).ok()
    }

    /// Caller guarantees ascending, distinct numbers.
    pub(crate) fn from_sorted(numbers: Vec<u8>) -> Self {
        debug_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        Self(numbers)
    }

    pub fn numbers(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.0.binary_search(&number).is_ok()
    }
}

impl TryFrom<Vec<u8>> for Game {
    type Error = ConfigError;

    fn try_from(mut numbers: Vec<u8>) -> Result<Self, Self::Error> {
        numbers.sort_unstable();
        if let Some(w) = numbers.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigError::DuplicateNumber(w[0]));
        }
        Ok(Self(numbers))
    }
}

impl From<Game> for Vec<u8> {
    fn from(game: Game) -> Self {
        game.0
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(" - ");
        f.write_str(&joined)
    }
}

/// A past draw, numbered by its order of appearance in the source (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalDraw {
    pub index: usize,
    pub numbers: Vec<u8>,
}

impl HistoricalDraw {
    pub fn new(index: usize, mut numbers: Vec<u8>) -> Self {
        numbers.sort_unstable();
        Self { index, numbers }
    }
}

/// A prize tier: exact number of matches and its traditional name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub matches: u8,
    pub name: &'static str,
}

const QUINA_TIERS: [Tier; 4] = [
    Tier { matches: 2, name: "duque" },
    Tier { matches: 3, name: "terno" },
    Tier { matches: 4, name: "quadra" },
    Tier { matches: 5, name: "quina" },
];

const MEGA_SENA_TIERS: [Tier; 3] = [
    Tier { matches: 4, name: "quadra" },
    Tier { matches: 5, name: "quina" },
    Tier { matches: 6, name: "sena" },
];

const LOTOFACIL_TIERS: [Tier; 5] = [
    Tier { matches: 11, name: "onze" },
    Tier { matches: 12, name: "doze" },
    Tier { matches: 13, name: "treze" },
    Tier { matches: 14, name: "quatorze" },
    Tier { matches: 15, name: "quinze" },
];

/// Draw-size profile. Selected once and passed everywhere tier logic is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Quina,
    MegaSena,
    Lotofacil,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Quina, Variant::MegaSena, Variant::Lotofacil];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Quina => "Quina",
            Variant::MegaSena => "MegaSena",
            Variant::Lotofacil => "Lotofacil",
        }
    }

    pub fn pool_size(&self) -> u8 {
        match self {
            Variant::Quina => 80,
            Variant::MegaSena => 60,
            Variant::Lotofacil => 25,
        }
    }

    pub fn draw_size(&self) -> u8 {
        match self {
            Variant::Quina => 5,
            Variant::MegaSena => 6,
            Variant::Lotofacil => 15,
        }
    }

    pub fn default_guaranteed(&self) -> u8 {
        match self {
            Variant::Quina => 3,
            Variant::MegaSena => 4,
            Variant::Lotofacil => 11,
        }
    }

    /// Prize tiers in ascending order of matches.
    pub fn tiers(&self) -> &'static [Tier] {
        match self {
            Variant::Quina => &QUINA_TIERS,
            Variant::MegaSena => &MEGA_SENA_TIERS,
            Variant::Lotofacil => &LOTOFACIL_TIERS,
        }
    }

    /// Tiers left out of the "excluding top tier" prize sums.
    pub fn jackpot_tiers(&self) -> &'static [u8] {
        match self {
            Variant::Quina => &[5],
            Variant::MegaSena => &[6],
            Variant::Lotofacil => &[15],
        }
    }

    /// Subset sizes checked for repetition among the user's own games.
    /// Mega-Sena also looks at ternos even though they pay nothing.
    pub fn repetition_sizes(&self) -> RangeInclusive<usize> {
        match self {
            Variant::Quina => 2..=5,
            Variant::MegaSena => 3..=6,
            Variant::Lotofacil => 11..=15,
        }
    }

    pub fn tier_index(&self, matches: usize) -> Option<usize> {
        self.tiers().iter().position(|t| t.matches as usize == matches)
    }

    pub fn is_jackpot(&self, tier: &Tier) -> bool {
        self.jackpot_tiers().contains(&tier.matches)
    }

    pub fn from_draw_size(draw_size: u8) -> Option<Variant> {
        Variant::ALL.into_iter().find(|v| v.draw_size() == draw_size)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quina" => Ok(Variant::Quina),
            "megasena" | "mega-sena" | "mega" => Ok(Variant::MegaSena),
            "lotofacil" | "lotofácil" => Ok(Variant::Lotofacil),
            other => Err(format!(
                "unknown game '{}' (expected quina, megasena or lotofacil)",
                other
            )),
        }
    }
}

/// Name of a group of `size` numbers.
pub fn group_name(size: usize) -> &'static str {
    match size {
        2 => "duque",
        3 => "terno",
        4 => "quadra",
        5 => "quina",
        6 => "sena",
        11 => "onze",
        12 => "doze",
        13 => "treze",
        14 => "quatorze",
        15 => "quinze",
        _ => "grupo",
    }
}

/// Value paid per winning bet in each tier, keyed by number of matches, plus the cost of one bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub prizes: BTreeMap<u8, f64>,
    pub bet_cost: f64,
}

impl PrizeTable {
    /// Approximate market values. Real prizes vary from draw to draw.
    pub fn defaults(variant: Variant) -> Self {
        let (prizes, bet_cost): (&[(u8, f64)], f64) = match variant {
            Variant::Quina => (
                &[(2, 6.0), (3, 120.0), (4, 7_000.0), (5, 230_000_000.0)],
                3.125,
            ),
            Variant::MegaSena => (&[(4, 1_000.0), (5, 80_000.0), (6, 500_000_000.0)], 6.25),
            Variant::Lotofacil => (
                &[(11, 7.0), (12, 14.0), (13, 35.0), (14, 2_000.0), (15, 1_000_000.0)],
                3.50,
            ),
        };
        Self {
            prizes: prizes.iter().copied().collect(),
            bet_cost,
        }
    }

    pub fn value_for(&self, matches: u8) -> f64 {
        self.prizes.get(&matches).copied().unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.bet_cost.is_finite() || self.bet_cost < 0.0 {
            return Err(AnalysisError::InvalidPrizes(format!(
                "bet cost {} must be a non-negative number",
                self.bet_cost
            )));
        }
        for (&matches, &value) in &self.prizes {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidPrizes(format!(
                    "prize for {} matches ({}) must be a non-negative number",
                    matches, value
                )));
            }
        }
        Ok(())
    }
}
