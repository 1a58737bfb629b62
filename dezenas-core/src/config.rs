use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Variant;

/// Upper bound on the number of games a single run may be asked for.
pub const MAX_TARGET: usize = 10_000_000;

/// Where the numbers of new games come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Universe {
    /// `count` numbers picked at random from 1..=pool_size when the run starts.
    Random { count: u8 },
    /// Numbers chosen by the user.
    Fixed(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Visit every combination of the working pool once, in shuffled order.
    #[default]
    Exhaustive,
    /// Draw candidates with inverse-frequency weights until the target or the idle budget.
    Randomized,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Exhaustive => write!(f, "exhaustive"),
            GenerationMode::Randomized => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Balls in the drum.
    pub pool_size: u8,
    pub universe: Universe,
    /// Numbers per game.
    pub draw_size: u8,
    /// Size of the subsets no two accepted games may share. 0 disables the rule.
    pub guaranteed: u8,
    /// Games wanted, existing ones included.
    pub target: usize,
    pub mode: GenerationMode,
    /// Randomized mode stops after this long without a new game. 0 means no limit.
    pub idle_timeout_secs: u64,
    /// Never narrow the pool to the numbers of reused games.
    pub keep_universe: bool,
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn preset(variant: Variant) -> Self {
        Self {
            pool_size: variant.pool_size(),
            universe: Universe::Random {
                count: variant.pool_size(),
            },
            draw_size: variant.draw_size(),
            guaranteed: variant.default_guaranteed(),
            target: 100,
            mode: GenerationMode::Exhaustive,
            idle_timeout_secs: 30,
            keep_universe: false,
            seed: None,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// Number of numbers new games will be drawn from.
    pub fn universe_size(&self) -> usize {
        match &self.universe {
            Universe::Random { count } => *count as usize,
            Universe::Fixed(numbers) => numbers.len(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::EmptyPool);
        }
        if self.draw_size == 0 {
            return Err(ConfigError::EmptyGame);
        }
        if self.pool_size < self.draw_size {
            return Err(ConfigError::PoolSmallerThanGame {
                pool_size: self.pool_size,
                draw_size: self.draw_size,
            });
        }

        match &self.universe {
            Universe::Random { count } => {
                if *count < self.draw_size || *count > self.pool_size {
                    return Err(ConfigError::RandomUniverseOutOfRange {
                        count: *count,
                        draw_size: self.draw_size,
                        pool_size: self.pool_size,
                    });
                }
            }
            Universe::Fixed(numbers) => {
                if numbers.is_empty() {
                    return Err(ConfigError::EmptyFixedUniverse);
                }
                if let Some(&number) = numbers.iter().find(|&&n| n == 0 || n > self.pool_size) {
                    return Err(ConfigError::NumberOutOfRange {
                        number,
                        pool_size: self.pool_size,
                    });
                }
                let mut sorted = numbers.clone();
                sorted.sort_unstable();
                if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
                    return Err(ConfigError::DuplicateNumber(w[0]));
                }
                if numbers.len() < self.draw_size as usize {
                    return Err(ConfigError::FixedUniverseTooSmall {
                        count: numbers.len(),
                        draw_size: self.draw_size,
                    });
                }
            }
        }

        if self.guaranteed > self.draw_size {
            return Err(ConfigError::GuaranteeAboveGameSize {
                guaranteed: self.guaranteed,
                draw_size: self.draw_size,
            });
        }
        if self.guaranteed as usize > self.universe_size() {
            return Err(ConfigError::GuaranteeAboveUniverse {
                guaranteed: self.guaranteed,
                universe: self.universe_size(),
            });
        }

        if self.target == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        if self.target > MAX_TARGET {
            return Err(ConfigError::TargetTooLarge {
                target: self.target,
                limit: MAX_TARGET,
            });
        }

        Ok(())
    }

    /// Concrete, ascending list of numbers for new games. Call after [`validate`](Self::validate).
    pub fn resolve_universe<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let mut numbers = match &self.universe {
            Universe::Random { count } => {
                let mut all: Vec<u8> = (1..=self.pool_size).collect();
                all.shuffle(rng);
                all.truncate(*count as usize);
                all
            }
            Universe::Fixed(numbers) => numbers.clone(),
        };
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    /// Numbers reused games may contain. With a random universe any ball of the drum is accepted,
    /// since the random pick says nothing about the user's own games.
    pub fn seeding_universe(&self, resolved: &[u8]) -> Vec<u8> {
        match &self.universe {
            Universe::Random { .. } => (1..=self.pool_size).collect(),
            Universe::Fixed(_) => resolved.to_vec(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::preset(Variant::Quina)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fixed(numbers: &[u8]) -> GenerationConfig {
        GenerationConfig {
            pool_size: 10,
            universe: Universe::Fixed(numbers.to_vec()),
            draw_size: 3,
            guaranteed: 2,
            target: 5,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_presets_are_valid() {
        for variant in Variant::ALL {
            let config = GenerationConfig::preset(variant);
            assert!(config.validate().is_ok(), "{:?}", variant);
            assert_eq!(config.draw_size, variant.draw_size());
        }
    }

    #[test]
    fn test_default_is_quina() {
        let config = GenerationConfig::default();
        assert_eq!(config.pool_size, 80);
        assert_eq!(config.draw_size, 5);
        assert_eq!(config.guaranteed, 3);
        assert_eq!(config.target, 100);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_pool_and_game_size() {
        let mut config = fixed(&[1, 2, 3]);
        config.pool_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyPool));

        let mut config = fixed(&[1, 2, 3]);
        config.draw_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyGame));

        let mut config = fixed(&[1, 2, 3]);
        config.pool_size = 2;
        assert!(matches!(config.validate(), Err(ConfigError::PoolSmallerThanGame { .. })));
    }

    #[test]
    fn test_random_universe_bounds() {
        let mut config = GenerationConfig::preset(Variant::Quina);
        config.universe = Universe::Random { count: 4 };
        assert!(matches!(config.validate(), Err(ConfigError::RandomUniverseOutOfRange { .. })));
        config.universe = Universe::Random { count: 81 };
        assert!(matches!(config.validate(), Err(ConfigError::RandomUniverseOutOfRange { .. })));
        config.universe = Universe::Random { count: 5 };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_universe_checks() {
        assert!(fixed(&[1, 2, 3, 4]).validate().is_ok());
        assert_eq!(fixed(&[]).validate(), Err(ConfigError::EmptyFixedUniverse));
        assert_eq!(fixed(&[1, 2, 2, 4]).validate(), Err(ConfigError::DuplicateNumber(2)));
        assert_eq!(
            fixed(&[1, 2, 11]).validate(),
            Err(ConfigError::NumberOutOfRange { number: 11, pool_size: 10 })
        );
        assert_eq!(
            fixed(&[0, 2, 3]).validate(),
            Err(ConfigError::NumberOutOfRange { number: 0, pool_size: 10 })
        );
        assert_eq!(
            fixed(&[1, 2]).validate(),
            Err(ConfigError::FixedUniverseTooSmall { count: 2, draw_size: 3 })
        );
    }

    #[test]
    fn test_guarantee_bounds() {
        let mut config = fixed(&[1, 2, 3, 4]);
        config.guaranteed = 4;
        assert!(matches!(config.validate(), Err(ConfigError::GuaranteeAboveGameSize { .. })));
        config.guaranteed = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_target_bounds() {
        let mut config = fixed(&[1, 2, 3, 4]);
        config.target = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTarget));
        config.target = MAX_TARGET + 1;
        assert!(matches!(config.validate(), Err(ConfigError::TargetTooLarge { .. })));
        config.target = MAX_TARGET;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_resolve_random_universe() {
        let mut config = GenerationConfig::preset(Variant::MegaSena);
        config.universe = Universe::Random { count: 12 };
        let mut rng = StdRng::seed_from_u64(5);
        let numbers = config.resolve_universe(&mut rng);
        assert_eq!(numbers.len(), 12);
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert!(numbers.iter().all(|&n| (1..=60).contains(&n)));
    }

    #[test]
    fn test_resolve_fixed_universe_sorted() {
        let config = fixed(&[9, 2, 5, 1]);
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(config.resolve_universe(&mut rng), vec![1, 2, 5, 9]);
    }

    #[test]
    fn test_seeding_universe() {
        let config = fixed(&[9, 2, 5, 1]);
        assert_eq!(config.seeding_universe(&[1, 2, 5, 9]), vec![1, 2, 5, 9]);

        let mut config = GenerationConfig::preset(Variant::Lotofacil);
        config.universe = Universe::Random { count: 18 };
        assert_eq!(config.seeding_universe(&[1, 2, 3]).len(), 25);
    }

    #[test]
    fn test_config_json() {
        let config = fixed(&[1, 2, 3, 4]);
        let json = serde_json::to_string(&config).unwrap();
        let restored: GenerationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
