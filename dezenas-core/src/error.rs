use thiserror::Error;

/// Invalid generation parameters, detected before any generator is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("pool size must be positive")]
    EmptyPool,

    #[error("numbers per game must be positive")]
    EmptyGame,

    #[error("pool size ({pool_size}) must be at least the numbers per game ({draw_size})")]
    PoolSmallerThanGame { pool_size: u8, draw_size: u8 },

    #[error("random universe size ({count}) must be between {draw_size} and {pool_size}")]
    RandomUniverseOutOfRange { count: u8, draw_size: u8, pool_size: u8 },

    #[error("fixed universe is empty: provide the numbers to play")]
    EmptyFixedUniverse,

    #[error("fixed universe has {count} numbers, fewer than the numbers per game ({draw_size})")]
    FixedUniverseTooSmall { count: usize, draw_size: u8 },

    #[error("fixed universe contains duplicated number {0}")]
    DuplicateNumber(u8),

    #[error("number {number} is outside 1..={pool_size}")]
    NumberOutOfRange { number: u8, pool_size: u8 },

    #[error("guaranteed matches ({guaranteed}) cannot exceed the numbers per game ({draw_size})")]
    GuaranteeAboveGameSize { guaranteed: u8, draw_size: u8 },

    #[error("guaranteed matches ({guaranteed}) cannot exceed the universe size ({universe})")]
    GuaranteeAboveUniverse { guaranteed: u8, universe: usize },

    #[error("number of games to generate must be positive")]
    ZeroTarget,

    #[error("number of games ({target}) exceeds the practical limit of {limit}")]
    TargetTooLarge { target: usize, limit: usize },
}

/// Fatal generation failures. Partial results are reported through
/// [`crate::generator::GenerationStatus`], not through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("working pool has {pool} numbers, fewer than the {draw_size} needed for a single game")]
    Infeasible { pool: usize, draw_size: usize },

    #[error("exhaustive mode would enumerate {combinations} combinations, above the limit of {limit}; use randomized mode or a smaller universe")]
    TooManyCombinations { combinations: u64, limit: u64 },
}

/// Fatal analysis input failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("no valid user games to analyze")]
    NoUserGames,

    #[error("no user game left after expansion: every row has fewer than {draw_size} numbers")]
    NothingToExpand { draw_size: usize },

    #[error("user game #{index} has {found} numbers, expected {expected}")]
    GameSize { index: usize, expected: usize, found: usize },

    #[error("no historical draws to analyze")]
    NoDraws,

    #[error("historical draw #{index} has {found} numbers, expected {expected}")]
    DrawSize { index: usize, expected: usize, found: usize },

    #[error("historical draw #{index} repeats number {number}")]
    DuplicateInDraw { index: usize, number: u8 },

    #[error("number {number} is outside 1..={pool_size}")]
    NumberOutOfRange { number: u8, pool_size: u8 },

    #[error("invalid prize table: {0}")]
    InvalidPrizes(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_constraint() {
        let err = ConfigError::PoolSmallerThanGame { pool_size: 4, draw_size: 5 };
        let msg = err.to_string();
        assert!(msg.contains("pool size (4)"), "{msg}");
        assert!(msg.contains("(5)"), "{msg}");
    }

    #[test]
    fn test_generation_error_wraps_config() {
        let err: GenerationError = ConfigError::ZeroTarget.into();
        assert_eq!(err.to_string(), "number of games to generate must be positive");
    }

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::DrawSize { index: 3, expected: 5, found: 4 };
        assert_eq!(err.to_string(), "historical draw #3 has 4 numbers, expected 5");
    }
}
