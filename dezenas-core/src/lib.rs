pub mod analysis;
pub mod combinatorics;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod sampler;

pub use config::{GenerationConfig, GenerationMode, Universe};
pub use error::{AnalysisError, ConfigError, GenerationError};
pub use generator::{CancellationToken, GenerationOutcome, GenerationStatus, Generator, generate};
pub use models::{Game, HistoricalDraw, PrizeTable, Variant};
