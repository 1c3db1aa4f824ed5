pub mod category;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod formulas;
pub mod temporal;
pub mod tier;
pub mod validation;

pub use category::{CategoryScore, ParameterScore};
pub use config::*;
pub use dedup::{deduplicate, Deduplicated, Substitution};
pub use engine::{score_supply, FinalResult, ResultMetadata};
pub use formulas::{evaluate, Evaluation};
pub use temporal::{resolve, strategy_for, ResolvedValue, StrategyKind};
pub use tier::{QualityTier, ReliabilityLevel};
pub use validation::validate_scoring;
