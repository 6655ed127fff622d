//! Error types shared by the optimizer, the catalog and the output surfaces.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::catalog::ModuleKind;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("slot capacity must be at least 1, got {slots}")]
    InvalidCapacity { slots: u32 },

    #[error("base productivity must be at least 1, got {value}")]
    InvalidBaseProductivity { value: Decimal },

    #[error("unknown {kind} module identifier '{id}'")]
    UnknownModuleIdentifier { id: String, kind: ModuleKind },

    #[error("no {kind} module candidates supplied")]
    EmptyCandidateSet { kind: ModuleKind },

    #[error("tier {tier} has no convergent split for {slots} slot(s); divisors by quality count: {divisors:?}")]
    InfeasibleConfiguration {
        tier: u8,
        slots: u32,
        divisors: Vec<Decimal>,
    },

    #[error("decimal overflow at tier {tier} during {operation}")]
    PrecisionLoss { tier: u8, operation: &'static str },

    #[error("invalid run configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ChainResult<T> = Result<T, ChainError>;
