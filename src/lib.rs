// Market-Basket Association Engine - Core Library
// Exposes all modules for use in the CLI and tests

pub mod apriori;
pub mod basket;
pub mod config;
pub mod csv_input;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use apriori::{mine, FrequentItemsets, Itemset, LevelCount};
pub use basket::{Basket, BasketMatrix};
pub use config::EngineConfig;
pub use csv_input::{load_csv, read_csv, RawRow};
pub use error::EngineError;
pub use normalizer::{normalize, MalformedRow, NormalizedBatch, TransactionRecord};
pub use pipeline::run_analysis;
pub use ranking::{rank, RankedRule, StrengthCategory};
pub use report::{
    AnalysisReport, DateCount, Diagnostics, ItemFrequency, ProductRevenue,
};
pub use rules::{generate, Rule};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
