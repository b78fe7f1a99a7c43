//! Production accounting engine.
//!
//! Derives and persists feed-batch cost breakdowns from ingredient purchases
//! and aggregates daily egg/feed logs across houses.
//!
//! The pure parts ([`IngredientLine::validate`], [`compute_batch`],
//! [`summarize_day`]) do no I/O. [`Engine`] wraps them with the database:
//! batch persistence with atomic create/replace and the reporting views.

pub use commands::NewBatchCmd;
pub use costing::{compute_batch, compute_batch_from_inputs};
pub use daily_logs::DailyLog;
pub use error::EngineError;
pub use feed_batches::{DEFAULT_BAG_SIZE_KG, FeedBatch};
pub use houses::House;
pub use ingredients::{IngredientInput, IngredientLine, validate_lines};
pub use ops::{
    BatchCosts, BatchListFilter, BatchReport, Engine, EngineBuilder, IngredientReport,
    MAX_PERIOD_DAYS,
};
pub use roles::Role;
pub use summary::{DailySummary, HouseProduction, PeriodSummary, summarize_day, summarize_period};

mod commands;
mod costing;
mod daily_logs;
mod error;
mod feed_batches;
mod houses;
mod ingredients;
mod ops;
mod roles;
mod summary;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
