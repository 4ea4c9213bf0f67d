#![forbid(unsafe_code)]

//! Core domain model and business logic for the BMI tracker.
//!
//! This crate provides:
//! - Domain types (inputs, categories, result records)
//! - The calculation and classification engine
//! - Input validation and display scale helpers
//! - Persistence (key-value slots, calculation history)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod engine;
pub mod validation;
pub mod scale;
pub mod storage;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::{calculate, classify};
pub use validation::{parse_measurement, validate_input};
pub use scale::{scale_bands, scale_position, ScaleBand};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use history::{dedup_by_timestamp, newest_first, HistoryStore, HISTORY_KEY};
