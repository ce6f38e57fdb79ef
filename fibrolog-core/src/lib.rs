//! # fibrolog-core
//!
//! Core library for fibrolog - fibromyalgia symptom log analytics.
//!
//! This library provides:
//! - Domain types for symptom log entries
//! - The analytics engine (diagnostic scores, rankings, trends, flares,
//!   intervention effectiveness)
//! - Entry loading from JSON / JSONL exports
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use fibrolog_core::{compute_analytics, ingest, Config};
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//! let loaded = ingest::load_entries(Path::new("entries.jsonl")).expect("failed to load entries");
//!
//! let analytics = compute_analytics(&loaded.entries);
//! println!("WPI {} / SSS {}", analytics.wpi_score, analytics.sss_score);
//! # let _ = config;
//! ```

// Re-export commonly used items at the crate root
pub use analytics::{compute_analytics, Analytics, AnalyticsEngine};
pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{load_entries, load_entries_glob, LoadResult};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
