//! # Scout Agent
//!
//! An esports scouting report generator with AI-assisted querying.
//!
//! ## Architecture
//!
//! - **models**: Typed profile sections (overview, players, weaknesses, etc.)
//! - **storage**: Read-only SQLite access with a guarded free-form query path
//! - **analytics**: SQL-backed aggregation into profile sections
//! - **agents**: AI backends, NL-to-SQL translation, result interpretation
//! - **report**: Markdown scouting reports, AI-written with a deterministic fallback
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod agents;
pub mod analytics;
pub mod api;
pub mod config;
pub mod models;
pub mod report;
pub mod storage;

pub use models::*;
