//! Shared type definitions for the MOV artist valuation engine.
//!
//! This crate is the single source of truth for the data that crosses
//! crate boundaries: the event categories, the event records handed in by
//! the collecting collaborators, and the monthly aggregate records handed
//! back for persistence and charting. Output types flow downstream to
//! `TypeScript` via `ts-rs` for the valuation dashboard.
//!
//! # Modules
//!
//! - [`enums`] -- Event categories and their grouping into aggregates
//! - [`ids`] -- Type-safe run identifier
//! - [`structs`] -- Normalized events, trend points, aggregate records
//! - [`input`] -- Raw, unvalidated input documents as collaborators send them

pub mod enums;
pub mod ids;
pub mod input;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AggregateGroup, Category};
pub use ids::RunId;
pub use input::{RawEvent, RawTrendPoint, ValuationInput};
pub use structs::{AggregateRecord, Event, TrendPoint};
