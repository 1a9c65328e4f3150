//! Trait definitions for ETF2L operations.
//!
//! Each entity type implements the traits it supports, encapsulating
//! path and envelope differences in the implementations.

mod get;
mod list;

pub use get::Get;
pub use list::List;
