//! ETF2L API client library.
//!
//! A Rust library for reading the public ETF2L league API using a
//! trait-based architecture where each operation (Get, List) is defined
//! as a trait that entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use etf2l::{BanQuery, Ban, CancellationToken, Etf2lClient, Get, List, Player};
//!
//! #[tokio::main]
//! async fn main() -> etf2l::Result<()> {
//!     // Create client from environment variables
//!     let client = Etf2lClient::from_env()?;
//!     let cancel = CancellationToken::new();
//!
//!     // Look a player up by SteamID
//!     let player = Player::get(&client, &cancel, "76561197970669109".to_string()).await?;
//!     println!("Player: {}", player.name);
//!
//!     // Walk the whole ban list
//!     let query = BanQuery { recursive: true, ..Default::default() };
//!     let bans = Ban::list(&client, &cancel, &query).await?;
//!     println!("Found {} bans", bans.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized around two core traits:
//!
//! - [`Get`] - Fetch a single entity by ID
//! - [`List`] - Fetch paginated collections of entities
//!
//! Every request passes through one [`Etf2lClient`], which serializes
//! calls and draws from a shared token bucket before touching the
//! network. Listing follows the API's `next_page_url` cursor when the
//! query is recursive, skipping pages the server fails to render.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `ETF2L_API_URL` (optional) - Base URL (defaults to `https://api-v2.etf2l.org`)
//! - `ETF2L_RATE_LIMIT` (optional) - `requests/seconds`, or `off`
//! - `ETF2L_PAGE_DELAY_MS` (optional) - Pause between pages
//! - `ETF2L_MAX_PAGE_SKIPS` (optional) - Consecutive failing pages to skip

pub mod cli;
mod client;
mod error;
mod models;
pub mod output;
mod pagination;
mod rate_limit;
mod traits;

// Re-export core types
pub use client::{
    ClientConfig, ClientConfigBuilder, Etf2lClient, DEFAULT_API_URL, DEFAULT_MAX_PAGE_SKIPS,
    DEFAULT_PAGE_DELAY,
};
pub use error::{Etf2lError, Result};
pub use output::PrettyPrint;
pub use pagination::{
    relative_path, skip_page, LinkedPage, NextPage, Page, PageInfo, PageLinks, PageMeta, Paged,
    Pager, PagerLink, Query, Request,
};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use tokio_util::sync::CancellationToken;

// Re-export traits
pub use traits::{Get, List};

// Re-export models
pub use models::*;
