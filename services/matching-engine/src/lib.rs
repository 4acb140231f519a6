//! Matching Engine Service
//!
//! Single-instrument limit order book with price-time priority matching.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs)
//! - The book is never left crossed
//! - Conservation of quantity
//! - A failed command leaves the book unchanged

pub mod book;
pub mod matching;
pub mod engine;
pub mod events;
pub mod view;
pub mod config;
pub mod service;

pub use book::{OrderBook, PriceLadder, PriceLevel};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineStats, MatchingEngine};
pub use events::BookEvent;
pub use service::{BookHandle, BookService, ServiceError};
pub use view::{BookSnapshot, BookView};
