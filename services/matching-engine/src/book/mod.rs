//! Order book infrastructure module
//!
//! Contains price levels, the per-side price ladder and the two-sided book.

pub mod price_level;
pub mod ladder;
pub mod order_book;

pub use price_level::PriceLevel;
pub use ladder::PriceLadder;
pub use order_book::OrderBook;
