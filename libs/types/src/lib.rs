//! Types library for the limit order book
//!
//! Value types shared by the matching engine and its callers.
//!
//! # Modules
//! - `ids`: caller-assigned order identifiers
//! - `numeric`: exact fixed-point prices and decimal quantities
//! - `order`: sides, order records and their status
//! - `trade`: fill reports
//! - `sequence`: intake stamps and the sequencer collaborator
//! - `errors`: error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod sequence;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::sequence::*;
    pub use crate::errors::*;
}
