//! # Relayer Core
//!
//! Core primitives of the relayer task/event API.
//!
//! This crate provides the building blocks shared by every union family:
//! - [`RawUnion`] and [`UnionContainer`] - Tag-discriminated containers
//! - [`union_registry!`] - Closed tag-to-variant registries
//! - [`Cost`] - Token amount or itemized fee list, with validation
//! - [`ApiError`] - Error kinds of the model

pub mod cost;
pub mod error;
pub mod types;
pub mod union;

pub use cost::{create_fees, Cost, CostBearing, Fee, FeeMetadata, Fees};
pub use error::{ApiError, Result};
pub use types::*;
pub use union::{RawUnion, UnionContainer, Variant, TAG_KEY};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::cost::{Cost, CostBearing, Fee, Fees};
    pub use crate::error::{ApiError, Result};
    pub use crate::types::{CrossChainID, Message, Token, TokenAmount};
    pub use crate::union::{UnionContainer, Variant};
}
