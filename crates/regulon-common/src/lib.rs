//! Shared foundations for the Regulon client core.

pub mod error;

pub use error::{RegulonError, Result};
