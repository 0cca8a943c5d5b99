//! Core abstractions for skill-tree processing
//!
//! Shared types, store-facing records, the store and layout traits, errors
//! and logging setup.

mod error;
mod layout;
pub mod logging;
mod records;
mod store;
mod types;

pub use error::*;
pub use layout::*;
pub use logging::*;
pub use records::*;
pub use store::*;
pub use types::*;
