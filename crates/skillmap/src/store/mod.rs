//! Store implementations and gated writes

mod editor;
mod memory;

pub use editor::TreeEditor;
pub use memory::{MemoryStore, StoreDocument};
