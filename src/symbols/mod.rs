//! Symbol tables: system, shared, local, the builder, and the catalog.
//!
//! Mirrors the split the teacher uses for its own auxiliary subsystems (an
//! independent model with its own parse/build/lookup surface, consumed by
//! both the binary and text backends) — see the teacher's `style/` module
//! for the shape this is modeled on.

mod builder;
mod catalog;
mod local;
mod shared;
mod system;

pub use builder::SymbolTableBuilder;
pub use catalog::Catalog;
pub use local::LocalSymbolTable;
pub use shared::SharedSymbolTable;
pub use system::{system_symbol_table, SYSTEM_SYMBOL_IDS};
