//! A registry of shared symbol tables keyed by name and version, consulted
//! when resolving imports that don't carry their symbols inline
//! (`spec.md` §4.4).

use std::collections::HashMap;

use super::shared::SharedSymbolTable;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<(String, u32), SharedSymbolTable>,
}

impl Catalog {
    pub fn new() -> Catalog {
        Catalog::default()
    }

    pub fn insert(&mut self, table: SharedSymbolTable) {
        self.tables
            .insert((table.name().to_string(), table.version()), table);
    }

    /// Looks up an exact `(name, version)` pair.
    pub fn find_exact(&self, name: &str, version: u32) -> Option<&SharedSymbolTable> {
        self.tables.get(&(name.to_string(), version))
    }

    /// Looks up the highest version registered under `name`, regardless of
    /// the version an import requested (used when an exact match is
    /// missing, per `spec.md` §4.4's substitution rules).
    pub fn find_latest(&self, name: &str) -> Option<&SharedSymbolTable> {
        self.tables
            .values()
            .filter(|t| t.name() == name)
            .max_by_key(|t| t.version())
    }
}
