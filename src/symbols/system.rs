//! The system symbol table, `$ion` version 1 (`spec.md` §3/§9 "Global
//! state"). Implemented as a process-wide constant built once, the way the
//! teacher treats its own fixed lookup tables (e.g. `dom::role_map`).

use std::sync::OnceLock;

use super::shared::SharedSymbolTable;

/// The nine well-known symbol names, in ID order (IDs 1..9).
pub const SYSTEM_SYMBOL_IDS: [&str; 9] = [
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// Returns the shared, process-wide `$ion` version 1 system symbol table.
pub fn system_symbol_table() -> &'static SharedSymbolTable {
    static TABLE: OnceLock<SharedSymbolTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        SharedSymbolTable::new(
            "$ion",
            1,
            SYSTEM_SYMBOL_IDS.iter().map(|s| s.to_string()).collect(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_has_nine_well_known_symbols() {
        let table = system_symbol_table();
        assert_eq!(table.max_id(), 9);
        assert_eq!(table.find_by_id(1), Some("$ion"));
        assert_eq!(table.find_by_id(9), Some("$ion_shared_symbol_table"));
        assert_eq!(table.find_by_name("name"), Some(4));
    }
}
