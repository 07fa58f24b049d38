//! `LocalSymbolTable`: the in-band table that applies to a binary datagram
//! (`spec.md` §3/§4.4).

use crate::types::SymbolToken;

use super::shared::SharedSymbolTable;
use super::system::system_symbol_table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSymbolTable {
    imports: Vec<SharedSymbolTable>,
    offsets: Vec<u64>,
    max_import_id: u64,
    local: Vec<String>,
}

/// Prepends the system table iff the first supplied import isn't already
/// `$ion`, then computes each import's starting offset and the running
/// total `max_id` (`spec.md` §4.4's `processImports`).
pub fn process_imports(imports: Vec<SharedSymbolTable>) -> (Vec<SharedSymbolTable>, Vec<u64>, u64) {
    let needs_system_table = !matches!(imports.first(), Some(t) if t.name() == "$ion");
    let mut augmented = Vec::with_capacity(imports.len() + 1);
    if needs_system_table {
        augmented.push(system_symbol_table().clone());
    }
    augmented.extend(imports);

    let mut offsets = Vec::with_capacity(augmented.len());
    let mut total = 0u64;
    for table in &augmented {
        offsets.push(total);
        total += table.max_id();
    }
    (augmented, offsets, total)
}

impl LocalSymbolTable {
    /// Builds a local table from an import list (the system table is
    /// prepended automatically if absent) and a sequence of local symbols.
    pub fn new(imports: Vec<SharedSymbolTable>, local: Vec<String>) -> LocalSymbolTable {
        let (imports, offsets, max_import_id) = process_imports(imports);
        LocalSymbolTable {
            imports,
            offsets,
            max_import_id,
            local,
        }
    }

    /// The table containing only the implicit system import and no local
    /// symbols — what a reader resets to on a BVM or an empty
    /// `$ion_symbol_table` (`spec.md` §4.4).
    pub fn system() -> LocalSymbolTable {
        LocalSymbolTable::new(Vec::new(), Vec::new())
    }

    pub fn imports(&self) -> &[SharedSymbolTable] {
        &self.imports
    }

    pub fn local_symbols(&self) -> &[String] {
        &self.local
    }

    pub fn max_import_id(&self) -> u64 {
        self.max_import_id
    }

    pub fn max_id(&self) -> u64 {
        self.max_import_id + self.local.len() as u64
    }

    /// Searches imports in order, then local symbols.
    pub fn find_by_name(&self, name: &str) -> Option<u64> {
        for (table, &offset) in self.imports.iter().zip(&self.offsets) {
            if let Some(id) = table.find_by_name(name) {
                return Some(offset + id);
            }
        }
        self.local
            .iter()
            .position(|s| s == name)
            .map(|idx| self.max_import_id + idx as u64 + 1)
    }

    /// `id <= max_import_id` locates the owning import segment by linear
    /// scan and subtracts its offset; otherwise indexes into local symbols.
    /// Returns a [`SymbolToken::Unknown`] when the ID lands on a padded
    /// placeholder slot with no text (`spec.md` §4.4).
    pub fn find_by_id(&self, id: u64) -> Option<SymbolToken> {
        if id == 0 || id > self.max_id() {
            return None;
        }
        if id <= self.max_import_id {
            for (table, &offset) in self.imports.iter().zip(&self.offsets) {
                if id > offset && id <= offset + table.max_id() {
                    return Some(match table.find_by_id_nonempty(id - offset) {
                        Some(text) => SymbolToken::Known(text.to_string()),
                        None => SymbolToken::Unknown(id),
                    });
                }
            }
            unreachable!("id <= max_import_id but no import segment matched");
        } else {
            let local_idx = (id - self.max_import_id - 1) as usize;
            self.local
                .get(local_idx)
                .map(|s| SymbolToken::Known(s.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_table_ids_resolve() {
        let lst = LocalSymbolTable::system();
        assert_eq!(lst.max_id(), 9);
        assert_eq!(lst.find_by_name("name"), Some(4));
        assert_eq!(
            lst.find_by_id(4),
            Some(SymbolToken::Known("name".to_string()))
        );
    }

    #[test]
    fn local_symbols_follow_imports() {
        let shared = SharedSymbolTable::new("foo", 1, vec!["a".into(), "b".into()]);
        let lst = LocalSymbolTable::new(vec![shared], vec!["x".into(), "y".into()]);
        assert_eq!(lst.max_import_id(), 11); // 9 system + 2 shared
        assert_eq!(lst.max_id(), 13);
        assert_eq!(lst.find_by_name("a"), Some(10));
        assert_eq!(lst.find_by_name("x"), Some(12));
        assert_eq!(
            lst.find_by_id(12),
            Some(SymbolToken::Known("x".to_string()))
        );
    }

    #[test]
    fn id_round_trips_for_every_defined_id() {
        let shared = SharedSymbolTable::new("foo", 1, vec!["a".into(), "b".into()]);
        let lst = LocalSymbolTable::new(vec![shared], vec!["x".into(), "y".into()]);
        for id in 1..=lst.max_id() {
            if let Some(SymbolToken::Known(name)) = lst.find_by_id(id) {
                assert_eq!(lst.find_by_name(&name), Some(id));
            }
        }
    }

    #[test]
    fn placeholder_padding_renders_as_unknown() {
        let declared = SharedSymbolTable::new("foo", 1, vec![]).adjust(3);
        let lst = LocalSymbolTable::new(vec![declared], vec![]);
        assert_eq!(lst.find_by_id(10), Some(SymbolToken::Unknown(10)));
    }

    #[test]
    fn does_not_prepend_system_table_twice() {
        let lst = LocalSymbolTable::new(vec![system_symbol_table().clone()], vec!["x".into()]);
        assert_eq!(lst.max_import_id(), 9);
        assert_eq!(lst.find_by_name("x"), Some(10));
    }
}
