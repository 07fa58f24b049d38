//! `SharedSymbolTable`: an out-of-band, named, versioned table (`spec.md`
//! §3).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSymbolTable {
    name: String,
    version: u32,
    symbols: Vec<String>,
}

impl SharedSymbolTable {
    pub fn new(name: impl Into<String>, version: u32, symbols: Vec<String>) -> Self {
        SharedSymbolTable {
            name: name.into(),
            version,
            symbols,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// IDs are `1..=max_id`.
    pub fn max_id(&self) -> u64 {
        self.symbols.len() as u64
    }

    pub fn find_by_name(&self, name: &str) -> Option<u64> {
        self.symbols
            .iter()
            .position(|s| s == name)
            .map(|idx| (idx + 1) as u64)
    }

    /// ID 0 or out-of-range returns `None`.
    pub fn find_by_id(&self, id: u64) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.symbols.get((id - 1) as usize).map(|s| s.as_str())
    }

    /// Returns a clone truncated or padded (with "no text" slots) to
    /// `new_max_id`. Used when a catalog returns a shared table whose
    /// declared `max_id` disagrees with an import's declared `max_id`
    /// (`spec.md` §4.4).
    pub fn adjust(&self, new_max_id: u64) -> SharedSymbolTable {
        let new_max_id = new_max_id as usize;
        let mut symbols = self.symbols.clone();
        symbols.resize(new_max_id, String::new());
        SharedSymbolTable {
            name: self.name.clone(),
            version: self.version,
            symbols,
        }
    }

    /// A symbol table slot that has no text (used for padding and for
    /// reserved/undefined IDs) is represented as an empty string; this
    /// treats such slots as absent for lookup purposes.
    pub fn find_by_id_nonempty(&self, id: u64) -> Option<&str> {
        self.find_by_id(id).filter(|s| !s.is_empty())
    }
}
