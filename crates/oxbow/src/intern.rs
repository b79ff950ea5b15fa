//! String interning for identifiers and attribute names.
//!
//! Every name discovered during parsing is stored once in a vector and
//! referenced by a [`StringId`]. All dataflow tables are keyed by `StringId`;
//! the actual strings are only needed when formatting user-facing output.

use ahash::AHashMap;

/// Index into the interner's storage.
///
/// Uses `u32` to save space (4 bytes vs 8 bytes for `usize`). This limits us
/// to ~4 billion unique names, which is more than sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct StringId(u32);

impl StringId {
    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only store of unique strings.
///
/// Populated during parsing; afterwards the session only reads from it.
/// Interning the same string twice returns the same id, so ids can be
/// compared directly instead of comparing string contents.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Interner {
    strings: Vec<String>,
    ids: AHashMap<String, StringId>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a string, returning its stable id.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.ids.get(s) {
            return id;
        }
        let id = StringId(u32::try_from(self.strings.len()).expect("interner overflowed u32 ids"));
        self.strings.push(s.to_owned());
        self.ids.insert(s.to_owned(), id);
        id
    }

    /// Returns the id of an already-interned string, if any.
    ///
    /// Used by the interactive session to map user input onto table keys
    /// without growing the interner.
    #[must_use]
    pub fn lookup(&self, s: &str) -> Option<StringId> {
        self.ids.get(s).copied()
    }

    /// Resolves an id back to its string.
    ///
    /// # Panics
    /// Panics if the id was not produced by this interner.
    #[must_use]
    pub fn resolve(&self, id: StringId) -> &str {
        &self.strings[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let mut interner = Interner::new();
        let a = interner.intern("alpha");
        let b = interner.intern("beta");
        assert_ne!(a, b);
        assert_eq!(interner.intern("alpha"), a);
        assert_eq!(interner.resolve(a), "alpha");
        assert_eq!(interner.lookup("beta"), Some(b));
        assert_eq!(interner.lookup("gamma"), None);
    }
}
