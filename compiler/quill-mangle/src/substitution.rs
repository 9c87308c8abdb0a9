//! The substitution table that is used to compress repeated entities within
//! a single symbol.

use quill_types::{
    Identifier,
    decl::{NominalId, OpaqueId},
    ty::Ty,
};
use quill_utils::fxhash::FxHashMap;

/// An entity that has been spelled out within the current symbol, and can
/// be referred to again by its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubstitutionKey {
    /// A module, keyed by the name it was spelled with.
    Module(Identifier),

    /// A nominal declaration used as a type or context.
    Nominal(NominalId),

    /// The name of a protocol (without the protocol kind operator).
    ProtocolName(NominalId),

    /// An opaque type declaration.
    Opaque(OpaqueId),

    /// A structural type.
    Ty(Ty),
}

/// The table of entities that can be substituted. Entries are numbered in the
/// order they are added.
#[derive(Debug, Default)]
pub struct SubstitutionTable {
    entries: FxHashMap<SubstitutionKey, usize>,
}

impl SubstitutionTable {
    /// Look up the index of a previously added entity.
    pub fn get(&self, key: &SubstitutionKey) -> Option<usize> {
        self.entries.get(key).copied()
    }

    /// Add an entity to the table, unless it is already present.
    pub fn add(&mut self, key: SubstitutionKey) {
        let next = self.entries.len();
        self.entries.entry(key).or_insert(next);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Write the mangling of an index: `0` is `_`, and any other `n` is
/// `(n - 1)_`.
pub fn push_index(index: u64, out: &mut String) {
    if index != 0 {
        out.push_str(&(index - 1).to_string());
    }

    out.push('_');
}

/// Write a reference to the substitution at `index`. The first 26
/// substitutions have a single letter form.
pub fn push_substitution(index: usize, out: &mut String) {
    out.push('A');

    match u8::try_from(index) {
        Ok(letter) if letter < 26 => out.push(char::from(b'A' + letter)),
        _ => push_index((index - 26) as u64, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(value: u64) -> String {
        let mut out = String::new();
        push_index(value, &mut out);
        out
    }

    fn substitution(value: usize) -> String {
        let mut out = String::new();
        push_substitution(value, &mut out);
        out
    }

    #[test]
    fn test_index_encoding() {
        assert_eq!(index(0), "_");
        assert_eq!(index(1), "0_");
        assert_eq!(index(12), "11_");
    }

    #[test]
    fn test_substitution_encoding() {
        assert_eq!(substitution(0), "AA");
        assert_eq!(substitution(25), "AZ");
        assert_eq!(substitution(26), "A_");
        assert_eq!(substitution(28), "A1_");
    }

    #[test]
    fn test_table_numbering() {
        let mut table = SubstitutionTable::default();
        table.add(SubstitutionKey::Module("main".into()));
        table.add(SubstitutionKey::Ty(Ty::unit()));
        table.add(SubstitutionKey::Module("main".into()));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&SubstitutionKey::Ty(Ty::unit())), Some(1));
        assert_eq!(table.get(&SubstitutionKey::Module("other".into())), None);
    }
}
