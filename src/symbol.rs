use std::ops::Range;

use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use miette::{Result, SourceSpan};

use crate::error;

// Symbol table of symbol -> memory address
type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// First address handed out to variables, directly above the register block.
pub const VARIABLE_BASE: u16 = 16;
/// Largest address an address-instruction can carry.
pub const MAX_ADDRESS: u16 = 0x7FFF;

pub const SCREEN: u16 = 0x4000;
pub const KBD: u16 = 0x6000;

/// How a symbol got its address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    /// `R0` to `R15`
    Register,
    /// `SP`, `LCL`, `ARG`, `THIS`, `THAT`
    Pointer,
    /// Memory mapped `SCREEN` and `KBD`
    Io,
    /// Declared with `(NAME)`, points into instruction memory.
    Label,
    /// Allocated on first reference, points into data memory.
    Variable,
}

impl SymbolKind {
    pub fn is_predefined(&self) -> bool {
        matches!(self, SymbolKind::Register | SymbolKind::Pointer | SymbolKind::Io)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Entry {
    pub addr: u16,
    pub kind: SymbolKind,
}

/// Maps symbolic names to addresses for a single assembly run.
///
/// Every run builds its own table, so independent files can be assembled in parallel.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    table: FxMap<String, Entry>,
    next_variable: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut table = FxMap::with_hasher(FxBuildHasher::default());
        for reg in 0..16u16 {
            table.insert(
                format!("R{reg}"),
                Entry {
                    addr: reg,
                    kind: SymbolKind::Register,
                },
            );
        }
        for (addr, name) in ["SP", "LCL", "ARG", "THIS", "THAT"].into_iter().enumerate() {
            table.insert(
                name.to_string(),
                Entry {
                    addr: addr as u16,
                    kind: SymbolKind::Pointer,
                },
            );
        }
        table.insert(
            "SCREEN".to_string(),
            Entry {
                addr: SCREEN,
                kind: SymbolKind::Io,
            },
        );
        table.insert(
            "KBD".to_string(),
            Entry {
                addr: KBD,
                kind: SymbolKind::Io,
            },
        );
        SymbolTable {
            table,
            next_variable: VARIABLE_BASE,
        }
    }

    /// Bind a label to the instruction address that follows its declaration.
    /// A name may only ever be declared once and never shadow a predefined symbol.
    pub fn register_label(&mut self, name: &str, addr: u16, span: Span) -> Result<()> {
        match self.table.get(name) {
            Some(entry) if entry.kind.is_predefined() => Err(error::symbol_reserved(span, name)),
            Some(_) => Err(error::symbol_duplicate_label(span, name)),
            None => {
                self.table.insert(
                    name.to_string(),
                    Entry {
                        addr,
                        kind: SymbolKind::Label,
                    },
                );
                Ok(())
            }
        }
    }

    /// Look up a symbol, allocating a fresh variable slot if it has never been seen.
    pub fn resolve(&mut self, name: &str, span: Span) -> Result<u16> {
        if let Some(entry) = self.table.get(name) {
            return Ok(entry.addr);
        }
        if self.next_variable > MAX_ADDRESS {
            return Err(error::symbol_exhausted(span, name));
        }
        let addr = self.next_variable;
        self.next_variable += 1;
        self.table.insert(
            name.to_string(),
            Entry {
                addr,
                kind: SymbolKind::Variable,
            },
        );
        Ok(addr)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.table.get(name)
    }

    /// Entries in insertion order: predefined, then labels, then variables as first referenced.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.table.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Labels and variables only.
    pub fn user_defined(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.iter().filter(|(_, entry)| !entry.kind.is_predefined())
    }

    pub fn variables(&self) -> usize {
        (self.next_variable - VARIABLE_BASE) as usize
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Location within source
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Span {
    offs: SrcOffset,
    len: usize,
}

impl Span {
    pub fn new(offs: SrcOffset, len: usize) -> Self {
        Span { offs, len }
    }

    pub fn dummy() -> Self {
        Span {
            offs: SrcOffset(0),
            len: 0,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.offs.0..self.offs.0 + self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn offs(&self) -> usize {
        self.offs.0
    }
}

impl From<Span> for SourceSpan {
    fn from(value: Span) -> Self {
        SourceSpan::new(value.offs().into(), value.len())
    }
}

/// Used to refer to offsets from the start of a source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct SrcOffset(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_symbols() {
        let mut table = SymbolTable::new();
        assert_eq!(table.resolve("R0", Span::dummy()).unwrap(), 0);
        assert_eq!(table.resolve("R15", Span::dummy()).unwrap(), 15);
        assert_eq!(table.resolve("SP", Span::dummy()).unwrap(), 0);
        assert_eq!(table.resolve("THAT", Span::dummy()).unwrap(), 4);
        assert_eq!(table.resolve("SCREEN", Span::dummy()).unwrap(), 16384);
        assert_eq!(table.resolve("KBD", Span::dummy()).unwrap(), 24576);
        assert_eq!(table.variables(), 0);
        assert_eq!(table.len(), 23);
    }

    #[test]
    fn variables_allocate_in_order() {
        let mut table = SymbolTable::new();
        assert_eq!(table.resolve("i", Span::dummy()).unwrap(), 16);
        assert_eq!(table.resolve("sum", Span::dummy()).unwrap(), 17);
        assert_eq!(table.resolve("i", Span::dummy()).unwrap(), 16);
        assert_eq!(table.resolve("SCREEN", Span::dummy()).unwrap(), SCREEN);
        assert_eq!(table.resolve("n", Span::dummy()).unwrap(), 18);
        assert_eq!(table.variables(), 3);
        assert_eq!(table.get("sum").unwrap().kind, SymbolKind::Variable);
    }

    #[test]
    fn labels_do_not_consume_variable_slots() {
        let mut table = SymbolTable::new();
        table.register_label("LOOP", 4, Span::dummy()).unwrap();
        assert_eq!(table.resolve("LOOP", Span::dummy()).unwrap(), 4);
        assert_eq!(table.resolve("x", Span::dummy()).unwrap(), 16);
    }

    #[test]
    fn duplicate_label() {
        let mut table = SymbolTable::new();
        table.register_label("END", 2, Span::dummy()).unwrap();
        let err = table.register_label("END", 7, Span::dummy()).unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "symbol::duplicate_label");
        assert_eq!(table.get("END").unwrap().addr, 2);
    }

    #[test]
    fn label_cannot_shadow_predefined() {
        let mut table = SymbolTable::new();
        let err = table.register_label("SCREEN", 0, Span::dummy()).unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "symbol::reserved");
    }

    #[test]
    fn label_after_variable_is_duplicate() {
        let mut table = SymbolTable::new();
        table.resolve("x", Span::dummy()).unwrap();
        assert!(table.register_label("x", 3, Span::dummy()).is_err());
    }

    #[test]
    fn variables_exhaust_at_15_bits() {
        let mut table = SymbolTable::new();
        let slots = (MAX_ADDRESS - VARIABLE_BASE + 1) as usize;
        assert_eq!(slots, 32752);
        let mut last = 0;
        for idx in 0..slots {
            last = table.resolve(&format!("v{idx}"), Span::dummy()).unwrap();
        }
        assert_eq!(last, 32767);
        let err = table.resolve("one_more", Span::dummy()).unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "symbol::exhausted");
        // Known names still resolve
        assert_eq!(table.resolve("v0", Span::dummy()).unwrap(), 16);
    }

    #[test]
    fn user_defined_in_definition_order() {
        let mut table = SymbolTable::new();
        table.register_label("LOOP", 0, Span::dummy()).unwrap();
        table.resolve("b", Span::dummy()).unwrap();
        table.resolve("a", Span::dummy()).unwrap();
        let names: Vec<_> = table.user_defined().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["LOOP", "b", "a"]);
    }
}
