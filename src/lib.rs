//! Two-pass assembler for the Hack 16-bit instruction set.
//!
//! Source text is normalized line by line, labels are collected in a first pass and
//! every retained instruction is encoded into a [`Word`] in a second pass. Each run
//! owns its own [`SymbolTable`].

// Parsing
mod parser;
pub use parser::AsmParser;
mod air;
pub use air::{Air, AirStmt};
mod source;
pub use source::{normalize, Line, RawLine, Source};

// Encoding
pub mod isa;
pub use isa::Word;
mod symbol;
pub use symbol::{Entry, Span, SrcOffset, SymbolKind, SymbolTable};

mod error;

use miette::Result;

/// Amount of lines to show as context, each side of focus line (line containing span).
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 4;

/// Output of a successful run.
pub struct Assembly {
    pub words: Vec<Word>,
    pub symbols: SymbolTable,
}

/// Assemble a source into machine words, keeping the final symbol table.
pub fn assemble_full(src: &Source) -> Result<Assembly> {
    let run = || -> Result<Assembly> {
        let mut air = AsmParser::new(src).parse()?;
        let words = air.emit()?;
        Ok(Assembly {
            words,
            symbols: air.into_symbols(),
        })
    };
    run().map_err(|e| e.with_source_code(src.named()))
}

/// Assemble a source into machine words. Nothing is returned unless every line is valid.
pub fn assemble(src: &Source) -> Result<Vec<Word>> {
    assemble_full(src).map(|asm| asm.words)
}

/// Assemble an in-memory sequence of lines.
pub fn assemble_lines<I, S>(lines: I) -> Result<Vec<Word>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    assemble(&Source::from_lines("<input>", lines))
}
