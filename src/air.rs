use miette::Result;

use crate::{
    error,
    isa::{Instr, Operand, Word},
    symbol::{Span, SymbolTable, MAX_ADDRESS},
};

/// Assembly intermediate representation: retained instructions in output order,
/// plus the symbol table filled by the label scan.
#[derive(Debug)]
pub struct Air {
    ast: Vec<AirStmt>,
    symbols: SymbolTable,
}

impl Air {
    pub fn new(ast: Vec<AirStmt>, symbols: SymbolTable) -> Self {
        Air { ast, symbols }
    }

    /// Encode every statement in order. Variables are allocated as they are first
    /// referenced. Any failure discards the whole output.
    pub fn emit(&mut self) -> Result<Vec<Word>> {
        let mut words = Vec::with_capacity(self.ast.len());
        for stmt in &self.ast {
            words.push(stmt.emit(&mut self.symbols)?);
        }
        Ok(words)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }

    pub fn get(&self, idx: usize) -> &AirStmt {
        &self.ast[idx]
    }

    pub fn len(&self) -> usize {
        self.ast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ast.is_empty()
    }
}

/// Single retained instruction with the place it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AirStmt {
    instr: Instr,
    span: Span,
    line: usize,
}

impl AirStmt {
    pub fn new(instr: Instr, span: Span, line: usize) -> Self {
        AirStmt { instr, span, line }
    }

    pub fn instr(&self) -> &Instr {
        &self.instr
    }

    /// 1-based source line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Encode into a machine word, resolving symbols against `symbols`.
    pub fn emit(&self, symbols: &mut SymbolTable) -> Result<Word> {
        match &self.instr {
            Instr::Address(Operand::Literal(val)) => Ok(Word::address(*val)),
            Instr::Address(Operand::Symbol(name)) => {
                let addr = symbols.resolve(name, self.span)?;
                if addr > MAX_ADDRESS {
                    return Err(error::symbol_out_of_range(self.span, name, addr));
                }
                Ok(Word::address(addr))
            }
            Instr::Compute { dest, comp, jump } => Ok(Word::compute(*dest, *comp, *jump)),
        }
    }
}
