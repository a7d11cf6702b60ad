use miette::Result;

use crate::{
    air::{Air, AirStmt},
    error,
    isa::Instr,
    source::{normalize, Line, Source},
    symbol::{SymbolTable, MAX_ADDRESS},
};

/// Transforms source lines into AIR, collecting labels on the way
pub struct AsmParser<'a> {
    /// Reference to the source file
    src: &'a Source,
    /// Labels found so far, later extended with variables
    symbols: SymbolTable,
    /// Number of instructions retained so far
    pc: u16,
}

impl<'a> AsmParser<'a> {
    pub fn new(src: &'a Source) -> Self {
        AsmParser {
            src,
            symbols: SymbolTable::new(),
            pc: 0,
        }
    }

    /// Label scan. Labels take the address of the next retained instruction and
    /// never occupy a slot themselves.
    pub fn parse(mut self) -> Result<Air> {
        let mut stmts = Vec::new();
        for raw in self.src.lines() {
            match normalize(raw)? {
                Line::Blank => continue,
                Line::Label { name, span } => {
                    self.symbols.register_label(&name, self.pc, span)?;
                }
                Line::Instr { text, span } => {
                    // The last slot is MAX_ADDRESS; a label may still follow it
                    if self.pc > MAX_ADDRESS {
                        return Err(error::parse_program_size(span));
                    }
                    let instr = Instr::parse(&text, span)?;
                    stmts.push(AirStmt::new(instr, span, raw.number));
                    self.pc += 1;
                }
            }
        }
        // Consume self to return AIR
        Ok(Air::new(stmts, self.symbols))
    }
}

#[cfg(test)]
mod tests {
    use super::AsmParser;
    use crate::{
        isa::{Comp, Dest, Instr, Jump, Operand},
        source::Source,
        symbol::SymbolKind,
    };

    fn parse(text: &str) -> miette::Result<crate::Air> {
        let src = Source::new("test.asm", text);
        AsmParser::new(&src).parse()
    }

    #[test]
    fn retains_instructions_in_order() {
        let air = parse(
            r#"
        // Computes R0 = 2 + 3
        @2
        D=A
        @3
        D=D+A
        @0
        M=D
        "#,
        )
        .unwrap();
        assert_eq!(air.len(), 6);
        assert_eq!(air.get(0).instr(), &Instr::Address(Operand::Literal(2)));
        assert_eq!(
            air.get(3).instr(),
            &Instr::Compute {
                dest: Dest::D,
                comp: Comp::DPlusA,
                jump: Jump::Null,
            }
        );
        assert_eq!(air.get(0).line(), 3);
    }

    #[test]
    fn label_addresses() {
        let air = parse(
            r#"
        (START)
        @i
        M=1
        (LOOP)
        (ALIAS)
        @LOOP
        0;JMP
        (END)
        "#,
        )
        .unwrap();
        let symbols = air.symbols();
        assert_eq!(symbols.get("START").unwrap().addr, 0);
        assert_eq!(symbols.get("LOOP").unwrap().addr, 2);
        assert_eq!(symbols.get("ALIAS").unwrap().addr, 2);
        assert_eq!(symbols.get("END").unwrap().addr, 4);
        assert_eq!(symbols.get("END").unwrap().kind, SymbolKind::Label);
        // Variables are only allocated while emitting
        assert!(symbols.get("i").is_none());
    }

    #[test]
    fn only_labels() {
        let air = parse("(A)\n(B)\n// nothing else\n").unwrap();
        assert!(air.is_empty());
    }

    #[test]
    fn duplicate_label() {
        let err = parse("(X)\n@X\n(X)\n0;JMP\n").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "symbol::duplicate_label");
    }

    #[test]
    fn program_fills_instruction_memory() {
        let full = "0;JMP\n".repeat(32768);
        let air = parse(&format!("{full}(END)\n")).unwrap();
        assert_eq!(air.len(), 32768);
        assert_eq!(air.symbols().get("END").unwrap().addr, 32768);

        let err = parse(&format!("{full}D=0\n")).unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "parse::program_size");
        let label = err.labels().unwrap().next().unwrap();
        assert_eq!(label.offset(), full.len());
    }

    #[test]
    fn bad_instruction_fails_parse() {
        let err = parse("@1\nD=D*A\n").unwrap_err();
        assert_eq!(err.code().unwrap().to_string(), "parse::comp");
    }
}
