use std::fmt::{self, Display};
use std::str::FromStr;

use miette::Result;

use crate::error;
use crate::symbol::{Span, MAX_ADDRESS};

/// A single 16-bit machine word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Word(pub u16);

impl Word {
    /// Address-instruction: leading bit clear, 15-bit value.
    pub fn address(value: u16) -> Self {
        debug_assert!(value <= MAX_ADDRESS);
        Word(value & MAX_ADDRESS)
    }

    /// Compute-instruction: `111` prefix, then comp, dest and jump fields.
    pub fn compute(dest: Dest, comp: Comp, jump: Jump) -> Self {
        Word(0b111 << 13 | comp.bits() << 6 | dest.bits() << 3 | jump.bits())
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016b}", self.0)
    }
}

/// Destination field. Bits are `A D M` from high to low.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Dest {
    #[default]
    Null,
    M,
    D,
    MD,
    A,
    AM,
    AD,
    AMD,
}

impl Dest {
    pub fn bits(&self) -> u16 {
        match self {
            Dest::Null => 0b000,
            Dest::M => 0b001,
            Dest::D => 0b010,
            Dest::MD => 0b011,
            Dest::A => 0b100,
            Dest::AM => 0b101,
            Dest::AD => 0b110,
            Dest::AMD => 0b111,
        }
    }
}

impl FromStr for Dest {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Dest::Null),
            "M" => Ok(Dest::M),
            "D" => Ok(Dest::D),
            "MD" | "DM" => Ok(Dest::MD),
            "A" => Ok(Dest::A),
            "AM" => Ok(Dest::AM),
            "AD" => Ok(Dest::AD),
            "AMD" | "ADM" => Ok(Dest::AMD),
            _ => Err(()),
        }
    }
}

/// Jump field, ordered by the condition it tests.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Jump {
    #[default]
    Null,
    /// > 0
    Jgt,
    /// = 0
    Jeq,
    /// >= 0
    Jge,
    /// < 0
    Jlt,
    /// != 0
    Jne,
    /// <= 0
    Jle,
    /// Unconditional
    Jmp,
}

impl Jump {
    pub fn bits(&self) -> u16 {
        match self {
            Jump::Null => 0b000,
            Jump::Jgt => 0b001,
            Jump::Jeq => 0b010,
            Jump::Jge => 0b011,
            Jump::Jlt => 0b100,
            Jump::Jne => 0b101,
            Jump::Jle => 0b110,
            Jump::Jmp => 0b111,
        }
    }
}

impl FromStr for Jump {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Jump::Null),
            "JGT" => Ok(Jump::Jgt),
            "JEQ" => Ok(Jump::Jeq),
            "JGE" => Ok(Jump::Jge),
            "JLT" => Ok(Jump::Jlt),
            "JNE" => Ok(Jump::Jne),
            "JLE" => Ok(Jump::Jle),
            "JMP" => Ok(Jump::Jmp),
            _ => Err(()),
        }
    }
}

/// ALU computation. Variants reading `M` set the a-bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Comp {
    Zero,
    One,
    NegOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    /// The a-bit followed by the six ALU control bits.
    pub fn bits(&self) -> u16 {
        match self {
            Comp::Zero => 0b0101010,
            Comp::One => 0b0111111,
            Comp::NegOne => 0b0111010,
            Comp::D => 0b0001100,
            Comp::A => 0b0110000,
            Comp::M => 0b1110000,
            Comp::NotD => 0b0001101,
            Comp::NotA => 0b0110001,
            Comp::NotM => 0b1110001,
            Comp::NegD => 0b0001111,
            Comp::NegA => 0b0110011,
            Comp::NegM => 0b1110011,
            Comp::DPlusOne => 0b0011111,
            Comp::APlusOne => 0b0110111,
            Comp::MPlusOne => 0b1110111,
            Comp::DMinusOne => 0b0001110,
            Comp::AMinusOne => 0b0110010,
            Comp::MMinusOne => 0b1110010,
            Comp::DPlusA => 0b0000010,
            Comp::DPlusM => 0b1000010,
            Comp::DMinusA => 0b0010011,
            Comp::DMinusM => 0b1010011,
            Comp::AMinusD => 0b0000111,
            Comp::MMinusD => 0b1000111,
            Comp::DAndA => 0b0000000,
            Comp::DAndM => 0b1000000,
            Comp::DOrA => 0b0010101,
            Comp::DOrM => 0b1010101,
        }
    }
}

impl FromStr for Comp {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let comp = match s {
            "0" => Comp::Zero,
            "1" => Comp::One,
            "-1" => Comp::NegOne,
            "D" => Comp::D,
            "A" => Comp::A,
            "M" => Comp::M,
            "!D" => Comp::NotD,
            "!A" => Comp::NotA,
            "!M" => Comp::NotM,
            "-D" => Comp::NegD,
            "-A" => Comp::NegA,
            "-M" => Comp::NegM,
            "D+1" => Comp::DPlusOne,
            "A+1" => Comp::APlusOne,
            "M+1" => Comp::MPlusOne,
            "D-1" => Comp::DMinusOne,
            "A-1" => Comp::AMinusOne,
            "M-1" => Comp::MMinusOne,
            "D+A" => Comp::DPlusA,
            "D+M" => Comp::DPlusM,
            "D-A" => Comp::DMinusA,
            "D-M" => Comp::DMinusM,
            "A-D" => Comp::AMinusD,
            "M-D" => Comp::MMinusD,
            "D&A" => Comp::DAndA,
            "D&M" => Comp::DAndM,
            "D|A" => Comp::DOrA,
            "D|M" => Comp::DOrM,
            _ => return Err(()),
        };
        Ok(comp)
    }
}

/// Operand of an address-instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Literal(u16),
    Symbol(String),
}

/// A single non-label instruction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instr {
    /// `@value` loads a 15-bit value into A
    Address(Operand),
    /// `dest=comp;jump`
    Compute { dest: Dest, comp: Comp, jump: Jump },
}

impl Instr {
    /// Parse normalized (whitespace and comment free) instruction text.
    pub fn parse(text: &str, span: Span) -> Result<Instr> {
        match text.strip_prefix('@') {
            Some(operand) => Ok(Instr::Address(parse_operand(operand, span)?)),
            None => parse_compute(text, span),
        }
    }
}

fn parse_operand(operand: &str, span: Span) -> Result<Operand> {
    if operand.is_empty() {
        return Err(error::parse_empty_operand(span));
    }
    if operand.chars().all(|c| c.is_ascii_digit()) {
        return match operand.parse::<u16>() {
            Ok(val) if val <= MAX_ADDRESS => Ok(Operand::Literal(val)),
            _ => Err(error::parse_overflow(span, operand)),
        };
    }
    if !is_symbol(operand) {
        return Err(error::parse_symbol(span, operand));
    }
    Ok(Operand::Symbol(operand.to_string()))
}

fn parse_compute(text: &str, span: Span) -> Result<Instr> {
    let (dest, rest) = match text.split_once('=') {
        Some((dest, rest)) => {
            // An explicit `=` needs something to store into
            if dest.is_empty() {
                return Err(error::parse_dest(span, dest));
            }
            (dest, rest)
        }
        None => ("", text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => {
            if jump.is_empty() {
                return Err(error::parse_jump(span, jump));
            }
            (comp, jump)
        }
        None => (rest, ""),
    };

    let dest = dest.parse().map_err(|_| error::parse_dest(span, dest))?;
    let comp = comp.parse().map_err(|_| error::parse_comp(span, comp))?;
    let jump = jump.parse().map_err(|_| error::parse_jump(span, jump))?;
    Ok(Instr::Compute { dest, comp, jump })
}

/// Test if a string is a usable user-defined symbol.
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_symbol_char(c) && !c.is_ascii_digit() => chars.all(is_symbol_char),
        _ => false,
    }
}

fn is_symbol_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' | '$' | ':')
}
