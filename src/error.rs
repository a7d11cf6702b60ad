use miette::{miette, LabeledSpan, Report, Severity};

use crate::symbol::Span;

// Line errors

pub fn parse_label(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::label",
        help = "labels are declared as `(NAME)` on a line of their own.",
        labels = vec![LabeledSpan::at(span, "malformed label")],
        "Encountered a malformed label declaration.",
    )
}

pub fn parse_symbol(span: Span, sym: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::symbol",
        help = "symbols use letters, digits, `_`, `.`, `$` or `:` and may not start with a digit.",
        labels = vec![LabeledSpan::at(span, "invalid symbol")],
        "Invalid symbol name `{sym}`",
    )
}

pub fn parse_empty_operand(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::empty_operand",
        help = "`@` must be followed by a decimal literal or a symbol, like `@17` or `@LOOP`.",
        labels = vec![LabeledSpan::at(span, "missing operand")],
        "Address instruction without an operand.",
    )
}

pub fn parse_overflow(span: Span, lit: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::overflow",
        help = "address literals range from 0 to 32,767.",
        labels = vec![LabeledSpan::at(span, "out-of-range literal")],
        "Literal {lit} does not fit in 15 bits",
    )
}

pub fn parse_program_size(span: Span) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::program_size",
        help = "instruction memory holds at most 32,768 instructions.",
        labels = vec![LabeledSpan::at(span, "instruction past the end of memory")],
        "Program does not fit in instruction memory",
    )
}

// Compute field errors

pub fn parse_dest(span: Span, dest: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::dest",
        help = "valid destinations are M, D, MD, A, AM, AD and AMD; leave out `=` entirely instead of writing an empty destination.",
        labels = vec![LabeledSpan::at(span, "unknown destination")],
        "Unknown destination `{dest}`",
    )
}

pub fn parse_comp(span: Span, comp: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::comp",
        help = "check the list of computations, e.g. `D+1`, `M-D` or `D|A`.",
        labels = vec![LabeledSpan::at(span, "unknown computation")],
        "Unknown computation `{comp}`",
    )
}

pub fn parse_jump(span: Span, jump: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "parse::jump",
        help = "valid jumps are JGT, JEQ, JGE, JLT, JNE, JLE and JMP; leave out `;` entirely instead of writing an empty jump.",
        labels = vec![LabeledSpan::at(span, "unknown jump")],
        "Unknown jump `{jump}`",
    )
}

// Symbol errors

pub fn symbol_duplicate_label(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "symbol::duplicate_label",
        help = "labels are only allowed once per file.",
        labels = vec![LabeledSpan::at(span, "duplicate label")],
        "Duplicate label `{name}`",
    )
}

pub fn symbol_reserved(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "symbol::reserved",
        help = "R0-R15, SP, LCL, ARG, THIS, THAT, SCREEN and KBD are predefined.",
        labels = vec![LabeledSpan::at(span, "predefined symbol")],
        "Label `{name}` shadows a predefined symbol",
    )
}

pub fn symbol_exhausted(span: Span, name: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "symbol::exhausted",
        help = "variables are allocated from address 16 up to 32,767.",
        labels = vec![LabeledSpan::at(span, "no free address")],
        "Ran out of addresses for variable `{name}`",
    )
}

pub fn symbol_out_of_range(span: Span, name: &str, addr: u16) -> Report {
    miette!(
        severity = Severity::Error,
        code = "symbol::out_of_range",
        help = "address-instructions can only load addresses up to 32,767.",
        labels = vec![LabeledSpan::at(span, "address too large")],
        "Symbol `{name}` resolves to {addr}, which does not fit in 15 bits",
    )
}
