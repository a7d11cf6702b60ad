use miette::{NamedSource, Result};

use crate::error;
use crate::isa::is_symbol;
use crate::symbol::{Span, SrcOffset};

/// Everything from this marker to the end of the line is ignored.
pub const COMMENT: &str = "//";

/// A program text together with the name it is reported under.
#[derive(Clone, Debug)]
pub struct Source {
    name: String,
    text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Source {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Build a source from an already split sequence of lines.
    pub fn from_lines<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Source::new(name, text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw lines with their 1-based number and byte offset.
    pub fn lines(&self) -> impl Iterator<Item = RawLine<'_>> {
        let mut offs = 0;
        self.text
            .split_inclusive('\n')
            .enumerate()
            .map(move |(idx, chunk)| {
                let line = RawLine {
                    number: idx + 1,
                    offs: SrcOffset(offs),
                    text: chunk.trim_end_matches(['\n', '\r']),
                };
                offs += chunk.len();
                line
            })
    }

    /// Source handle to attach to diagnostics.
    pub fn named(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.text.clone())
    }
}

/// One unprocessed line of a source.
#[derive(Clone, Copy, Debug)]
pub struct RawLine<'a> {
    pub number: usize,
    pub offs: SrcOffset,
    pub text: &'a str,
}

/// A line after comments and whitespace have been stripped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Line {
    Blank,
    /// `(NAME)`
    Label { name: String, span: Span },
    Instr { text: String, span: Span },
}

/// Strip the comment and every whitespace character, then classify what is left.
pub fn normalize(raw: RawLine) -> Result<Line> {
    let code = match raw.text.find(COMMENT) {
        Some(idx) => &raw.text[..idx],
        None => raw.text,
    };
    let text: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return Ok(Line::Blank);
    }
    let span = code_span(raw.offs, code);

    if let Some(rest) = text.strip_prefix('(') {
        return match rest.strip_suffix(')') {
            Some(name) if is_symbol(name) => Ok(Line::Label {
                name: name.to_string(),
                span,
            }),
            _ => Err(error::parse_label(span)),
        };
    }
    Ok(Line::Instr { text, span })
}

/// Span of the code portion of a line, without surrounding whitespace.
fn code_span(line_offs: SrcOffset, code: &str) -> Span {
    let lead = code.len() - code.trim_start().len();
    let len = code.trim().len();
    Span::new(SrcOffset(line_offs.0 + lead), len)
}
