//! Line-oriented reading of tagged text sections.
//!
//! A section looks like:
//!
//! ```text
//! Name
//! {
//! ...content lines...
//! }
//! ```

use std::io::BufRead;
use std::str::{FromStr, SplitWhitespace};

use crate::error::{CompileError, CompileResult};

/// Reads lines from a stream, tracking the line number for error messages.
pub struct LineReader<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }

    /// Number of the line most recently read (1-based).
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next line without its terminator. `what` describes the
    /// expected content, for the end-of-file error.
    pub fn read_line(&mut self, what: &str) -> CompileResult<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(CompileError::format(format!(
                "unexpected end of file while reading {what}"
            )));
        }
        self.line_number += 1;
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Reads a line and checks that it is exactly `expected`.
    pub fn read_checked_line(&mut self, expected: &str) -> CompileResult<()> {
        let line = self.read_line(&format!("`{expected}`"))?;
        if line.trim() == expected {
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`, found `{line}`")))
        }
    }

    /// Reads a line holding a single value.
    pub fn read_value<T: FromStr>(&mut self, what: &str) -> CompileResult<T> {
        let line = self.read_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| self.error(format!("expected {what}, found `{line}`")))
    }

    /// Reads a section's name and opening brace.
    pub fn begin_section(&mut self, name: &str) -> CompileResult<()> {
        self.read_checked_line(name)?;
        self.read_checked_line("{")
    }

    /// Reads a section's closing brace.
    pub fn end_section(&mut self) -> CompileResult<()> {
        self.read_checked_line("}")
    }

    /// A format error located at the current line.
    pub fn error(&self, message: impl AsRef<str>) -> CompileError {
        CompileError::format(format!("line {}: {}", self.line_number, message.as_ref()))
    }
}

/// Whitespace-separated tokens of one line.
pub struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            inner: line.split_whitespace(),
        }
    }

    /// The next token, or an error naming what was expected.
    pub fn next_token(&mut self, what: &str) -> CompileResult<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| CompileError::format(format!("missing {what}")))
    }

    /// Consumes a token that must be exactly `expected`.
    pub fn expect(&mut self, expected: &str) -> CompileResult<()> {
        let token = self.next_token(&format!("`{expected}`"))?;
        if token == expected {
            Ok(())
        } else {
            Err(CompileError::format(format!(
                "expected `{expected}`, found `{token}`"
            )))
        }
    }

    /// Parses the next token.
    pub fn parse<T: FromStr>(&mut self, what: &str) -> CompileResult<T> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| CompileError::format(format!("expected {what}, found `{token}`")))
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.inner.clone().next()
    }

    /// Fails if any tokens remain.
    pub fn finish(mut self) -> CompileResult<()> {
        match self.inner.next() {
            None => Ok(()),
            Some(token) => Err(CompileError::format(format!(
                "unexpected trailing `{token}`"
            ))),
        }
    }
}

/// Prefixes a format error with the line it came from.
pub(crate) fn at_line(reader_line: usize, err: CompileError) -> CompileError {
    match err {
        CompileError::Format(message) => {
            CompileError::Format(format!("line {reader_line}: {message}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_sections_and_values() {
        let text = "Polygons\r\n{\n3\n}\n";
        let mut reader = LineReader::new(Cursor::new(text));
        reader.begin_section("Polygons").unwrap();
        assert_eq!(reader.read_value::<usize>("a count").unwrap(), 3);
        reader.end_section().unwrap();
        assert_eq!(reader.line_number(), 4);
        assert!(reader.read_line("anything").is_err());
    }

    #[test]
    fn errors_name_the_line() {
        let mut reader = LineReader::new(Cursor::new("Tree\n{\nmany\n"));
        reader.begin_section("Tree").unwrap();
        let err = reader.read_value::<usize>("the node count").unwrap_err();
        assert_eq!(err.to_string(), "line 3: expected the node count, found `many`");

        let mut reader = LineReader::new(Cursor::new("Portals\n"));
        let err = reader.begin_section("Tree").unwrap_err();
        assert!(err.to_string().contains("expected `Tree`"));
    }

    #[test]
    fn tokens_parse_in_order() {
        let mut tokens = Tokens::new("3 ( 1.5 -2 ) tex");
        assert_eq!(tokens.parse::<usize>("a count").unwrap(), 3);
        tokens.expect("(").unwrap();
        assert_eq!(tokens.parse::<f64>("x").unwrap(), 1.5);
        assert_eq!(tokens.parse::<f64>("y").unwrap(), -2.0);
        assert_eq!(tokens.peek(), Some(")"));
        tokens.expect(")").unwrap();
        assert_eq!(tokens.next_token("a name").unwrap(), "tex");
        tokens.finish().unwrap();

        assert!(Tokens::new("x").parse::<f64>("a number").is_err());
        assert!(Tokens::new("a b").finish().is_err());
    }
}
