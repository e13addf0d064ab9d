use crate::error::Error;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::Chars;

/// Single-cursor tokenizer with one character of lookahead. Either the whole
/// source tokenizes or the first lexical error aborts the run.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
    buf: String,
    line: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            iter: source.chars().peekable(),
            buf: String::new(),
            line: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        while let Some(c) = self.current() {
            if is_separator(c) {
                while self.current().is_some_and(is_separator) {
                    self.skip();
                }
            } else if c.is_ascii_alphabetic() {
                self.scan_word();
            } else if c.is_ascii_digit() {
                self.scan_number()?;
            } else if c == '\'' {
                self.scan_string()?;
            } else if c == '{' {
                self.scan_comment()?;
            } else {
                self.scan_symbol(c)?;
            }
        }
        Ok(self.tokens)
    }
}

// ----------------------------------------------------------------------------
// Cursor

impl<'a> Lexer<'a> {
    fn current(&mut self) -> Option<char> {
        self.iter.peek().copied()
    }

    /// Consume the current character into the token buffer.
    fn append(&mut self) {
        if let Some(c) = self.iter.next() {
            if c == '\n' {
                self.line += 1;
            }
            self.buf.push(c);
        }
    }

    /// Consume the current character without buffering it.
    fn skip(&mut self) {
        if let Some(c) = self.iter.next() {
            if c == '\n' {
                self.line += 1;
            }
        }
    }

    /// Register the buffered lexeme as one token and reset the buffer.
    fn register(&mut self, kind: TokenKind) {
        let lexeme = std::mem::take(&mut self.buf);
        self.tokens.push(Token::new(lexeme, kind, self.line));
    }
}

// ----------------------------------------------------------------------------
// Scanners

impl<'a> Lexer<'a> {
    /// Maximal letter-then-alnum run: reserved word or identifier.
    fn scan_word(&mut self) {
        self.append();
        while self.current().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.append();
        }
        let kind = TokenKind::of_symbol(&self.buf).unwrap_or(TokenKind::SIDENTIFIER);
        self.register(kind);
    }

    /// Maximal digit run. A trailing letter makes the whole alnum run an
    /// invalid constant; digits-then-letters is not an identifier here.
    fn scan_number(&mut self) -> Result<(), Error> {
        self.append();
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.append();
        }
        if self.current().is_some_and(|c| c.is_ascii_alphabetic()) {
            while self.current().is_some_and(|c| c.is_ascii_alphanumeric()) {
                self.append();
            }
            return Err(Error::InvalidConstant {
                line: self.line,
                lexeme: std::mem::take(&mut self.buf),
            });
        }
        self.register(TokenKind::SCONSTANT);
        Ok(())
    }

    /// Quoted constant, quotes kept in the lexeme. No escape for an embedded
    /// quote exists; `''` is only meaningful as the rejected empty string.
    fn scan_string(&mut self) -> Result<(), Error> {
        self.append();
        if self.current() == Some('\'') {
            return Err(Error::NullString { line: self.line });
        }
        loop {
            match self.current() {
                Some('\'') => break,
                Some('\n') | None => {
                    return Err(Error::UnterminatedString { line: self.line })
                }
                Some(_) => self.append(),
            }
        }
        self.append();
        self.register(TokenKind::SSTRING);
        Ok(())
    }

    /// `{ ... }`, skipped entirely. Comments do not nest.
    fn scan_comment(&mut self) -> Result<(), Error> {
        self.skip();
        loop {
            match self.current() {
                Some('}') => break,
                None => return Err(Error::UnterminatedComment { line: self.line }),
                Some(_) => self.skip(),
            }
        }
        self.skip();
        Ok(())
    }

    /// Punctuation, greedy for the two-character operators.
    fn scan_symbol(&mut self, c: char) -> Result<(), Error> {
        match c {
            '<' => {
                self.append();
                if self.current() == Some('>') || self.current() == Some('=') {
                    self.append();
                }
            }
            '>' | ':' => {
                self.append();
                if self.current() == Some('=') {
                    self.append();
                }
            }
            '.' => {
                self.append();
                if self.current() == Some('.') {
                    self.append();
                }
            }
            '+' | '-' | '*' | '/' | '=' | '(' | ')' | '[' | ']' | ',' | ';' => {
                self.append();
            }
            _ => {
                return Err(Error::InvalidCharacter { line: self.line, c });
            }
        }
        match TokenKind::of_symbol(&self.buf) {
            Some(kind) => {
                self.register(kind);
                Ok(())
            }
            None => Err(Error::InvalidSymbol {
                line: self.line,
                lexeme: std::mem::take(&mut self.buf),
            }),
        }
    }
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
