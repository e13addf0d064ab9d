//! Token-stream artifact: one token per line, four tab-separated fields
//! (lexeme, kind name, kind id, line number). The boundary format between
//! the tokenizer and the compiler.

use crate::error::Error;
use crate::token::{Token, TokenKind};

pub fn write(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&format!(
            "{}\t{}\t{}\t{}\n",
            token.lexeme,
            token.kind,
            token.kind.id(),
            token.line
        ));
    }
    out
}

/// Re-validates every row: exactly four fields, a known kind id, and a kind
/// name that matches the id. Any mismatch invalidates the whole artifact.
pub fn read(text: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    for row in text.lines() {
        let fields: Vec<&str> = row.split('\t').collect();
        let [lexeme, name, id, line] = fields[..] else {
            return Err(Error::InvalidTokenStream);
        };
        let id: u8 = id.parse().map_err(|_| Error::InvalidTokenStream)?;
        let kind = TokenKind::from_id(id).ok_or(Error::InvalidTokenStream)?;
        if kind.to_string() != name {
            return Err(Error::InvalidTokenStream);
        }
        let line: usize = line.parse().map_err(|_| Error::InvalidTokenStream)?;
        tokens.push(Token::new(lexeme, kind, line));
    }
    Ok(tokens)
}
