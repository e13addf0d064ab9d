use bimap::BiMap;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use once_cell::sync::Lazy;
use strum::{Display, EnumString};

/// The 46 token kinds of the source language. Discriminants are the stable
/// kind ids recorded in the token-stream artifact; the variant names are the
/// symbolic kind names of the same artifact.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    EnumString,
    Display,
)]
#[repr(u8)]
pub enum TokenKind {
    SAND,
    SARRAY,
    SBEGIN,
    SBOOLEAN,
    SCHAR,
    SDIVD,
    SDO,
    SELSE,
    SEND,
    SFALSE,
    SIF,
    SINTEGER,
    SMOD,
    SNOT,
    SOF,
    SOR,
    SPROCEDURE,
    SPROGRAM,
    SREADLN,
    STHEN,
    STRUE,
    SVAR,
    SWHILE,
    SWRITELN,
    SEQUAL,
    SNOTEQUAL,
    SLESS,
    SLESSEQUAL,
    SGREATEQUAL,
    SGREAT,
    SPLUS,
    SMINUS,
    SSTAR,
    SLPAREN,
    SRPAREN,
    SLBRACKET,
    SRBRACKET,
    SSEMICOLON,
    SCOLON,
    SRANGE,
    SASSIGN,
    SCOMMA,
    SDOT,
    SIDENTIFIER,
    SCONSTANT,
    SSTRING,
}

/// Fixed lexemes (reserved words and punctuation) and their kinds.
static SYMBOLS: Lazy<BiMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    let mut map = BiMap::new();
    for (lexeme, kind) in [
        ("and", SAND),
        ("array", SARRAY),
        ("begin", SBEGIN),
        ("boolean", SBOOLEAN),
        ("char", SCHAR),
        ("div", SDIVD),
        ("do", SDO),
        ("else", SELSE),
        ("end", SEND),
        ("false", SFALSE),
        ("if", SIF),
        ("integer", SINTEGER),
        ("mod", SMOD),
        ("not", SNOT),
        ("of", SOF),
        ("or", SOR),
        ("procedure", SPROCEDURE),
        ("program", SPROGRAM),
        ("readln", SREADLN),
        ("then", STHEN),
        ("true", STRUE),
        ("var", SVAR),
        ("while", SWHILE),
        ("writeln", SWRITELN),
        ("=", SEQUAL),
        ("<>", SNOTEQUAL),
        ("<", SLESS),
        ("<=", SLESSEQUAL),
        (">=", SGREATEQUAL),
        (">", SGREAT),
        ("+", SPLUS),
        ("-", SMINUS),
        ("*", SSTAR),
        ("(", SLPAREN),
        (")", SRPAREN),
        ("[", SLBRACKET),
        ("]", SRBRACKET),
        (";", SSEMICOLON),
        (":", SCOLON),
        ("..", SRANGE),
        (":=", SASSIGN),
        (",", SCOMMA),
        (".", SDOT),
    ] {
        map.insert(lexeme, kind);
    }
    map
});

impl TokenKind {
    /// Case-sensitive reserved-word / symbol lookup. `/` is an alias lexeme
    /// for `div`.
    pub fn of_symbol(lexeme: &str) -> Option<Self> {
        if lexeme == "/" {
            return Some(TokenKind::SDIVD);
        }
        SYMBOLS.get_by_left(lexeme).copied()
    }

    pub fn id(self) -> u8 {
        self.into()
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::try_from(id).ok()
    }
}

// ----------------------------------------------------------------------------
// Token

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, kind: TokenKind, line: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_lookup() {
        assert_eq!(TokenKind::of_symbol("begin"), Some(TokenKind::SBEGIN));
        assert_eq!(TokenKind::of_symbol(":="), Some(TokenKind::SASSIGN));
        assert_eq!(TokenKind::of_symbol("/"), Some(TokenKind::SDIVD));
        assert_eq!(TokenKind::of_symbol("Begin"), None);
        assert_eq!(TokenKind::of_symbol("foo"), None);
    }

    #[test]
    fn ids_and_names() {
        assert_eq!(TokenKind::SAND.id(), 0);
        assert_eq!(TokenKind::SSTRING.id(), 45);
        assert_eq!(TokenKind::from_id(43), Some(TokenKind::SIDENTIFIER));
        assert_eq!(TokenKind::from_id(46), None);
        assert_eq!(TokenKind::SASSIGN.to_string(), "SASSIGN");
        assert_eq!("SCONSTANT".parse::<TokenKind>(), Ok(TokenKind::SCONSTANT));
    }
}
