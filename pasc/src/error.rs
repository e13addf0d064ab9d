use thiserror::Error;

/// Unified error type for the whole pipeline. Compilation is fail-fast: the
/// first error aborts the run and becomes the single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Lexical errors
    #[error("Line {line}: error: Invalid character '{c}'")]
    InvalidCharacter { line: usize, c: char },

    #[error("Line {line}: error: Invalid constant \"{lexeme}\"")]
    InvalidConstant { line: usize, lexeme: String },

    #[error("Line {line}: error: Unterminated {{ comment")]
    UnterminatedComment { line: usize },

    #[error("Line {line}: error: Null string")]
    NullString { line: usize },

    #[error("Line {line}: error: Unterminated string in single line")]
    UnterminatedString { line: usize },

    // Unreachable for well-formed punctuation runs; kept as a guard.
    #[error("Line {line}: error: Invalid symbol \"{lexeme}\"")]
    InvalidSymbol { line: usize, lexeme: String },

    // Compile errors
    #[error("Syntax error: line {line}")]
    Syntax { line: usize },

    #[error("Semantic error: line {line}")]
    Semantic { line: usize },

    #[error("Invalid extra data")]
    ExtraData,

    // Artifact errors
    #[error("Invalid token stream")]
    InvalidTokenStream,

    #[error("Invalid assembly line {line}")]
    InvalidAssembly { line: usize },

    // I/O errors
    #[error("File not found")]
    FileNotFound,

    #[error("Unexpected IO exception")]
    Io,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound,
            _ => Error::Io,
        }
    }
}
