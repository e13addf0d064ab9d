pub mod check;
pub mod codegen;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod optimizer;
pub mod symtab;
pub mod token;
pub mod ts;
pub mod types;

pub use compiler::compile;
pub use error::Error;
pub use lexer::Lexer;
pub use optimizer::optimize;
pub use token::{Token, TokenKind};
