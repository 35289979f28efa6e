use crate::lang::location::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    /// Capitalized dotted path, like `Core.+` or `List.build`.
    ModuleRef,
    Operator,
    Symbol,
    Keyword,
    StringLiteral,
    NumberLiteral,
    Eof,
}

/// A single word of source, from keywords like `fun` to operators like `+`.
/// Tokens are produced once by the lexer and consumed once by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub word: String,
    pub loc: Location,
}

impl Token {
    pub fn new(kind: TokenKind, word: impl Into<String>, loc: Location) -> Self {
        Self {
            kind,
            word: word.into(),
            loc,
        }
    }
    pub fn eof(loc: Location) -> Self {
        Self {
            kind: TokenKind::Eof,
            word: String::new(),
            loc,
        }
    }
}
