use crate::error::{ScriptError, ScriptResult};
use crate::lang::location::Location;
use crate::lang::token::{Token, TokenKind};

const KEYWORDS: [&str; 4] = ["fun", "val", "if", "else"];

const OPERATORS: &str = "<>=+-*/";
const SYMBOLS: &str = "()[]{},";

fn identifier_init(c: char) -> bool {
    c.is_ascii_lowercase()
}
fn identifier_body(c: char) -> bool {
    c.is_ascii_alphanumeric()
}
fn module_init(c: char) -> bool {
    c.is_ascii_uppercase()
}
fn module_body(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '.'
}
fn operator_char(c: char) -> bool {
    OPERATORS.contains(c)
}
fn symbol_init(c: char) -> bool {
    SYMBOLS.contains(c)
}
fn symbol_body(_: char) -> bool {
    false
}
fn number_init(c: char) -> bool {
    c.is_ascii_digit()
}
fn number_body(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

struct WordRule {
    kind: TokenKind,
    init: fn(char) -> bool,
    body: fn(char) -> bool,
}

/// Checked in order; the first rule whose `init` class matches the leading
/// character claims the word and extends it greedily through its `body`
/// class. No two `init` classes overlap today, but the fixed order is what
/// would resolve an ambiguity if the token set grows.
const RULES: [WordRule; 5] = [
    WordRule {
        kind: TokenKind::Identifier,
        init: identifier_init,
        body: identifier_body,
    },
    WordRule {
        kind: TokenKind::ModuleRef,
        init: module_init,
        body: module_body,
    },
    WordRule {
        kind: TokenKind::Operator,
        init: operator_char,
        body: operator_char,
    },
    WordRule {
        kind: TokenKind::Symbol,
        init: symbol_init,
        body: symbol_body,
    },
    WordRule {
        kind: TokenKind::NumberLiteral,
        init: number_init,
        body: number_body,
    },
];

#[derive(Debug, Clone)]
pub struct Lexer {
    source_file: String,
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn from_script(source_file: impl Into<String>, script: impl AsRef<str>) -> Self {
        Self {
            source_file: source_file.into(),
            chars: script.as_ref().chars().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }
    fn here(&self) -> Location {
        Location::new(self.source_file.as_str(), self.line, self.column)
    }
    /// Converts the whole script into tokens, ending with one EOF token.
    pub fn lex(&mut self) -> ScriptResult<Vec<Token>> {
        let mut tokens = vec![];
        loop {
            self.eat_whitespace();
            // Take the location now so errors point at the start of a word,
            // not the middle of it.
            let loc = self.here();
            if self.index == self.chars.len() {
                tokens.push(Token::eof(loc));
                // Nothing may follow the EOF token.
                self.eat_whitespace();
                if self.index != self.chars.len() {
                    return Err(ScriptError::TrailingInput(self.chars[self.index], self.here()));
                }
                return Ok(tokens);
            }
            let next = self.chars[self.index];
            self.index += 1;
            self.column += 1;
            if next == '"' {
                tokens.push(self.eat_string(loc)?);
            } else {
                tokens.push(self.eat_word(next, loc)?);
            }
        }
    }
    fn eat_whitespace(&mut self) {
        while self.index < self.chars.len() {
            let next = self.chars[self.index];
            if next == ' ' || next == '\t' || next == '\r' {
                self.index += 1;
                self.column += 1;
            } else if next == '\n' {
                self.index += 1;
                self.line += 1;
                self.column = 1;
            } else {
                return;
            }
        }
    }
    fn eat_word(&mut self, next: char, loc: Location) -> ScriptResult<Token> {
        for rule in &RULES {
            if !(rule.init)(next) {
                continue;
            }
            let mut word = String::from(next);
            while self.index < self.chars.len() && (rule.body)(self.chars[self.index]) {
                word.push(self.chars[self.index]);
                self.index += 1;
                self.column += 1;
            }
            if KEYWORDS.contains(&word.as_str()) {
                return Ok(Token::new(TokenKind::Keyword, word, loc));
            }
            return Ok(Token::new(rule.kind, word, loc));
        }
        Err(ScriptError::InvalidCharacter(next, loc))
    }
    fn eat_string(&mut self, loc: Location) -> ScriptResult<Token> {
        // Multiline strings are allowed; escapes are not interpreted.
        let mut word = String::new();
        while self.index < self.chars.len() {
            let maybe_quote = self.chars[self.index];
            self.index += 1;
            self.column += 1;
            if maybe_quote == '"' {
                return Ok(Token::new(TokenKind::StringLiteral, word, loc));
            }
            word.push(maybe_quote);
            if maybe_quote == '\n' {
                self.line += 1;
                self.column = 1;
            }
        }
        Err(ScriptError::UnclosedString(loc))
    }
}

#[cfg(test)]
fn lex_all(script: &str) -> ScriptResult<Vec<Token>> {
    Lexer::from_script("test.fun", script).lex()
}

#[test]
fn test_lex_function_header() {
    let tokens = lex_all("fun main() = 3.5").unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,
            TokenKind::Identifier,
            TokenKind::Symbol,
            TokenKind::Symbol,
            TokenKind::Operator,
            TokenKind::NumberLiteral,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[5].word, "3.5");
    assert_eq!(tokens[6].word, "");
}

#[test]
fn test_string_literal_strips_quotes() {
    let tokens = lex_all("\"abc\"").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    assert_eq!(tokens[0].word, "abc");
}

#[test]
fn test_multiline_string_tracks_lines() {
    let tokens = lex_all("\"a\nb\" x").unwrap();
    assert_eq!(tokens[0].word, "a\nb");
    // x sits on line 2, after the closing quote and a space.
    assert_eq!(tokens[1].loc.line, 2);
    assert_eq!(tokens[1].loc.column, 4);
}

#[test]
fn test_keywords_reclassified() {
    let tokens = lex_all("if else fun val iffy").unwrap();
    for token in &tokens[0..4] {
        assert_eq!(token.kind, TokenKind::Keyword);
    }
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].word, "iffy");
}

#[test]
fn test_module_reference() {
    let tokens = lex_all("List.build").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::ModuleRef);
    assert_eq!(tokens[0].word, "List.build");
    assert_eq!(tokens.len(), 2);
}

#[test]
fn test_operators_are_greedy() {
    let tokens = lex_all("a == b").unwrap();
    assert_eq!(tokens[1].kind, TokenKind::Operator);
    assert_eq!(tokens[1].word, "==");
}

#[test]
fn test_line_and_column_tracking() {
    let tokens = lex_all("a\n b").unwrap();
    assert_eq!((tokens[0].loc.line, tokens[0].loc.column), (1, 1));
    assert_eq!((tokens[1].loc.line, tokens[1].loc.column), (2, 2));
}

#[test]
fn test_invalid_character() {
    let err = lex_all("fun @").unwrap_err();
    assert_eq!(err, ScriptError::InvalidCharacter('@', Location::new("test.fun", 1, 5)));
}

#[test]
fn test_unclosed_string() {
    let err = lex_all("\"abc").unwrap_err();
    match err {
        ScriptError::UnclosedString(loc) => assert_eq!((loc.line, loc.column), (1, 1)),
        e => panic!("expected unclosed string error, got {e}"),
    }
}

#[test]
fn test_lexing_is_deterministic() {
    let script = "fun main() = { val x = 1 x }";
    assert_eq!(lex_all(script).unwrap(), lex_all(script).unwrap());
}
