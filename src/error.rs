use std::fmt::{Display, Formatter};

use crate::lang::location::Location;

pub type ScriptResult<T> = Result<T, ScriptError>;

/// Every failure in the pipeline is fatal and carries the location it was
/// raised at. There is no recovery and no catch surface in the language,
/// so an error anywhere terminates the whole run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptError {
    InvalidCharacter(char, Location),
    UnclosedString(Location),
    TrailingInput(char, Location),
    UnexpectedToken {
        expected: String,
        found: String,
        loc: Location,
    },
    UnexpectedEof(Location),
    InvalidNumber(String, Location),
    VariableUndefined(String, Location),
    NotCallable(String, Location),
    TypeMismatch(String, Location),
}

impl ScriptError {
    pub fn location(&self) -> &Location {
        match self {
            ScriptError::InvalidCharacter(_, loc) => loc,
            ScriptError::UnclosedString(loc) => loc,
            ScriptError::TrailingInput(_, loc) => loc,
            ScriptError::UnexpectedToken { loc, .. } => loc,
            ScriptError::UnexpectedEof(loc) => loc,
            ScriptError::InvalidNumber(_, loc) => loc,
            ScriptError::VariableUndefined(_, loc) => loc,
            ScriptError::NotCallable(_, loc) => loc,
            ScriptError::TypeMismatch(_, loc) => loc,
        }
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ScriptError::InvalidCharacter(c, _) => {
                format!("Invalid character {c}")
            }
            ScriptError::UnclosedString(_) => "Unclosed string literal starting".to_string(),
            ScriptError::TrailingInput(c, _) => {
                format!("Expected EOF but found {c}")
            }
            ScriptError::UnexpectedToken {
                expected, found, ..
            } => {
                format!("Syntax error. Expected {expected} but found {found}")
            }
            ScriptError::UnexpectedEof(_) => "Unexpected end of input".to_string(),
            ScriptError::InvalidNumber(word, _) => {
                format!("Invalid number literal {word}")
            }
            ScriptError::VariableUndefined(name, _) => {
                format!("Variable {name} is not defined")
            }
            ScriptError::NotCallable(what, _) => {
                format!("Attempt to call non-function '{what}'")
            }
            ScriptError::TypeMismatch(message, _) => message.clone(),
        };
        write!(f, "{}", self.location().render(&message))
    }
}

#[test]
fn test_error_rendering() {
    let e = ScriptError::VariableUndefined("y".into(), Location::new("demo.fun", 2, 5));
    assert_eq!(format!("{e}"), "Variable y is not defined from demo.fun at 2:5");
}
