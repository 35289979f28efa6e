pub mod location;
pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod types;
pub mod scope;
pub mod interpreter;
