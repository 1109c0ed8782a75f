//! A Rust implementation of the Monkey programming language from
//! <https://interpreterbook.com/>.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod repl;
pub mod token;
