//! # The pls toolchain
//!
//! pls is a small expression-oriented language: a program is one expression,
//! and every construct, `if`, loops, bindings, functions, objects, is a call.
//! `do( let(x, 1), println(+(x, 2)) )` is a complete program.

//! ## Lexing
//!
//! The lexer streams tokens on demand with one token of lookahead. There are
//! only seven token kinds; notably a `Word` is any run of characters that is
//! not whitespace or a delimiter, so `+`, `:=` and `obj.key` are words like
//! any other. Every token carries its byte offset, line and column.

//! ## Parsing
//!
//! Recursive descent over a grammar of two rules. The parser produces the
//! three-variant AST (`Value`, `Word`, `Call`) and precise positions in every
//! error. Bracket pairs `()` and `{}` are interchangeable but must match.

//! ## Evaluation
//!
//! A tree walk against an explicit scope chain. Call operators are checked
//! against the keyword registry first; keywords receive their argument nodes
//! unevaluated, which is how `if` short-circuits and `let` sees a name
//! instead of a value. Everything else evaluates operator and arguments and
//! applies the callable. Objects couple a field table with an environment
//! frame holding `self`.

//! ## Optimization
//!
//! A post-order rewrite folds constant operator calls and propagates `let`
//! constants through nested scopes, conservatively invalidating through
//! assignments and through calls to functions whose mutation sets it tracks.
//! Optimizing never changes what a program evaluates to.

//! ## Compilation and lowering
//!
//! The AST serializes to a `.cpls` file as a tree of type-tagged objects and
//! round-trips structurally. A small code generator can lower the AST to an
//! equivalent JavaScript expression instead.

pub mod cli;
mod codegen;
mod error;
mod interpreter;
mod lexer;
mod optimizer;
mod parser;
mod plser;
mod scope;
mod utils;

pub use codegen::generate;
pub use error::{PlsError, Result, interpreter::RuntimeError, lexer::LexError, parser::{ParseError, ParserError}};
pub use interpreter::{Interpreter, builtins, value::Value};
pub use optimizer::optimize;
pub use parser::{Parser, node::{Constant, Node}};
pub use plser::Plser;
