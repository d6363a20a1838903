pub mod interpreter;
pub mod lexer;
pub mod parser;

/// PlsError is the top-level error type for the pls toolchain.
#[derive(thiserror::Error, Debug)]
pub enum PlsError {
	/// Internal toolchain error, should never happen
	#[error("InternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	#[error(transparent)]
	Lex(#[from] lexer::LexError),
	#[error(transparent)]
	Parse(#[from] parser::ParserError),
	#[error(transparent)]
	Runtime(#[from] interpreter::RuntimeError),
}

pub type Result<T, E = PlsError> = std::result::Result<T, E>;
