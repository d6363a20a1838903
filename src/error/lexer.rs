/// The single lexical error shape. The offending text is the rest of the
/// source line at the point where no token rule matched.
#[derive(thiserror::Error, Debug)]
#[error("Invalid token: {text} at line {line} and column {column}")]
pub struct LexError {
	pub text:   String,
	pub line:   usize,
	pub column: usize,
}

impl LexError {
	pub fn new(text: impl Into<String>, line: usize, column: usize) -> Self {
		Self { text: text.into(), line, column }
	}
}
