/// Errors raised during evaluation. Nothing catches these inside the
/// evaluator; they propagate to the top-level call.
#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
	/// Structural keyword misuse: wrong arity or argument shape.
	#[error("SyntaxError: {0}")]
	SyntaxError(String),
	/// Wrong callable arity or an operation on a value of the wrong shape.
	#[error("TypeError: {0}")]
	TypeError(String),
	/// Lookup of, or assignment to, an unbound name.
	#[error("ReferenceError: {0}")]
	ReferenceError(String),
}
