//! The abstract syntax tree. Three shapes cover the whole language: a
//! literal, a name, and an application of an operator expression to an
//! argument list. Everything else (`if`, `let`, functions, objects) is a
//! `Call` whose operator word the evaluator recognizes as a keyword.
//!
//! Nodes serialize as a tree of tagged objects (`type` discriminator), which
//! is the on-disk `.cpls` form. Deserializing a serialized tree yields a
//! structurally equal tree.

use serde::{Deserialize, Serialize};

/// A literal value as it appears in the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constant {
	/// Serialized as `null`.
	Undefined,
	Boolean(bool),
	Number(f64),
	Str(String),
}

/// An AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
	Value { value: Constant },
	Word { name: String },
	Call { operator: Box<Node>, args: Vec<Node> },
}

impl Node {
	pub fn value(value: Constant) -> Self { Node::Value { value } }

	pub fn word(name: impl Into<String>) -> Self { Node::Word { name: name.into() } }

	pub fn call(operator: Node, args: Vec<Node>) -> Self {
		Node::Call { operator: Box::new(operator), args }
	}

	/// The word name when this node is a `Word`.
	pub fn word_name(&self) -> Option<&str> {
		match self {
			Node::Word { name } => Some(name),
			_ => None,
		}
	}
}

impl std::fmt::Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Node::Value { value } => write!(f, "{value}"),
			Node::Word { name } => write!(f, "{name}"),
			Node::Call { operator, args } => {
				write!(f, "{operator}(")?;
				for (i, arg) in args.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{arg}")?;
				}
				write!(f, ")")
			}
		}
	}
}

impl std::fmt::Display for Constant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Constant::Undefined => write!(f, "undefined"),
			Constant::Boolean(b) => write!(f, "{b}"),
			Constant::Number(n) => {
				if n.is_finite() && n.fract() == 0.0 {
					write!(f, "{}", *n as i64)
				} else {
					write!(f, "{n}")
				}
			}
			Constant::Str(s) => write!(f, "\"{s}\""),
		}
	}
}
