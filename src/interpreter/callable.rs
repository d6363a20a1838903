use std::fmt::Debug;

use crate::{error::interpreter::RuntimeError, interpreter::value::Value, parser::node::Node, scope::ScopeRef};

pub type NativeFunction = Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// A run-time value that responds to application with an argument list.
/// Built-in operators and `fn` literals both end up here; only the body
/// differs.
pub struct Callable {
	pub name: String,
	pub kind: CallableKind,
}

pub enum CallableKind {
	Native(NativeFunction),
	/// A user function: parameter names, body, and the scope the literal was
	/// evaluated in. Application binds the parameters in a fresh frame whose
	/// parent is that definition scope.
	Defined {
		parameters: Vec<String>,
		body:       Node,
		closure:    ScopeRef,
	},
}

impl Callable {
	pub fn native(name: &str, run: NativeFunction) -> Self {
		Self { name: name.to_string(), kind: CallableKind::Native(run) }
	}

	pub fn defined(parameters: Vec<String>, body: Node, closure: ScopeRef) -> Self {
		Self { name: "fn".to_string(), kind: CallableKind::Defined { parameters, body, closure } }
	}
}

impl Debug for Callable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.kind {
			CallableKind::Native(_) => f.debug_tuple("Native").field(&self.name).finish(),
			CallableKind::Defined { parameters, .. } => {
				f.debug_struct("Defined").field("name", &self.name).field("parameters", parameters).finish()
			}
		}
	}
}
