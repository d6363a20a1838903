//! Name resolution walks a chain of frames from the innermost outward. The
//! outermost frame is the top scope holding the built-ins; every `run` block,
//! loop, function activation and object construction pushes a child frame for
//! the dynamic extent of that construct.

use std::collections::HashMap;

use crate::{interpreter::value::Value, utils::RcCell};

pub type ScopeRef = RcCell<Scope>;

pub struct Scope {
	bindings: HashMap<String, Value>,
	parent:   Option<ScopeRef>,
}

impl Scope {
	pub fn root() -> ScopeRef { RcCell::new(Self { bindings: HashMap::new(), parent: None }) }

	pub fn child(parent: &ScopeRef) -> ScopeRef {
		RcCell::new(Self { bindings: HashMap::new(), parent: Some(parent.clone()) })
	}

	/// Look a name up along the chain.
	pub fn get(&self, name: &str) -> Option<Value> {
		self.bindings
			.get(name)
			.cloned()
			.or_else(|| self.parent.as_ref().and_then(|parent| parent.borrow().get(name)))
	}

	/// Binding writes into this frame, shadowing any outer binding.
	pub fn define(&mut self, name: &str, value: Value) { self.bindings.insert(name.to_string(), value); }

	/// Assignment updates the nearest enclosing frame that already holds the
	/// name. Returns false when no frame does.
	pub fn assign(&mut self, name: &str, value: Value) -> bool {
		if let Some(slot) = self.bindings.get_mut(name) {
			*slot = value;
			true
		} else if let Some(parent) = &self.parent {
			parent.borrow_mut().assign(name, value)
		} else {
			false
		}
	}
}
