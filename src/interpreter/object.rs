use std::{cell::RefCell, collections::BTreeMap, fmt::Debug};

use crate::{interpreter::value::Value, scope::ScopeRef};

/// An object couples a key/value table with an environment frame. The
/// environment is a child of the construction scope and holds the `self`
/// binding, so methods evaluated inside the constructor see `self` through
/// their closure. Field lookup falls back to that environment, which makes
/// the object behave as if prototyped on its construction scope.
pub struct Object {
	env:    ScopeRef,
	fields: RefCell<BTreeMap<String, Value>>,
}

impl Object {
	pub fn new(env: ScopeRef) -> Self { Self { env, fields: RefCell::new(BTreeMap::new()) } }

	/// A missing key resolves through the environment chain, then to
	/// undefined.
	pub fn get(&self, key: &str) -> Value {
		self.fields
			.borrow()
			.get(key)
			.cloned()
			.or_else(|| self.env.borrow().get(key))
			.unwrap_or(Value::Undefined)
	}

	pub fn set(&self, key: &str, value: Value) { self.fields.borrow_mut().insert(key.to_string(), value); }

	pub fn has(&self, key: &str) -> bool { self.fields.borrow().contains_key(key) }

	pub fn keys(&self) -> Vec<String> { self.fields.borrow().keys().cloned().collect() }
}

impl Debug for Object {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Object").field("keys", &self.keys()).finish()
	}
}
