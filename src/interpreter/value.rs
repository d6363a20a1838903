use std::{collections::BTreeMap, fmt::Display, rc::Rc};

use Value::*;

use crate::{error::interpreter::RuntimeError, interpreter::{callable::Callable, object::Object}, parser::node::Constant, utils::RcCell};

/// Value represents a runtime value in pls. Scalars copy; arrays, maps,
/// objects and callables clone as shared references.
#[derive(Debug, Clone)]
pub enum Value {
	Undefined,
	Boolean(bool),
	Number(f64),
	Str(String),
	Array(RcCell<Vec<Value>>),
	Map(RcCell<BTreeMap<String, Value>>),
	Object(Rc<Object>),
	Callable(Rc<Callable>),
}

impl PartialEq for Value {
	/// Scalars compare by value, containers and callables by identity.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Undefined, Undefined) => true,
			(Boolean(l), Boolean(r)) => l == r,
			(Number(l), Number(r)) => l == r,
			(Str(l), Str(r)) => l == r,
			(Array(l), Array(r)) => l.ptr_eq(r),
			(Map(l), Map(r)) => l.ptr_eq(r),
			(Object(l), Object(r)) => Rc::ptr_eq(l, r),
			(Callable(l), Callable(r)) => Rc::ptr_eq(l, r),
			_ => false,
		}
	}
}

impl From<&Constant> for Value {
	fn from(constant: &Constant) -> Self {
		match constant {
			Constant::Undefined => Undefined,
			Constant::Boolean(b) => Boolean(*b),
			Constant::Number(n) => Number(*n),
			Constant::Str(s) => Str(s.clone()),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Undefined => write!(f, "undefined"),
			Boolean(b) => write!(f, "{b}"),
			Number(n) => {
				if n.is_finite() && n.fract() == 0.0 {
					write!(f, "{}", *n as i64)
				} else {
					write!(f, "{n}")
				}
			}
			Str(s) => write!(f, "{s}"),
			Array(items) => {
				write!(f, "[")?;
				for (i, item) in items.borrow().iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			Map(entries) => {
				write!(f, "{{")?;
				for (i, (key, value)) in entries.borrow().iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				write!(f, "}}")
			}
			// Objects can hold themselves, print keys only.
			Object(object) => {
				write!(f, "object {{")?;
				for (i, key) in object.keys().iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key}")?;
				}
				write!(f, "}}")
			}
			Callable(callable) => write!(f, "function {}", callable.name),
		}
	}
}

impl Value {
	/// Only the boolean `false` is false in a condition.
	pub fn is_false(&self) -> bool { matches!(self, Boolean(false)) }

	pub fn type_name(&self) -> &'static str {
		match self {
			Undefined => "undefined",
			Boolean(_) => "boolean",
			Number(_) => "number",
			Str(_) => "string",
			Array(_) => "array",
			Map(_) => "map",
			Object(_) => "object",
			Callable(_) => "function",
		}
	}

	/// The literal form of this value, when it has one. Containers and
	/// callables do not; the optimizer only tracks values that do.
	pub fn to_constant(&self) -> Option<Constant> {
		match self {
			Undefined => Some(Constant::Undefined),
			Boolean(b) => Some(Constant::Boolean(*b)),
			Number(n) => Some(Constant::Number(*n)),
			Str(s) => Some(Constant::Str(s.clone())),
			_ => None,
		}
	}

	/// Tries to add two values. Numbers add; if either side is a string the
	/// result is the concatenation of the displays.
	pub fn plus(&self, other: &Self) -> Option<Value> {
		match (self, other) {
			(Number(l), Number(r)) => Some(Number(l + r)),
			(Str(_), _) | (_, Str(_)) => Some(Str(format!("{self}{other}"))),
			_ => None,
		}
	}

	pub fn minus(&self, other: &Self) -> Option<Value> {
		match (self, other) {
			(Number(l), Number(r)) => Some(Number(l - r)),
			_ => None,
		}
	}

	pub fn star(&self, other: &Self) -> Option<Value> {
		match (self, other) {
			(Number(l), Number(r)) => Some(Number(l * r)),
			_ => None,
		}
	}

	pub fn slash(&self, other: &Self) -> Option<Value> {
		match (self, other) {
			(Number(l), Number(r)) => {
				if *r == 0.0 {
					return None;
				}
				Some(Number(l / r))
			}
			_ => None,
		}
	}

	pub fn less(&self, other: &Self) -> Option<bool> {
		match (self, other) {
			(Number(l), Number(r)) => Some(l < r),
			_ => None,
		}
	}

	pub fn greater(&self, other: &Self) -> Option<bool> {
		match (self, other) {
			(Number(l), Number(r)) => Some(l > r),
			_ => None,
		}
	}

	/// Number of elements, entries or characters.
	pub fn len(&self) -> Option<usize> {
		match self {
			Array(items) => Some(items.borrow().len()),
			Map(entries) => Some(entries.borrow().len()),
			Str(s) => Some(s.chars().count()),
			_ => None,
		}
	}

	/// Read one indexing step: array by number, map and object by string key,
	/// string by character position.
	pub fn element(&self, index: &Value) -> Result<Value, RuntimeError> {
		match (self, index) {
			(Array(items), Number(n)) => {
				let items = items.borrow();
				Self::array_index(*n, items.len()).map(|i| items[i].clone())
			}
			(Array(_), other) => {
				Err(RuntimeError::TypeError(format!("Array indices must be numbers, got {}", other.type_name())))
			}
			(Map(entries), Str(key)) => Ok(entries.borrow().get(key).cloned().unwrap_or(Undefined)),
			(Map(_), other) => {
				Err(RuntimeError::TypeError(format!("Map keys must be strings, got {}", other.type_name())))
			}
			(Object(object), Str(key)) => Ok(object.get(key)),
			(Str(s), Number(n)) => {
				let length = s.chars().count();
				let i = Self::array_index(*n, length)?;
				Ok(Str(s.chars().nth(i).map(String::from).unwrap_or_default()))
			}
			_ => Err(RuntimeError::TypeError(format!("Cannot index into {}", self.type_name()))),
		}
	}

	/// The indexed-assign operation. Containers that lack it reject the
	/// write. Intermediate indices walk nested containers.
	pub fn index_assign(&self, indices: &[Value], value: Value) -> Result<(), RuntimeError> {
		let (index, rest) = match indices.split_first() {
			Some(split) => split,
			None => return Err(RuntimeError::TypeError("Indexed assignment needs an index".into())),
		};
		if !rest.is_empty() {
			return self.element(index)?.index_assign(rest, value);
		}
		match (self, index) {
			(Array(items), Number(n)) => {
				let mut items = items.borrow_mut();
				let len = items.len();
				let i = Self::array_index(*n, len)?;
				items[i] = value;
				Ok(())
			}
			(Array(_), other) => {
				Err(RuntimeError::TypeError(format!("Array indices must be numbers, got {}", other.type_name())))
			}
			(Map(entries), Str(key)) => {
				entries.borrow_mut().insert(key.clone(), value);
				Ok(())
			}
			(Map(_), other) => {
				Err(RuntimeError::TypeError(format!("Map keys must be strings, got {}", other.type_name())))
			}
			(Object(object), Str(key)) => {
				object.set(key, value);
				Ok(())
			}
			_ => Err(RuntimeError::TypeError(format!(
				"{} does not support indexed assignment",
				self.type_name()
			))),
		}
	}

	fn array_index(n: f64, len: usize) -> Result<usize, RuntimeError> {
		let i = n as usize;
		if n.fract() != 0.0 || n < 0.0 || i >= len {
			return Err(RuntimeError::TypeError(format!("Index {n} out of bounds for length {len}")));
		}
		Ok(i)
	}
}
