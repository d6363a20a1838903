//! The built-in registry: keywords (special forms that receive unevaluated
//! argument nodes) and the top scope of ordinary callables and constants.
//!
//! The evaluator consults `Keyword::lookup` on every call operator *before*
//! evaluating it, so keywords cannot be shadowed by `let` or `assign`.

use std::collections::BTreeMap;

use crate::{error::interpreter::RuntimeError, interpreter::{callable::{Callable, NativeFunction}, value::Value}, scope::{Scope, ScopeRef}, utils::RcCell};

/// Special forms, dispatched on the operator word of a call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Keyword {
	If,
	While,
	For,
	Foreach,
	Run,
	Let,
	Fn,
	Assign,
	Object,
}

impl Keyword {
	pub fn lookup(name: &str) -> Option<Keyword> {
		use Keyword::*;
		match name {
			"if" => Some(If),
			"while" => Some(While),
			"for" => Some(For),
			"foreach" => Some(Foreach),
			"run" | "do" => Some(Run),
			"let" | "def" | ":=" => Some(Let),
			"fn" | "function" | "->" => Some(Fn),
			"assign" | "set" | "=" => Some(Assign),
			"object" => Some(Object),
			_ => None,
		}
	}
}

/// The fixed binary operator set. Constant folding applies to exactly these.
pub const OPERATORS: [&str; 10] = ["+", "-", "*", "/", "==", "!=", "<", ">", "&&", "||"];

/// Apply one of the fixed operators to evaluated operands. Shared between the
/// top scope and the optimizer's folding step.
pub fn apply_operator(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
	let [left, right] = args else {
		return Err(RuntimeError::TypeError(format!("'{name}' expects two arguments, got {}", args.len())));
	};
	let mismatch = || {
		RuntimeError::TypeError(format!(
			"Cannot apply '{name}' to {} and {}",
			left.type_name(),
			right.type_name()
		))
	};
	match name {
		"+" => left.plus(right).ok_or_else(mismatch),
		"-" => left.minus(right).ok_or_else(mismatch),
		"*" => left.star(right).ok_or_else(mismatch),
		"/" => left.slash(right).ok_or_else(|| match (left, right) {
			(Value::Number(_), Value::Number(_)) => RuntimeError::TypeError("Division by zero".into()),
			_ => mismatch(),
		}),
		"==" => Ok(Value::Boolean(left == right)),
		"!=" => Ok(Value::Boolean(left != right)),
		"<" => left.less(right).map(Value::Boolean).ok_or_else(mismatch),
		">" => left.greater(right).map(Value::Boolean).ok_or_else(mismatch),
		// Operand semantics: `&&` yields the right side unless the left is
		// false, `||` yields the left side unless it is false.
		"&&" => Ok(if left.is_false() { left.clone() } else { right.clone() }),
		"||" => Ok(if left.is_false() { right.clone() } else { left.clone() }),
		_ => Err(RuntimeError::TypeError(format!("Unknown operator '{name}'"))),
	}
}

/// Build the top scope: operators, constants and the utility functions.
pub fn top_scope() -> ScopeRef {
	let scope = Scope::root();
	{
		let mut top = scope.borrow_mut();
		for name in OPERATORS {
			define_native(&mut top, name, Box::new(move |args| apply_operator(name, args)));
		}
		top.define("true", Value::Boolean(true));
		top.define("false", Value::Boolean(false));
		top.define("undefined", Value::Undefined);
		define_native(&mut top, "println", Box::new(println));
		define_native(&mut top, "arr", Box::new(array));
		define_native(&mut top, "array", Box::new(array));
		define_native(&mut top, "len", Box::new(length));
		define_native(&mut top, "length", Box::new(length));
		define_native(&mut top, "element", Box::new(element));
		define_native(&mut top, "map", Box::new(map));
		define_native(&mut top, "hash", Box::new(map));
		define_native(&mut top, "has", Box::new(has));
	}
	scope
}

fn define_native(scope: &mut Scope, name: &str, run: NativeFunction) {
	scope.define(name, Value::Callable(std::rc::Rc::new(Callable::native(name, run))));
}

/// Print the arguments space-separated on one line; the result is the array
/// of the arguments.
fn println(args: &[Value]) -> Result<Value, RuntimeError> {
	let line = args.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
	println!("{line}");
	Ok(Value::Array(RcCell::new(args.to_vec())))
}

fn array(args: &[Value]) -> Result<Value, RuntimeError> { Ok(Value::Array(RcCell::new(args.to_vec()))) }

fn length(args: &[Value]) -> Result<Value, RuntimeError> {
	let [value] = args else {
		return Err(RuntimeError::TypeError(format!("len expects one argument, got {}", args.len())));
	};
	let length = value
		.len()
		.ok_or_else(|| RuntimeError::TypeError(format!("{} has no length", value.type_name())))?;
	Ok(Value::Number(length as f64))
}

/// `element(container, index, ...)` walks one container level per index.
fn element(args: &[Value]) -> Result<Value, RuntimeError> {
	let (container, indices) = match args.split_first() {
		Some(split) if !split.1.is_empty() => split,
		_ => {
			return Err(RuntimeError::TypeError(
				"element expects a container and at least one index".into(),
			));
		}
	};
	let mut value = container.clone();
	for index in indices {
		value = value.element(index)?;
	}
	Ok(value)
}

/// `map(k1, v1, k2, v2, ...)` with string keys.
fn map(args: &[Value]) -> Result<Value, RuntimeError> {
	if args.len() % 2 != 0 {
		return Err(RuntimeError::TypeError("map expects an even number of arguments".into()));
	}
	let mut entries = BTreeMap::new();
	for pair in args.chunks(2) {
		let Value::Str(key) = &pair[0] else {
			return Err(RuntimeError::TypeError(format!(
				"Map keys must be strings, got {}",
				pair[0].type_name()
			)));
		};
		entries.insert(key.clone(), pair[1].clone());
	}
	Ok(Value::Map(RcCell::new(entries)))
}

/// Membership test on maps and objects.
fn has(args: &[Value]) -> Result<Value, RuntimeError> {
	let [container, key] = args else {
		return Err(RuntimeError::TypeError(format!("has expects two arguments, got {}", args.len())));
	};
	let Value::Str(key) = key else {
		return Err(RuntimeError::TypeError(format!("has expects a string key, got {}", key.type_name())));
	};
	let found = match container {
		Value::Map(entries) => entries.borrow().contains_key(key),
		Value::Object(object) => object.has(key),
		_ => {
			return Err(RuntimeError::TypeError(format!(
				"has expects a map or an object, got {}",
				container.type_name()
			)));
		}
	};
	Ok(Value::Boolean(found))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keyword_aliases() {
		assert_eq!(Keyword::lookup("run"), Some(Keyword::Run));
		assert_eq!(Keyword::lookup("do"), Some(Keyword::Run));
		assert_eq!(Keyword::lookup(":="), Some(Keyword::Let));
		assert_eq!(Keyword::lookup("->"), Some(Keyword::Fn));
		assert_eq!(Keyword::lookup("="), Some(Keyword::Assign));
		assert_eq!(Keyword::lookup("println"), None);
	}

	#[test]
	fn arithmetic_operators() {
		let n = Value::Number;
		assert_eq!(apply_operator("+", &[n(1.0), n(2.0)]).unwrap(), n(3.0));
		assert_eq!(apply_operator("-", &[n(5.0), n(2.0)]).unwrap(), n(3.0));
		assert_eq!(apply_operator("*", &[n(4.0), n(2.5)]).unwrap(), n(10.0));
		assert_eq!(apply_operator("/", &[n(9.0), n(2.0)]).unwrap(), n(4.5));
		assert!(apply_operator("/", &[n(1.0), n(0.0)]).is_err());
		assert!(apply_operator("-", &[n(1.0), Value::Str("x".into())]).is_err());
	}

	#[test]
	fn comparison_operators() {
		let n = Value::Number;
		assert_eq!(apply_operator("<", &[n(1.0), n(2.0)]).unwrap(), Value::Boolean(true));
		assert_eq!(apply_operator(">", &[n(1.0), n(2.0)]).unwrap(), Value::Boolean(false));
		assert_eq!(apply_operator("==", &[n(2.0), n(2.0)]).unwrap(), Value::Boolean(true));
		assert_eq!(
			apply_operator("!=", &[Value::Str("a".into()), Value::Str("b".into())]).unwrap(),
			Value::Boolean(true)
		);
	}

	#[test]
	fn logical_operators_return_operands() {
		let t = Value::Boolean(true);
		let f = Value::Boolean(false);
		assert_eq!(apply_operator("&&", &[t.clone(), Value::Number(3.0)]).unwrap(), Value::Number(3.0));
		assert_eq!(apply_operator("&&", &[f.clone(), Value::Number(3.0)]).unwrap(), f);
		assert_eq!(apply_operator("||", &[f, Value::Number(3.0)]).unwrap(), Value::Number(3.0));
		assert_eq!(apply_operator("||", &[Value::Number(1.0), Value::Number(3.0)]).unwrap(), Value::Number(1.0));
	}

	#[test]
	fn top_scope_constants() {
		let top = top_scope();
		assert_eq!(top.borrow().get("true"), Some(Value::Boolean(true)));
		assert_eq!(top.borrow().get("undefined"), Some(Value::Undefined));
		assert!(matches!(top.borrow().get("println"), Some(Value::Callable(_))));
		assert!(matches!(top.borrow().get("arr"), Some(Value::Callable(_))));
	}
}
