//! The tree-walking evaluator.
//!
//! The interpreter walks the AST against a scope chain. A `Value` node is
//! itself, a `Word` resolves through the chain, and a `Call` either dispatches
//! to a keyword (a special form that receives its argument *nodes*) or
//! evaluates its operator and arguments and applies the resulting callable.
//!
//! Keywords are looked up before the operator is evaluated, so `let(if, 1)`
//! never shadows `if`. Everything that is not a keyword is an ordinary value
//! living in the scope chain, operators included.
//!
//! Words may contain dots. A dotted word that is not itself bound resolves as
//! a member path: `obj.key` reads the `key` field of whatever `obj` names.
//! Calling such a path invokes a method; methods defined inside an `object`
//! constructor close over the object's environment frame and therefore see
//! `self`.

pub mod builtins;
pub mod callable;
pub mod object;
pub mod value;

use std::rc::Rc;

use builtins::Keyword;
use value::Value;

use crate::{error::interpreter::RuntimeError, interpreter::{callable::{Callable, CallableKind}, object::Object}, parser::node::Node, scope::{Scope, ScopeRef}};

/// Interpreter that evaluates pls programs against a persistent global scope.
pub struct Interpreter {
	globals: ScopeRef,
}

impl Default for Interpreter {
	fn default() -> Self { Self::new() }
}

impl Interpreter {
	pub fn new() -> Self {
		let top = builtins::top_scope();
		Self { globals: Scope::child(&top) }
	}

	/// Evaluate a whole program. The global frame persists across calls,
	/// which is what makes the REPL stateful.
	pub fn interpret(&self, program: &Node) -> Result<Value, RuntimeError> {
		self.evaluate(program, &self.globals)
	}

	pub fn evaluate(&self, node: &Node, scope: &ScopeRef) -> Result<Value, RuntimeError> {
		match node {
			Node::Value { value } => Ok(Value::from(value)),
			Node::Word { name } => self.lookup(name, scope),
			Node::Call { operator, args } => {
				if let Some(keyword) = operator.word_name().and_then(Keyword::lookup) {
					return self.keyword(keyword, args, scope);
				}
				let callee = self.evaluate(operator, scope)?;
				let mut values = Vec::with_capacity(args.len());
				for arg in args {
					values.push(self.evaluate(arg, scope)?);
				}
				self.call(&callee, &values)
			}
		}
	}

	/// Apply a callable to evaluated arguments.
	pub fn call(&self, callee: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
		let Value::Callable(callable) = callee else {
			return Err(RuntimeError::TypeError(format!("{} is not callable", callee.type_name())));
		};
		match &callable.kind {
			CallableKind::Native(run) => run(args),
			CallableKind::Defined { parameters, body, closure } => {
				if args.len() != parameters.len() {
					return Err(RuntimeError::TypeError(format!(
						"Expected {} arguments but got {}",
						parameters.len(),
						args.len()
					)));
				}
				let frame = Scope::child(closure);
				for (parameter, value) in parameters.iter().zip(args) {
					frame.borrow_mut().define(parameter, value.clone());
				}
				self.evaluate(body, &frame)
			}
		}
	}

	/// Resolve a word. A whole-name binding wins; otherwise a dotted word is
	/// a member path rooted at its first segment.
	fn lookup(&self, name: &str, scope: &ScopeRef) -> Result<Value, RuntimeError> {
		if let Some(value) = scope.borrow().get(name) {
			return Ok(value);
		}
		let Some((head, rest)) = name.split_once('.') else {
			return Err(Self::unbound(name));
		};
		let mut value = scope.borrow().get(head).ok_or_else(|| Self::unbound(head))?;
		for key in rest.split('.') {
			value = Self::member(&value, key)?;
		}
		Ok(value)
	}

	fn member(value: &Value, key: &str) -> Result<Value, RuntimeError> {
		match value {
			Value::Object(object) => Ok(object.get(key)),
			Value::Map(entries) => Ok(entries.borrow().get(key).cloned().unwrap_or(Value::Undefined)),
			_ => Err(RuntimeError::TypeError(format!(
				"Cannot read member '{key}' of {}",
				value.type_name()
			))),
		}
	}

	fn unbound(name: &str) -> RuntimeError {
		RuntimeError::ReferenceError(format!("Undefined binding: {name}"))
	}

	fn keyword(&self, keyword: Keyword, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		match keyword {
			Keyword::If => self.keyword_if(args, scope),
			Keyword::While => self.keyword_while(args, scope),
			Keyword::For => self.keyword_for(args, scope),
			Keyword::Foreach => self.keyword_foreach(args, scope),
			Keyword::Run => self.keyword_run(args, scope),
			Keyword::Let => self.keyword_let(args, scope),
			Keyword::Fn => self.keyword_fn(args, scope),
			Keyword::Assign => self.keyword_assign(args, scope),
			Keyword::Object => self.keyword_object(args, scope),
		}
	}

	fn keyword_if(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		if args.len() != 2 && args.len() != 3 {
			return Err(RuntimeError::SyntaxError("if expects two or three arguments".into()));
		}
		if !self.evaluate(&args[0], scope)?.is_false() {
			self.evaluate(&args[1], scope)
		} else if let Some(alternative) = args.get(2) {
			self.evaluate(alternative, scope)
		} else {
			Ok(Value::Undefined)
		}
	}

	fn keyword_while(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let [condition, body] = args else {
			return Err(RuntimeError::SyntaxError("while expects a condition and a body".into()));
		};
		let frame = Scope::child(scope);
		while !self.evaluate(condition, &frame)?.is_false() {
			self.evaluate(body, &frame)?;
		}
		Ok(Value::Undefined)
	}

	fn keyword_for(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let [init, condition, update, body] = args else {
			return Err(RuntimeError::SyntaxError(
				"for expects an initializer, a condition, an update and a body".into(),
			));
		};
		let frame = Scope::child(scope);
		self.evaluate(init, &frame)?;
		while !self.evaluate(condition, &frame)?.is_false() {
			self.evaluate(body, &frame)?;
			self.evaluate(update, &frame)?;
		}
		Ok(Value::Undefined)
	}

	fn keyword_foreach(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let [binder, iterable, body] = args else {
			return Err(RuntimeError::SyntaxError("foreach expects a word, an iterable and a body".into()));
		};
		let Some(name) = binder.word_name() else {
			return Err(RuntimeError::SyntaxError("foreach expects a word as its loop variable".into()));
		};
		let iterable = self.evaluate(iterable, scope)?;
		// Snapshot the elements so the body may mutate the container.
		let elements: Vec<Value> = match &iterable {
			Value::Array(items) => items.borrow().clone(),
			Value::Map(entries) => entries.borrow().keys().cloned().map(Value::Str).collect(),
			Value::Str(s) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
			other => {
				return Err(RuntimeError::TypeError(format!("{} is not iterable", other.type_name())));
			}
		};
		for element in elements {
			let frame = Scope::child(scope);
			frame.borrow_mut().define(name, element);
			self.evaluate(body, &frame)?;
		}
		Ok(Value::Undefined)
	}

	fn keyword_run(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let frame = Scope::child(scope);
		let mut result = Value::Undefined;
		for arg in args {
			result = self.evaluate(arg, &frame)?;
		}
		Ok(result)
	}

	fn keyword_let(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let [binder, initializer] = args else {
			return Err(RuntimeError::SyntaxError("let expects a word and a value".into()));
		};
		let Some(name) = binder.word_name() else {
			return Err(RuntimeError::SyntaxError("let expects a word as its first argument".into()));
		};
		let value = self.evaluate(initializer, scope)?;
		scope.borrow_mut().define(name, value.clone());
		Ok(value)
	}

	fn keyword_fn(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let Some((body, parameters)) = args.split_last() else {
			return Err(RuntimeError::SyntaxError("fn expects a body".into()));
		};
		let parameters = parameters
			.iter()
			.map(|parameter| {
				parameter
					.word_name()
					.map(str::to_string)
					.ok_or_else(|| RuntimeError::SyntaxError("Parameter names must be words".into()))
			})
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Value::Callable(Rc::new(Callable::defined(parameters, body.clone(), scope.clone()))))
	}

	/// `assign(target, indices..., value)`. A plain word updates the nearest
	/// enclosing frame holding it; indices route through the bound value's
	/// indexed-assign operation; a dotted word writes the member its path
	/// resolves to.
	fn keyword_assign(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		if args.len() < 2 {
			return Err(RuntimeError::SyntaxError("assign expects a target and a value".into()));
		}
		let Some(name) = args[0].word_name() else {
			return Err(RuntimeError::SyntaxError("assignment target must be a word".into()));
		};
		let value = self.evaluate(&args[args.len() - 1], scope)?;
		let indices = args[1..args.len() - 1]
			.iter()
			.map(|index| self.evaluate(index, scope))
			.collect::<Result<Vec<_>, _>>()?;
		if indices.is_empty() {
			if scope.borrow_mut().assign(name, value.clone()) {
				return Ok(value);
			}
			if name.contains('.') {
				return self.assign_member(name, value, scope);
			}
			Err(Self::unbound(name))
		} else {
			let container = self.lookup(name, scope)?;
			container.index_assign(&indices, value.clone())?;
			Ok(value)
		}
	}

	/// Resolve the container half of a dotted path and write its final key:
	/// the `{container, key}` reference behind method-style assignment.
	fn assign_member(&self, name: &str, value: Value, scope: &ScopeRef) -> Result<Value, RuntimeError> {
		let (path, key) = match name.rsplit_once('.') {
			Some(split) => split,
			None => return Err(Self::unbound(name)),
		};
		let container = self.lookup(path, scope)?;
		match &container {
			Value::Object(object) => object.set(key, value.clone()),
			Value::Map(entries) => {
				entries.borrow_mut().insert(key.to_string(), value.clone());
			}
			other => {
				return Err(RuntimeError::TypeError(format!(
					"Cannot assign member '{key}' of {}",
					other.type_name()
				)));
			}
		}
		Ok(value)
	}

	/// Build an object: an environment frame holding `self`, then the
	/// key/value pairs evaluated in that environment.
	fn keyword_object(&self, args: &[Node], scope: &ScopeRef) -> Result<Value, RuntimeError> {
		if args.len() % 2 != 0 {
			return Err(RuntimeError::SyntaxError("object expects an even number of arguments".into()));
		}
		let env = Scope::child(scope);
		let object = Rc::new(Object::new(env.clone()));
		env.borrow_mut().define("self", Value::Object(object.clone()));
		for pair in args.chunks(2) {
			let key = self.evaluate(&pair[0], &env)?;
			let Value::Str(key) = key else {
				return Err(RuntimeError::TypeError(format!(
					"Object keys must be strings, got {}",
					key.type_name()
				)));
			};
			let value = self.evaluate(&pair[1], &env)?;
			object.set(&key, value);
		}
		Ok(Value::Object(object))
	}
}
