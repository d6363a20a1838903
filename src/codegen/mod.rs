//! Source-to-source lowering of the AST to an equivalent JavaScript
//! expression string.
//!
//! Keyword forms map onto JS constructs: `run` becomes a comma sequence,
//! `if` a conditional, the loop forms become arrow IIFEs, `let` becomes an
//! assignment whose name is hoisted into a `let` prologue by the surrounding
//! function wrapper. Each function literal starts its own hoisting collector
//! so its bindings stay inside it.
//!
//! Word characters that JS identifiers cannot carry are rewritten to `_`;
//! dots survive as member paths.

use crate::{interpreter::builtins::{Keyword, OPERATORS}, parser::node::{Constant, Node}};

/// Lower a program to a single JavaScript expression.
pub fn generate(program: &Node) -> String {
	let mut generator = Generator::default();
	let body = generator.expression(program);
	generator.hoisted(body)
}

#[derive(Default)]
struct Generator {
	declared: Vec<String>,
}

impl Generator {
	/// Wrap `body` in an IIFE declaring the collected names, when any.
	fn hoisted(&self, body: String) -> String {
		if self.declared.is_empty() {
			body
		} else {
			format!("(() => {{ let {}; return {}; }})()", self.declared.join(", "), body)
		}
	}

	fn expression(&mut self, node: &Node) -> String {
		match node {
			Node::Value { value } => literal(value),
			Node::Word { name } => identifier(name),
			Node::Call { operator, args } => {
				if let Some(name) = operator.word_name() {
					if let Some(keyword) = Keyword::lookup(name) {
						return self.keyword(keyword, args);
					}
					if OPERATORS.contains(&name) && args.len() == 2 {
						let left = self.expression(&args[0]);
						let right = self.expression(&args[1]);
						let op = match name {
							"==" => "===",
							"!=" => "!==",
							other => other,
						};
						return format!("({left} {op} {right})");
					}
					if name == "println" {
						return format!("console.log({})", self.list(args));
					}
				}
				format!("{}({})", self.expression(operator), self.list(args))
			}
		}
	}

	fn list(&mut self, args: &[Node]) -> String {
		args.iter().map(|arg| self.expression(arg)).collect::<Vec<_>>().join(", ")
	}

	fn keyword(&mut self, keyword: Keyword, args: &[Node]) -> String {
		let needed = match keyword {
			Keyword::If | Keyword::While | Keyword::Let | Keyword::Assign => 2,
			Keyword::Foreach => 3,
			Keyword::For => 4,
			Keyword::Run | Keyword::Fn | Keyword::Object => 0,
		};
		if args.len() < needed {
			// Malformed keyword use; the evaluator rejects it, emit a marker.
			return "undefined".into();
		}
		match keyword {
			Keyword::If => {
				let condition = self.expression(&args[0]);
				let consequent = self.expression(&args[1]);
				let alternative =
					args.get(2).map(|node| self.expression(node)).unwrap_or_else(|| "undefined".into());
				format!("(({condition}) !== false ? {consequent} : {alternative})")
			}
			Keyword::While => {
				let condition = self.expression(&args[0]);
				let body = self.expression(&args[1]);
				format!("(() => {{ while (({condition}) !== false) {{ {body}; }} }})()")
			}
			Keyword::For => {
				let init = self.expression(&args[0]);
				let condition = self.expression(&args[1]);
				let update = self.expression(&args[2]);
				let body = self.expression(&args[3]);
				format!("(() => {{ {init}; while (({condition}) !== false) {{ {body}; {update}; }} }})()")
			}
			Keyword::Foreach => {
				let binder = identifier(args[0].word_name().unwrap_or("_"));
				let iterable = self.expression(&args[1]);
				let body = self.expression(&args[2]);
				self.declared.push(binder.clone());
				format!("(() => {{ for ({binder} of {iterable}) {{ {body}; }} }})()")
			}
			Keyword::Run => {
				if args.is_empty() {
					"undefined".into()
				} else {
					format!("({})", self.list(args))
				}
			}
			Keyword::Let => {
				let name = identifier(args[0].word_name().unwrap_or("_"));
				if !self.declared.contains(&name) {
					self.declared.push(name.clone());
				}
				format!("({name} = {})", self.expression(&args[1]))
			}
			Keyword::Fn => {
				let (body, parameters) = match args.split_last() {
					Some(split) => split,
					None => return "(() => undefined)".into(),
				};
				let parameters = parameters
					.iter()
					.map(|parameter| identifier(parameter.word_name().unwrap_or("_")))
					.collect::<Vec<_>>()
					.join(", ");
				// fresh collector: the function's bindings hoist here
				let mut inner = Generator::default();
				let body = inner.expression(body);
				format!("(({parameters}) => {})", inner.hoisted(body))
			}
			Keyword::Assign => {
				let target = identifier(args[0].word_name().unwrap_or("_"));
				let value = self.expression(&args[args.len() - 1]);
				let indices = args[1..args.len() - 1]
					.iter()
					.map(|index| format!("[{}]", self.expression(index)))
					.collect::<String>();
				format!("({target}{indices} = {value})")
			}
			Keyword::Object => {
				let mut parts = vec!["const self = {}".to_string()];
				for pair in args.chunks(2) {
					if let [key, value] = pair {
						let key = self.expression(key);
						let value = self.expression(value);
						parts.push(format!("self[{key}] = {value}"));
					}
				}
				format!("(() => {{ {}; return self; }})()", parts.join("; "))
			}
		}
	}
}

fn literal(value: &Constant) -> String {
	match value {
		Constant::Undefined => "undefined".into(),
		Constant::Boolean(b) => b.to_string(),
		Constant::Number(_) => value.to_string(),
		Constant::Str(s) => quote(s),
	}
}

fn quote(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

/// Rewrite a word into something JS accepts. Dots separate member paths and
/// survive; anything else an identifier cannot carry becomes `_`.
fn identifier(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	for (i, c) in name.chars().enumerate() {
		if c.is_alphanumeric() && !(i == 0 && c.is_ascii_digit()) || c == '_' || c == '$' || c == '.' {
			out.push(c);
		} else {
			out.push('_');
		}
	}
	out
}
