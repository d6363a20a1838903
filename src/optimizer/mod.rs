//! AST-level optimizer: constant folding plus scope-aware constant
//! propagation, with conservative invalidation through aliasing.
//!
//! The pass is a post-order rewrite over three pieces of state. A stack of
//! frame chains tracks, per *separated* scope depth, which names are known
//! literals and which names are functions with a recorded mutation set. A
//! parallel stack collects the names mutated inside each separated scope;
//! popping a function literal turns that collection into the function's
//! mutation set.
//!
//! A separated scope blocks propagation from outside: a loop body or a
//! function body may run later, or many times, so a constant known before it
//! cannot be substituted inside it. Invalidation, on the other hand, always
//! crosses every boundary: once a name is assigned anywhere, no scope may
//! keep treating it as constant.
//!
//! Soundness rests on every side-effecting path going through a named
//! callable whose mutation set is tracked. Calling through anything else (a
//! chained call, an immediate function literal) wipes every tracked fact and
//! the subtree is skipped.

use std::collections::HashMap;

use crate::{interpreter::{builtins::{self, Keyword, OPERATORS}, value::Value}, parser::node::{Constant, Node}};

/// Optimize a program in place.
pub fn optimize(program: &mut Node) { Optimizer::new().walk(program); }

#[derive(Debug, Clone, PartialEq)]
enum Fact {
	/// The name is bound to this literal.
	Constant(Constant),
	/// The name is a function that may write the listed names when called.
	Mutates(Vec<String>),
	/// The name is bound to something non-literal. The entry exists to
	/// shadow any constant of the same name in an outer frame.
	Unknown,
}

type Frame = HashMap<String, Fact>;

struct Optimizer {
	/// One frame chain per separated scope depth; the innermost frame of the
	/// innermost depth is last.
	scopes:  Vec<Vec<Frame>>,
	/// Names mutated within each separated scope, collected for function
	/// mutation sets.
	mutated: Vec<Vec<String>>,
}

impl Optimizer {
	fn new() -> Self { Self { scopes: vec![vec![Frame::new()]], mutated: vec![Vec::new()] } }

	fn walk(&mut self, node: &mut Node) {
		let replacement = match node {
			Node::Value { .. } => None,
			Node::Word { name } => self.constant(name).map(|value| Node::Value { value }),
			Node::Call { operator, args } => self.call(operator, args),
		};
		if let Some(new_node) = replacement {
			*node = new_node;
		}
	}

	fn call(&mut self, operator: &mut Node, args: &mut Vec<Node>) -> Option<Node> {
		let Some(name) = operator.word_name().map(str::to_string) else {
			// Indirect callable: no way to reason about its effects.
			self.invalidate_all();
			return None;
		};
		if let Some(keyword) = Keyword::lookup(&name) {
			self.keyword(keyword, args);
			return None;
		}
		for arg in args.iter_mut() {
			self.walk(arg);
		}
		if let Some(set) = self.mutation_set(&name) {
			for mutated in set {
				self.remove(&mutated);
				self.record_mutated(mutated);
			}
		}
		self.fold(&name, args)
	}

	/// Constant folding: a fixed-operator call whose two arguments are both
	/// literals computes now, through the same operator implementation the
	/// top scope exposes.
	fn fold(&mut self, name: &str, args: &[Node]) -> Option<Node> {
		if !OPERATORS.contains(&name) || args.len() != 2 {
			return None;
		}
		let operands = match (&args[0], &args[1]) {
			(Node::Value { value: left }, Node::Value { value: right }) => {
				[Value::from(left), Value::from(right)]
			}
			_ => return None,
		};
		let folded = builtins::apply_operator(name, &operands).ok()?;
		folded.to_constant().map(|value| Node::Value { value })
	}

	fn keyword(&mut self, keyword: Keyword, args: &mut Vec<Node>) {
		match keyword {
			Keyword::If => self.keyword_if(args),
			Keyword::While => {
				self.push_separated();
				for arg in args.iter_mut() {
					self.walk(arg);
				}
				self.pop_separated_into_parent();
			}
			Keyword::For => {
				if args.len() != 4 {
					return self.walk_all(args);
				}
				// The initializer runs once and gets the outer of the two
				// scopes. Condition, update and body repeat, so they live a
				// separation deeper, out of reach of the initializer's facts.
				self.push_separated();
				self.walk(&mut args[0]);
				self.push_separated();
				self.walk(&mut args[1]);
				self.walk(&mut args[2]);
				self.walk(&mut args[3]);
				self.pop_separated_into_parent();
				self.pop_separated_into_parent();
			}
			Keyword::Foreach => {
				if args.len() != 3 || args[0].word_name().is_none() {
					return self.walk_all(args);
				}
				self.walk(&mut args[1]);
				self.push_separated();
				self.walk(&mut args[2]);
				self.pop_separated_into_parent();
			}
			Keyword::Run => {
				self.push_frame();
				self.walk_all(args);
				self.pop_frame();
			}
			Keyword::Let => self.keyword_let(args),
			Keyword::Fn => {
				// A bare literal: analyze the body in its own separated
				// scope. Assignments inside it have already invalidated
				// globally; the collected set has no name to attach to.
				if let Some(body) = args.last_mut() {
					self.push_separated();
					self.walk(body);
					self.pop_separated_discard();
				}
			}
			Keyword::Assign => self.keyword_assign(args),
			Keyword::Object => self.walk_all(args),
		}
	}

	fn walk_all(&mut self, args: &mut [Node]) {
		for arg in args.iter_mut() {
			self.walk(arg);
		}
	}

	/// Branches run conditionally, so facts they establish only survive when
	/// every path establishes them: walk each branch from the same snapshot
	/// and keep the intersection.
	fn keyword_if(&mut self, args: &mut [Node]) {
		if args.len() < 2 {
			return self.walk_all(args);
		}
		let Some((condition, branches)) = args.split_first_mut() else {
			return;
		};
		self.walk(condition);
		let before = self.scopes.clone();
		let mut joined: Option<Vec<Vec<Frame>>> = None;
		for branch in branches.iter_mut() {
			self.scopes = before.clone();
			self.walk(branch);
			joined = Some(match joined {
				None => self.scopes.clone(),
				Some(accumulated) => join(accumulated, &self.scopes),
			});
		}
		let mut joined = joined.unwrap_or_else(|| before.clone());
		if branches.len() < 2 {
			// No alternative: the skip-it-entirely path is possible too.
			joined = join(joined, &before);
		}
		self.scopes = joined;
	}

	fn keyword_let(&mut self, args: &mut [Node]) {
		let [binder, initializer] = args else {
			return self.walk_all(args);
		};
		let Some(name) = binder.word_name().map(str::to_string) else {
			return self.walk_all(args);
		};
		if let Some(body) = fn_literal_body(initializer) {
			// A function literal bound to a name: its body is a separated
			// scope and the names it mutates become the function's set.
			self.push_separated();
			self.walk(body);
			let set = self.pop_separated_take();
			self.insert(name, Fact::Mutates(set));
			return;
		}
		self.walk(initializer);
		// A binding shadows outer facts but leaves them alive; they hold
		// again once this frame pops.
		match initializer {
			Node::Value { value } => self.insert(name, Fact::Constant(value.clone())),
			_ => self.insert(name, Fact::Unknown),
		}
	}

	fn keyword_assign(&mut self, args: &mut [Node]) {
		if args.len() < 2 {
			return self.walk_all(args);
		}
		let Some(name) = args[0].word_name().map(str::to_string) else {
			// Malformed target; the evaluator will reject it. Do not walk it,
			// but keep the rest analyzed.
			return self.walk_all(&mut args[1..]);
		};
		if args.len() == 2 {
			if let Some(body) = fn_literal_body(&mut args[1]) {
				self.push_separated();
				self.walk(body);
				let set = self.pop_separated_take();
				self.record_mutated(name.clone());
				// Re-binding a known function widens its mutation set;
				// anything else just stops being constant.
				if !self.union_mutation_set(&name, &set) {
					self.remove(&name);
				}
				return;
			}
		}
		// The target word itself is never rewritten.
		self.walk_all(&mut args[1..]);
		self.remove(&name);
		self.record_mutated(name);
	}

	// -- fact table helpers ---------------------------------------------------

	/// Propagation lookup: only the current separated depth is visible.
	fn constant(&self, name: &str) -> Option<Constant> {
		for frame in self.scopes.last()?.iter().rev() {
			if let Some(fact) = frame.get(name) {
				return match fact {
					Fact::Constant(value) => Some(value.clone()),
					Fact::Mutates(_) | Fact::Unknown => None,
				};
			}
		}
		None
	}

	/// Invalidation lookup: a tracked function is found across every depth.
	fn mutation_set(&self, name: &str) -> Option<Vec<String>> {
		for chain in self.scopes.iter().rev() {
			for frame in chain.iter().rev() {
				if let Some(fact) = frame.get(name) {
					return match fact {
						Fact::Mutates(set) => Some(set.clone()),
						Fact::Constant(_) | Fact::Unknown => None,
					};
				}
			}
		}
		None
	}

	fn insert(&mut self, name: String, fact: Fact) {
		if let Some(frame) = self.scopes.last_mut().and_then(|chain| chain.last_mut()) {
			frame.insert(name, fact);
		}
	}

	/// Remove a name everywhere: assignment anywhere kills the fact in every
	/// scope.
	fn remove(&mut self, name: &str) {
		for chain in &mut self.scopes {
			for frame in chain {
				frame.remove(name);
			}
		}
	}

	/// Extend every tracked set for `name` along the chain. Returns false
	/// when the name is not a tracked function.
	fn union_mutation_set(&mut self, name: &str, set: &[String]) -> bool {
		let mut found = false;
		for chain in &mut self.scopes {
			for frame in chain {
				if let Some(Fact::Mutates(existing)) = frame.get_mut(name) {
					for entry in set {
						if !existing.contains(entry) {
							existing.push(entry.clone());
						}
					}
					found = true;
				}
			}
		}
		found
	}

	fn record_mutated(&mut self, name: String) {
		if let Some(collected) = self.mutated.last_mut() {
			if !collected.contains(&name) {
				collected.push(name);
			}
		}
	}

	fn invalidate_all(&mut self) {
		for chain in &mut self.scopes {
			for frame in chain {
				frame.clear();
			}
		}
	}

	fn push_separated(&mut self) {
		self.scopes.push(vec![Frame::new()]);
		self.mutated.push(Vec::new());
	}

	/// Leave a loop scope: its mutations are the enclosing scope's mutations
	/// too.
	fn pop_separated_into_parent(&mut self) {
		self.scopes.pop();
		if let Some(collected) = self.mutated.pop() {
			for name in collected {
				self.record_mutated(name);
			}
		}
	}

	/// Leave a function body, keeping the collected set for registration.
	fn pop_separated_take(&mut self) -> Vec<String> {
		self.scopes.pop();
		self.mutated.pop().unwrap_or_default()
	}

	fn pop_separated_discard(&mut self) {
		self.scopes.pop();
		self.mutated.pop();
	}

	fn push_frame(&mut self) {
		if let Some(chain) = self.scopes.last_mut() {
			chain.push(Frame::new());
		}
	}

	fn pop_frame(&mut self) {
		if let Some(chain) = self.scopes.last_mut() {
			chain.pop();
		}
	}
}

/// The body of a `fn`/`function`/`->` literal, when `node` is one.
fn fn_literal_body(node: &mut Node) -> Option<&mut Node> {
	let Node::Call { operator, args } = node else {
		return None;
	};
	let name = operator.word_name()?;
	if Keyword::lookup(name) != Some(Keyword::Fn) {
		return None;
	}
	args.last_mut()
}

/// Framewise intersection: a fact survives only when both sides agree on it.
fn join(mut left: Vec<Vec<Frame>>, right: &[Vec<Frame>]) -> Vec<Vec<Frame>> {
	for (left_chain, right_chain) in left.iter_mut().zip(right) {
		for (left_frame, right_frame) in left_chain.iter_mut().zip(right_chain) {
			left_frame.retain(|name, fact| right_frame.get(name) == Some(&*fact));
		}
	}
	left
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{interpreter::Interpreter, parser::Parser};

	fn optimized(input: &str) -> Node {
		let mut program = Parser::new(input).unwrap().parse().unwrap();
		optimize(&mut program);
		program
	}

	fn assert_optimizes(input: &str, rendered: &str) {
		assert_eq!(optimized(input).to_string(), rendered, "input: {input}");
	}

	/// Optimizing must not change what a program evaluates to.
	fn assert_preserves(input: &str) {
		let program = Parser::new(input).unwrap().parse().unwrap();
		let plain = Interpreter::new().interpret(&program).unwrap();
		let tuned = Interpreter::new().interpret(&optimized(input)).unwrap();
		assert_eq!(plain.to_string(), tuned.to_string(), "input: {input}");
	}

	#[test]
	fn folds_literal_arithmetic() {
		assert_optimizes("println(+(1, 2))", "println(3)");
		assert_optimizes("+(+(1, 2), *(2, 3))", "9");
		assert_optimizes("==(2, 2)", "true");
		// `true` in source is a word; only folded booleans are literals
		assert_optimizes("&&(==(1, 1), ==(1, 2))", "false");
		assert_optimizes("+(\"v\", 1)", "\"v1\"");
	}

	#[test]
	fn fold_skips_non_literal_and_failing_operands() {
		assert_optimizes("+(x, 2)", "+(x, 2)");
		// division by zero stays for the evaluator to report
		assert_optimizes("/(1, 0)", "/(1, 0)");
		assert_optimizes("-(true, 1)", "-(true, 1)");
	}

	#[test]
	fn propagates_let_constants() {
		assert_optimizes("do(let(x, 1), println(x))", "do(let(x, 1), println(1))");
		assert_optimizes("do(let(x, 2), +(x, x))", "do(let(x, 2), 4)");
	}

	#[test]
	fn propagation_respects_child_scopes() {
		// the run-block binding pops with its frame
		assert_optimizes("do(let(x, 1), run(let(x, 2), println(x)), println(x))", "do(let(x, 1), run(let(x, 2), println(2)), println(1))");
	}

	#[test]
	fn assignment_invalidates() {
		assert_optimizes("do(let(x, 1), assign(x, 2), println(x))", "do(let(x, 1), assign(x, 2), println(x))");
	}

	#[test]
	fn assignment_target_is_not_rewritten() {
		assert_optimizes("do(let(x, 1), assign(x, +(x, 1)), println(x))", "do(let(x, 1), assign(x, 2), println(x))");
	}

	#[test]
	fn call_through_tracked_function_invalidates() {
		// the mutation set of `mut` kills the later-established constant
		assert_optimizes(
			"do(let(mut, fn(assign(x, 2))), let(x, 1), mut(), println(x))",
			"do(let(mut, fn(assign(x, 2))), let(x, 1), mut(), println(x))"
		);
	}

	#[test]
	fn traversing_a_function_body_invalidates_too() {
		assert_optimizes(
			"do(let(x, 1), let(mut, fn(assign(x, 2))), mut(), println(x))",
			"do(let(x, 1), let(mut, fn(assign(x, 2))), mut(), println(x))"
		);
	}

	#[test]
	fn constants_do_not_enter_loops() {
		// the while body is a separated scope; x stays symbolic inside
		assert_optimizes(
			"do(let(x, 1), while(false, println(x)), println(x))",
			"do(let(x, 1), while(false, println(x)), println(1))"
		);
	}

	#[test]
	fn constants_do_not_enter_function_bodies() {
		assert_optimizes(
			"do(let(x, 1), let(f, fn(println(x))), f())",
			"do(let(x, 1), let(f, fn(println(x))), f())"
		);
	}

	#[test]
	fn folding_inside_separated_scopes_still_happens() {
		assert_optimizes("while(false, println(+(1, 2)))", "while(false, println(3))");
	}

	#[test]
	fn indirect_callable_resets_everything() {
		assert_optimizes(
			"do(let(x, 1), f(1)(2), println(x))",
			"do(let(x, 1), f(1)(2), println(x))"
		);
	}

	#[test]
	fn conditional_bindings_do_not_leak() {
		assert_optimizes(
			"do(let(c, f()), if(c, let(x, 5)), println(x))",
			"do(let(c, f()), if(c, let(x, 5)), println(x))"
		);
		// both branches agreeing does propagate
		assert_optimizes(
			"do(let(x, 1), if(f(), let(x, 5), let(x, 5)), println(x))",
			"do(let(x, 1), if(f(), let(x, 5), let(x, 5)), println(5))"
		);
	}

	#[test]
	fn conditional_assignment_invalidates() {
		assert_optimizes(
			"do(let(x, 1), if(f(), assign(x, 2)), println(x))",
			"do(let(x, 1), if(f(), assign(x, 2)), println(x))"
		);
	}

	#[test]
	fn rebound_function_unions_mutation_sets() {
		let program = concat!(
			"do(",
			"let(f, fn(assign(a, 1))), ",
			"let(a, 0), let(b, 0), ",
			"assign(f, fn(assign(b, 1))), ",
			"f(), ",
			"println(a), println(b))"
		);
		// after the union, calling f invalidates both a and b
		assert_optimizes(program, program);
	}

	#[test]
	fn optimization_preserves_evaluation() {
		assert_preserves("do( let(x, 1), let(f, fn(assign(x, 2))), f(), x )");
		assert_preserves("do( let(n, 0), while( <(n, 3), assign(n, +(n, 1)) ), n )");
		assert_preserves(
			"do( let(sum, 0), for( let(i, 0), <(i, 4), assign(i, +(i, 1)), assign(sum, +(sum, i)) ), sum )"
		);
		assert_preserves("do( let(x, 2), +(x, *(x, 3)) )");
		assert_preserves("do( let(sum, 0), foreach(v, arr(1, 2, 3), assign(sum, +(sum, v))), sum )");
		assert_preserves(
			"do( let(fac, fn(n, if( ==(n, 0), 1, *(n, fac(-(n, 1))) ))), fac(6) )"
		);
		assert_preserves("do( let(x, 1), if(==(x, 1), let(y, 2)), x )");
	}

	#[test]
	fn fully_literal_expression_reduces_to_one_value() {
		let node = optimized("+(*(2, 3), -(10, /(8, 2)))");
		assert!(matches!(node, Node::Value { .. }), "got {node}");
		assert_eq!(node.to_string(), "12");
	}
}
