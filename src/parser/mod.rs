//! Recursive-descent parser over the streaming lexer.
//!
//! The grammar is tiny; the whole language is expressions:
//!
//! ``` BNF
//! program    -> expression EndOfInput ;
//! expression -> Word call_tail* | Value ;
//! call_tail  -> "(" ( expression ( "," expression )* )? ")"
//!             | "{" ( expression ( "," expression )* )? "}" ;
//! ```
//!
//! `()` and `{}` are interchangeable but must match; the opener decides the
//! closer. A call tail may only follow an expression whose parse began with a
//! word, and tails chain left-associatively, so `f(x)(y)` parses as
//! `Call(Call(f, [x]), [y])`. The tail loop is a loop rather than recursion
//! on purpose: argument lists can be long and the recursion would be tail
//! recursion anyway.

pub mod node;

use node::{Constant, Node};

use crate::{error::parser::{ParseError, ParseErrorType, ParserError}, lexer::{Lexer, Token, TokenType}};

pub struct Parser {
	lexer: Lexer,
}

impl Parser {
	pub fn new(source: &str) -> Result<Self, ParserError> { Ok(Self { lexer: Lexer::new(source)? }) }

	/// Parse a whole program: one expression followed by end of input. The
	/// post-program guard names the leftover token kind, which is how stray
	/// closers and commas get their own messages.
	pub fn parse(mut self) -> Result<Node, ParserError> {
		let program = self.expression()?;
		let token = self.lexer.peek();
		let r#type = match token.r#type {
			TokenType::EndOfInput => return Ok(program),
			TokenType::RightParen(_) => ParseErrorType::UnmatchedParenthesis,
			TokenType::Comma => ParseErrorType::CommaAfterProgram,
			_ => ParseErrorType::TextAfterProgram,
		};
		Err(ParseError::new(token.line, token.column, r#type).into())
	}

	fn expression(&mut self) -> Result<Node, ParserError> {
		let token = self.lexer.advance()?;
		match token.r#type {
			TokenType::Str(value) => Ok(Node::value(Constant::Str(value))),
			TokenType::Number(value) => Ok(Node::value(Constant::Number(value))),
			TokenType::Word(name) => self.call(Node::word(name)),
			TokenType::EndOfInput => {
				Err(ParseError::new(token.line, token.column, ParseErrorType::UnexpectedEof).into())
			}
			_ => Err(Self::unexpected(&token, false)),
		}
	}

	/// Parse the optional chain of call tails behind `expr`. Tokens that may
	/// legitimately follow an expression (comma, closer, end of input) end
	/// the probe; anything else that is not an opener is a stray token.
	fn call(&mut self, mut expr: Node) -> Result<Node, ParserError> {
		loop {
			let closer = match self.lexer.peek().r#type {
				TokenType::LeftParen(opener) => {
					if opener == '(' {
						')'
					} else {
						'}'
					}
				}
				TokenType::RightParen(_) | TokenType::Comma | TokenType::EndOfInput => return Ok(expr),
				_ => return Err(Self::unexpected(self.lexer.peek(), true)),
			};
			self.lexer.advance()?;
			let mut args = Vec::new();
			if !matches!(self.lexer.peek().r#type, TokenType::RightParen(c) if c == closer) {
				loop {
					args.push(self.expression()?);
					let token = self.lexer.peek();
					match token.r#type {
						TokenType::Comma => {
							self.lexer.advance()?;
						}
						TokenType::RightParen(c) if c == closer => break,
						TokenType::EndOfInput => {
							return Err(ParseError::new(
								token.line,
								token.column,
								ParseErrorType::UnexpectedEof,
							)
							.into());
						}
						_ => {
							return Err(ParseError::new(
								token.line,
								token.column,
								ParseErrorType::ExpectedCommaOrCloser(closer),
							)
							.into());
						}
					}
				}
			}
			self.lexer.advance()?;
			expr = Node::call(expr, args);
		}
	}

	fn unexpected(token: &Token, expect_opener: bool) -> ParserError {
		ParseError::new(
			token.line,
			token.column,
			ParseErrorType::UnexpectedToken { text: token.lexeme.clone(), expect_opener },
		)
		.into()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(input: &str, rendered: &str) {
		let ast = Parser::new(input).unwrap().parse().unwrap();
		assert_eq!(ast.to_string(), rendered);
	}

	fn parse_error(input: &str, fragment: &str) {
		let error = Parser::new(input).unwrap().parse().unwrap_err().to_string();
		assert!(error.contains(fragment), "input {input:?}: {error}");
	}

	#[test]
	fn parse_literals() {
		parse("42", "42");
		parse("-3.5", "-3.5");
		parse("\"hi\"", "\"hi\"");
		parse("x", "x");
	}

	#[test]
	fn parse_calls() {
		parse("f()", "f()");
		parse("f(x)", "f(x)");
		parse("f(x, 1, \"s\")", "f(x, 1, \"s\")");
		parse("+(1, 2)", "+(1, 2)");
		parse("do( let(x, 1), x )", "do(let(x, 1), x)");
	}

	#[test]
	fn parse_brackets_interchangeable() {
		parse("f{x}", "f(x)");
		parse("if{==(a, 5), println(a)}", "if(==(a, 5), println(a))");
	}

	#[test]
	fn parse_chained_calls_left_associative() {
		let ast = Parser::new("f(x)(y)").unwrap().parse().unwrap();
		let Node::Call { operator, args } = &ast else { panic!("expected call") };
		assert_eq!(args.len(), 1);
		assert_eq!(args[0].to_string(), "y");
		assert_eq!(operator.to_string(), "f(x)");
	}

	#[test]
	fn parse_nested_positions_survive() {
		parse("a(b(c(d(e(1)))))", "a(b(c(d(e(1)))))");
	}

	#[test]
	fn parse_unexpected_token() {
		parse_error("f(,)", "Unexpected token");
		parse_error("f(})", "Unexpected token");
		parse_error("(x)", "Unexpected token");
	}

	#[test]
	fn parse_stray_token_in_call_probe() {
		parse_error("f(a b)", "expected '(' or '{'");
		parse_error("f x", "expected '(' or '{'");
	}

	#[test]
	fn parse_expected_comma_or_closer() {
		parse_error("f(1 2)", "Expected ',' or ')'");
		parse_error("f{1 2}", "Expected ',' or '}'");
		parse_error("f(x}", "Expected ',' or ')'");
		parse_error("f{x)", "Expected ',' or '}'");
	}

	#[test]
	fn parse_unmatched_parenthesis() {
		parse_error("f(1))", "Unmatched parenthesis");
		parse_error("f(1)}", "Unmatched parenthesis");
	}

	#[test]
	fn parse_trailing_input() {
		parse_error("f(1),", "Unexpected comma after program");
		parse_error("1 2", "Unexpected text after program");
	}

	#[test]
	fn parse_unexpected_eof() {
		parse_error("f(1,", "EOF");
		parse_error("f(", "EOF");
		parse_error("", "EOF");
	}

	#[test]
	fn parse_trailing_comma_rejected() {
		parse_error("f(1,)", "Unexpected token");
	}

	#[test]
	fn parse_empty_argument_list() {
		parse("f()", "f()");
		parse("f{}", "f()");
	}

	#[test]
	fn parse_error_positions() {
		let error = Parser::new("f(1\n  2)").unwrap().parse().unwrap_err().to_string();
		assert!(error.contains("line 2 and column 3"), "{error}");
	}
}
