//! The lexer turns source text into tokens on demand, keeping a single token
//! of lookahead for the parser. Each token knows its byte offset and 1-based
//! line and column, so every later stage can report precise positions.
//!
//! Whitespace is ASCII whitespace, `// line comments` and non-nesting
//! `/* block comments */`. An unclosed `/*` is not a comment at all: `/` and
//! `*` are ordinary word characters, so the text lexes as a word.
//!
//! Carriage returns are stripped before any position is computed.

mod token;

pub use token::*;

use crate::error::lexer::LexError;

#[derive(Debug)]
pub struct Lexer {
	/// Source text with `\r` stripped.
	source:    String,
	/// Byte offset of the next unread character.
	pos:       usize,
	line:      usize,
	column:    usize,
	lookahead: Token,
}

impl Lexer {
	pub fn new(source: &str) -> Result<Self, LexError> {
		let mut lexer = Self {
			source:    source.replace('\r', ""),
			pos:       0,
			line:      1,
			column:    1,
			lookahead: Token::new(TokenType::EndOfInput, String::new(), 0, 1, 1),
		};
		lexer.lookahead = lexer.next_token()?;
		Ok(lexer)
	}

	/// The current lookahead, without consuming it.
	pub fn peek(&self) -> &Token { &self.lookahead }

	/// Consume the lookahead and scan the next token into its place.
	pub fn advance(&mut self) -> Result<Token, LexError> {
		let next = self.next_token()?;
		Ok(std::mem::replace(&mut self.lookahead, next))
	}

	fn rest(&self) -> &str { &self.source[self.pos..] }

	fn peek_char(&self) -> Option<char> { self.rest().chars().next() }

	fn bump(&mut self) -> Option<char> {
		let c = self.peek_char()?;
		self.pos += c.len_utf8();
		if c == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
		Some(c)
	}

	/// Consume exactly `bytes` bytes, keeping line/column in step.
	fn bump_bytes(&mut self, bytes: usize) {
		let target = self.pos + bytes;
		while self.pos < target {
			self.bump();
		}
	}

	fn skip_whitespace(&mut self) {
		loop {
			match self.peek_char() {
				Some(c) if c.is_whitespace() => {
					self.bump();
				}
				Some('/') if self.rest().starts_with("//") => {
					while self.peek_char().is_some_and(|c| c != '\n') {
						self.bump();
					}
				}
				Some('/') if self.rest().starts_with("/*") => {
					// Block comments do not nest. No closing `*/` means this
					// is not a comment and the characters lex as a word.
					match self.rest().find("*/") {
						Some(end) => self.bump_bytes(end + 2),
						None => return,
					}
				}
				_ => return,
			}
		}
	}

	fn next_token(&mut self) -> Result<Token, LexError> {
		self.skip_whitespace();
		let (offset, line, column) = (self.pos, self.line, self.column);
		let Some(c) = self.peek_char() else {
			return Ok(Token::new(TokenType::EndOfInput, String::new(), offset, line, column));
		};
		let r#type = match c {
			',' => {
				self.bump();
				TokenType::Comma
			}
			'(' | '{' => {
				self.bump();
				TokenType::LeftParen(c)
			}
			')' | '}' => {
				self.bump();
				TokenType::RightParen(c)
			}
			'"' | '\'' => self.string(c, line, column)?,
			_ => match self.number() {
				Some(number) => number,
				None => self.word(line, column)?,
			},
		};
		let lexeme = self.source[offset..self.pos].to_string();
		Ok(Token::new(r#type, lexeme, offset, line, column))
	}

	/// The error payload is the rest of the line at the failure point.
	fn invalid_token(&self, line: usize, column: usize) -> LexError {
		let text = self.rest().lines().next().unwrap_or("");
		LexError::new(text, line, column)
	}

	/// Scan a string literal delimited by `"` or `'`. An unterminated string
	/// is an invalid token reported at the opening quote.
	fn string(&mut self, delimiter: char, line: usize, column: usize) -> Result<TokenType, LexError> {
		let start = self.pos;
		self.bump();
		let mut value = String::new();
		loop {
			let Some(c) = self.bump() else {
				let text = self.source[start..].lines().next().unwrap_or("");
				return Err(LexError::new(text, line, column));
			};
			if c == delimiter {
				break;
			}
			if c == '\\' {
				let Some(escape) = self.bump() else {
					return Err(self.invalid_token(line, column));
				};
				match escape {
					'n' => value.push('\n'),
					't' => value.push('\t'),
					'r' => value.push('\r'),
					'u' => value.push(self.unicode_escape(line, column)?),
					// `\\`, `\"`, `\'` and unknown escapes decode to the
					// escaped character itself.
					other => value.push(other),
				}
			} else {
				value.push(c);
			}
		}
		Ok(TokenType::Str(value))
	}

	/// `\uXXXX` with exactly four hex digits.
	fn unicode_escape(&mut self, line: usize, column: usize) -> Result<char, LexError> {
		let mut code = 0u32;
		for _ in 0..4 {
			let digit = self.bump().and_then(|c| c.to_digit(16));
			match digit {
				Some(digit) => code = code * 16 + digit,
				None => return Err(self.invalid_token(line, column)),
			}
		}
		char::from_u32(code).ok_or_else(|| self.invalid_token(line, column))
	}

	/// Try to scan a number at the current position. Numbers take an optional
	/// sign, digits, an optional fraction and an optional exponent; the
	/// exponent is only consumed when digits follow it, so `12e` lexes as the
	/// number `12` followed by the word `e`.
	fn number(&mut self) -> Option<TokenType> {
		let rest = self.rest().as_bytes();
		let mut i = 0;
		if matches!(rest.first(), Some(b'+' | b'-')) {
			i += 1;
		}
		let digits = i;
		while rest.get(i).is_some_and(u8::is_ascii_digit) {
			i += 1;
		}
		if i == digits {
			return None;
		}
		if rest.get(i) == Some(&b'.') {
			i += 1;
			while rest.get(i).is_some_and(u8::is_ascii_digit) {
				i += 1;
			}
		}
		if matches!(rest.get(i), Some(b'e' | b'E')) {
			let mut j = i + 1;
			if matches!(rest.get(j), Some(b'+' | b'-')) {
				j += 1;
			}
			let exponent = j;
			while rest.get(j).is_some_and(u8::is_ascii_digit) {
				j += 1;
			}
			if j > exponent {
				i = j;
			}
		}
		let value: f64 = self.rest()[..i].parse().ok()?;
		self.bump_bytes(i);
		Some(TokenType::Number(value))
	}

	/// A word is any run of characters other than whitespace and the
	/// delimiter set. Identifiers are not restricted to ASCII letters.
	fn word(&mut self, line: usize, column: usize) -> Result<TokenType, LexError> {
		let start = self.pos;
		while let Some(c) = self.peek_char() {
			if c.is_whitespace() || matches!(c, '(' | ')' | '{' | '}' | ',' | '"' | '\'' | '\\') {
				break;
			}
			self.bump();
		}
		if self.pos == start {
			// Only a stray backslash can land here.
			return Err(self.invalid_token(line, column));
		}
		Ok(TokenType::Word(self.source[start..self.pos].to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(input: &str) -> Vec<TokenType> {
		let mut lexer = Lexer::new(input).unwrap();
		let mut out = Vec::new();
		loop {
			let token = lexer.advance().unwrap();
			let done = token.r#type == TokenType::EndOfInput;
			out.push(token.r#type);
			if done {
				break;
			}
		}
		out
	}

	fn lex(input: &str, ok: bool) { assert_eq!(Lexer::new(input).is_ok(), ok, "input: {input:?}"); }

	#[test]
	fn lex_tokens() {
		lex("", true);
		lex("(", true);
		lex("(){}", true);
		lex(" ( ) ", true);
		lex("word", true);
		lex("你好", true);
		lex("12345", true);
		lex("\\", false);
		lex(r#""unterminated"#, false);
	}

	#[test]
	fn lex_words() {
		assert_eq!(tokens("+")[0], TokenType::Word("+".into()));
		assert_eq!(tokens(":=")[0], TokenType::Word(":=".into()));
		assert_eq!(tokens("->")[0], TokenType::Word("->".into()));
		assert_eq!(tokens("obj.key")[0], TokenType::Word("obj.key".into()));
		assert_eq!(tokens("héllo✓")[0], TokenType::Word("héllo✓".into()));
		// a sign with no digits is a word, not a number
		assert_eq!(tokens("+ 1")[0], TokenType::Word("+".into()));
	}

	#[test]
	fn lex_numbers() {
		assert_eq!(tokens("0")[0], TokenType::Number(0.0));
		assert_eq!(tokens("42")[0], TokenType::Number(42.0));
		assert_eq!(tokens("3.14")[0], TokenType::Number(3.14));
		assert_eq!(tokens("-7")[0], TokenType::Number(-7.0));
		assert_eq!(tokens("+2.5")[0], TokenType::Number(2.5));
		assert_eq!(tokens("1e3")[0], TokenType::Number(1000.0));
		assert_eq!(tokens("2.5e-2")[0], TokenType::Number(0.025));
		assert_eq!(tokens("1.")[0], TokenType::Number(1.0));
		// an exponent without digits is not consumed
		assert_eq!(tokens("12e"), vec![
			TokenType::Number(12.0),
			TokenType::Word("e".into()),
			TokenType::EndOfInput
		]);
	}

	#[test]
	fn lex_strings() {
		assert_eq!(tokens(r#""hello""#)[0], TokenType::Str("hello".into()));
		assert_eq!(tokens("'hello'")[0], TokenType::Str("hello".into()));
		assert_eq!(tokens(r#""a\nb\tc""#)[0], TokenType::Str("a\nb\tc".into()));
		assert_eq!(tokens(r#""say \"hi\"""#)[0], TokenType::Str("say \"hi\"".into()));
		assert_eq!(tokens(r#""back\\slash""#)[0], TokenType::Str("back\\slash".into()));
		assert_eq!(tokens(r#""\u0041""#)[0], TokenType::Str("A".into()));
		// a single-quoted string may hold unescaped double quotes
		assert_eq!(tokens(r#"'a "b" c'"#)[0], TokenType::Str("a \"b\" c".into()));
		// unknown escapes decode to the escaped character
		assert_eq!(tokens(r#""\q""#)[0], TokenType::Str("q".into()));
	}

	#[test]
	fn lex_comments() {
		assert_eq!(tokens("// comment"), vec![TokenType::EndOfInput]);
		assert_eq!(tokens("1 // comment\n2").len(), 3);
		assert_eq!(tokens("/* block */ 1")[0], TokenType::Number(1.0));
		assert_eq!(tokens("/* multi\nline */ x")[0], TokenType::Word("x".into()));
		// an unclosed block comment lexes as a word
		assert_eq!(tokens("/* open")[0], TokenType::Word("/*".into()));
	}

	#[test]
	fn lex_positions() {
		let mut lexer = Lexer::new("ab(\n  cd)").unwrap();
		let ab = lexer.advance().unwrap();
		assert_eq!((ab.offset, ab.line, ab.column), (0, 1, 1));
		let open = lexer.advance().unwrap();
		assert_eq!((open.offset, open.line, open.column), (2, 1, 3));
		let cd = lexer.advance().unwrap();
		assert_eq!((cd.offset, cd.line, cd.column), (6, 2, 3));
		let close = lexer.advance().unwrap();
		assert_eq!((close.line, close.column), (2, 5));
	}

	#[test]
	fn lex_strips_carriage_returns() {
		let mut lexer = Lexer::new("a\r\nb").unwrap();
		lexer.advance().unwrap();
		let b = lexer.advance().unwrap();
		assert_eq!((b.line, b.column), (2, 1));
	}

	#[test]
	fn lex_invalid_token_message() {
		let error = Lexer::new("  \"open line").unwrap_err();
		let message = error.to_string();
		assert!(message.starts_with("Invalid token:"), "{message}");
		assert!(message.contains("at line 1 and column 3"), "{message}");
	}

	#[test]
	fn lexemes_reconstruct_source() {
		let source = "do( let(x, 1), println(\"hi\") ) // done";
		let mut lexer = Lexer::new(source).unwrap();
		loop {
			let token = lexer.advance().unwrap();
			if token.r#type == TokenType::EndOfInput {
				break;
			}
			assert_eq!(&source[token.offset..token.offset + token.lexeme.len()], token.lexeme);
		}
	}

	#[test]
	fn lookahead_is_stable() {
		let mut lexer = Lexer::new("a b").unwrap();
		assert_eq!(lexer.peek().r#type, TokenType::Word("a".into()));
		assert_eq!(lexer.peek().r#type, TokenType::Word("a".into()));
		lexer.advance().unwrap();
		assert_eq!(lexer.peek().r#type, TokenType::Word("b".into()));
	}
}
