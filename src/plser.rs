use std::{fs, io::Write, path::{Path, PathBuf}};

use anyhow::Context;

use crate::{codegen, error::Result, interpreter::{Interpreter, value::Value}, optimizer, parser::{Parser, node::Node}};

/// The driver facade: parse, compile, interpret and run, from strings or
/// files. With `optimize` set, the optimizer pass runs on every parsed
/// program before it is evaluated or written out.
#[derive(Default)]
pub struct Plser {
	optimize: bool,
}

impl Plser {
	pub fn new(optimize: bool) -> Self { Self { optimize } }

	pub fn parse(&self, source: &str) -> Result<Node> {
		let mut program = Parser::new(source)?.parse()?;
		if self.optimize {
			optimizer::optimize(&mut program);
		}
		Ok(program)
	}

	pub fn parse_from_file(&self, path: &Path) -> Result<Node> {
		let source = fs::read_to_string(path).context("Failed open source file")?;
		self.parse(&source)
	}

	/// Write the serialized AST next to the source, or to `output`. The
	/// default output swaps the extension for `.cpls`.
	pub fn compile(&self, source: &Path, output: Option<&Path>) -> Result<PathBuf> {
		let program = self.parse_from_file(source)?;
		let output = output.map(Path::to_path_buf).unwrap_or_else(|| source.with_extension("cpls"));
		let json = serde_json::to_string_pretty(&program).context("Failed serialize program")?;
		fs::write(&output, json).context("Failed write compiled file")?;
		Ok(output)
	}

	pub fn interpret(&self, program: &Node) -> Result<Value> {
		Ok(Interpreter::new().interpret(program)?)
	}

	/// Read a compiled `.cpls` file and evaluate it.
	pub fn interpret_from_file(&self, path: &Path) -> Result<Value> {
		let json = fs::read_to_string(path).context("Failed open compiled file")?;
		let program: Node = serde_json::from_str(&json).context("Failed read compiled program")?;
		self.interpret(&program)
	}

	pub fn run(&self, source: &str) -> Result<Value> {
		let program = self.parse(source)?;
		self.interpret(&program)
	}

	pub fn run_from_file(&self, path: &Path) -> Result<Value> {
		let source = fs::read_to_string(path).context("Failed open source file")?;
		self.run(&source)
	}

	/// Lower a source file to a JavaScript expression string.
	pub fn emit_from_file(&self, path: &Path) -> Result<String> {
		let program = self.parse_from_file(path)?;
		Ok(codegen::generate(&program))
	}
}

impl Plser {
	pub fn run_prompt(&self) {
		let interpreter = Interpreter::new();
		let mut input = String::new();
		let stdin = std::io::stdin();
		loop {
			input.clear();
			print!("> ");
			if let Err(e) = std::io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			match stdin.read_line(&mut input) {
				Ok(0) => {
					println!("\nExited plser repl");
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			let line = input.trim();
			if line.is_empty() {
				continue;
			}
			match self.prompt_line(&interpreter, line) {
				Ok(value) => println!("{value}"),
				Err(e) => eprintln!("{e}"),
			}
		}
	}

	/// One REPL line against the persistent interpreter state.
	fn prompt_line(&self, interpreter: &Interpreter, line: &str) -> Result<Value> {
		let mut program = Parser::new(line)?.parse()?;
		if self.optimize {
			optimizer::optimize(&mut program);
		}
		Ok(interpreter.interpret(&program)?)
	}
}
