use std::path::PathBuf;

use palc::{Parser, Subcommand};

/// CLI arguments
#[derive(Parser)]
#[command(name = "plser", after_long_help = "The pls toolchain: run, compile and inspect pls programs.")]
pub struct Cli {
	/// Program mode
	#[command(subcommand)]
	pub mode: Mode,
}

/// Program mode
#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Parse and evaluate a source file
	Run {
		path:     PathBuf,
		/// Fold and propagate constants before evaluating
		#[arg(short = 'O', long)]
		optimize: bool,
	},
	/// Serialize the AST of a source file to a .cpls file
	Compile {
		path:     PathBuf,
		/// Output path, defaults to the source with a .cpls extension
		#[arg(short, long)]
		output:   Option<PathBuf>,
		/// Fold and propagate constants before writing
		#[arg(short = 'O', long)]
		optimize: bool,
	},
	/// Evaluate a compiled .cpls file
	Interpret { path: PathBuf },
	/// Lower a source file to a JavaScript expression
	Emit { path: PathBuf },
	/// Interactive prompt
	Repl,
}
