use palc::Parser;
use plser::{Plser, cli::*};

fn main() {
	let result = match Cli::parse().mode {
		Mode::Run { path, optimize } => Plser::new(optimize).run_from_file(&path).map(|value| {
			println!("{value}");
		}),
		Mode::Compile { path, output, optimize } => {
			Plser::new(optimize).compile(&path, output.as_deref()).map(|written| {
				println!("{}", written.display());
			})
		}
		Mode::Interpret { path } => Plser::default().interpret_from_file(&path).map(|value| {
			println!("{value}");
		}),
		Mode::Emit { path } => Plser::default().emit_from_file(&path).map(|js| {
			println!("{js}");
		}),
		Mode::Repl => {
			Plser::default().run_prompt();
			Ok(())
		}
	};
	if let Err(e) = result {
		eprintln!("{e}");
		std::process::exit(1);
	}
}
