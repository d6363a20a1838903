use std::path::PathBuf;

use plser::{Node, Plser, Value};

fn fixture(name: &str) -> PathBuf {
	PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name)
}

#[test]
fn test_pls_file() {
	let plser = Plser::default();
	let result = plser.run_from_file(&fixture("fib.pls")).unwrap();
	assert_eq!(result, Value::Number(55.0));
}

#[test]
fn test_pls_file_optimized() {
	let result = Plser::new(true).run_from_file(&fixture("fib.pls")).unwrap();
	assert_eq!(result, Value::Number(55.0));
}

#[test]
fn compile_then_interpret_matches_direct_run() {
	let plser = Plser::default();
	let source = fixture("fib.pls");
	let output = std::env::temp_dir().join("plser-test-fib.cpls");
	let written = plser.compile(&source, Some(&output)).unwrap();
	assert_eq!(written, output);

	let direct = plser.run_from_file(&source).unwrap();
	let compiled = plser.interpret_from_file(&output).unwrap();
	assert_eq!(direct, compiled);
	std::fs::remove_file(&output).ok();
}

#[test]
fn compile_defaults_to_cpls_extension() {
	let dir = std::env::temp_dir();
	let source = dir.join("plser-test-default.pls");
	std::fs::write(&source, "+(40, 2)").unwrap();
	let written = Plser::default().compile(&source, None).unwrap();
	assert_eq!(written, dir.join("plser-test-default.cpls"));
	assert_eq!(Plser::default().interpret_from_file(&written).unwrap(), Value::Number(42.0));
	std::fs::remove_file(&source).ok();
	std::fs::remove_file(&written).ok();
}

#[test]
fn serialized_ast_round_trips_structurally() {
	let program = Plser::default().parse("do( let(x, 1), if(==(x, 1), \"yes\", \"no\") )").unwrap();
	let json = serde_json::to_string(&program).unwrap();
	let back: Node = serde_json::from_str(&json).unwrap();
	assert_eq!(back, program);
}

#[test]
fn evaluation_agrees_across_serialization() {
	let plser = Plser::default();
	let source = "do( let(double, fn(n, *(n, 2))), double(21) )";
	let program = plser.parse(source).unwrap();
	let json = serde_json::to_string(&program).unwrap();
	let back: Node = serde_json::from_str(&json).unwrap();
	assert_eq!(plser.interpret(&program).unwrap(), plser.interpret(&back).unwrap());
}

#[test]
fn driver_errors_carry_original_messages() {
	let plser = Plser::default();
	let error = plser.run("f(1))").unwrap_err().to_string();
	assert!(error.contains("Unmatched parenthesis"), "{error}");
	let error = plser.run("assign(x, 1)").unwrap_err().to_string();
	assert!(error.contains("ReferenceError: Undefined binding: x"), "{error}");
	let error = plser.run("\\").unwrap_err().to_string();
	assert!(error.contains("Invalid token"), "{error}");
}

#[test]
fn emit_lowers_to_javascript() {
	let js = {
		let dir = std::env::temp_dir();
		let source = dir.join("plser-test-emit.pls");
		std::fs::write(&source, "do(let(x, 2), println(+(x, 1)))").unwrap();
		let js = Plser::default().emit_from_file(&source).unwrap();
		std::fs::remove_file(&source).ok();
		js
	};
	assert!(js.contains("console.log"), "{js}");
	assert!(js.contains("let x"), "{js}");
}
