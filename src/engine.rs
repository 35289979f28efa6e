use crate::error::ScriptResult;
use crate::lang::ast::Module;
use crate::lang::interpreter::Interpreter;
use crate::lang::lexer::Lexer;
use crate::lang::parser::Parser;
use crate::lang::types::{Dynamic, NativeFn};
use crate::library::Library;

/// Facade over the whole pipeline: holds the library and the interpreter
/// and drives source text through lex, parse and run.
pub struct ScriptEngine {
    library: Library,
    interpreter: Interpreter,
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self {
            library: Library::with_std_library(),
            interpreter: Interpreter::new(),
        }
    }
}

impl ScriptEngine {
    /// An engine with an empty library, for callers that register their own
    /// native functions.
    #[allow(unused)]
    pub fn new_raw() -> Self {
        Self {
            library: Library::new(),
            interpreter: Interpreter::new(),
        }
    }
    #[allow(unused)]
    pub fn register_fn(&mut self, name: &str, f: NativeFn) {
        self.library.register_native(name, f);
    }
    pub fn compile_script(&mut self, name: &str, script: &str) -> ScriptResult<Module> {
        let tokens = Lexer::from_script(name, script).lex()?;
        Parser::new(tokens).parse_module()
    }
    pub fn run_module(&mut self, module: &Module) -> ScriptResult<Dynamic> {
        let scope = self.library.clone().into_scope();
        self.interpreter.run(module, scope)
    }
    pub fn run_script(&mut self, name: &str, script: &str) -> ScriptResult<Dynamic> {
        let module = self.compile_script(name, script)?;
        self.run_module(&module)
    }
}

#[cfg(test)]
use crate::error::ScriptError;
#[cfg(test)]
use crate::lang::location::Location;

#[test]
fn test_run_script_end_to_end() {
    let mut engine = ScriptEngine::default();
    let script = "fun square(n) = n * n
    fun main() = square(1 + 2)";
    assert_eq!(engine.run_script("demo.fun", script).unwrap(), Dynamic::Number(9.0));
}

#[test]
fn test_compile_without_running() {
    let mut engine = ScriptEngine::default();
    let module = engine.compile_script("demo.fun", "fun main() = 1").unwrap();
    assert_eq!(module.functions.len(), 1);
}

#[test]
fn test_errors_carry_the_script_name() {
    let mut engine = ScriptEngine::default();
    match engine.run_script("demo.fun", "fun main() = y") {
        Err(ScriptError::VariableUndefined(_, loc)) => assert_eq!(loc.source_file, "demo.fun"),
        r => panic!("expected undefined variable error, got {r:?}"),
    }
}

#[test]
fn test_registered_native_function() {
    let mut engine = ScriptEngine::default();
    engine.register_fn("answer", |_, _| Ok(Dynamic::Number(42.0)));
    assert_eq!(
        engine.run_script("demo.fun", "fun main() = answer()").unwrap(),
        Dynamic::Number(42.0)
    );
}

#[test]
fn test_raw_engine_has_no_library() {
    let mut engine = ScriptEngine::new_raw();
    match engine.run_script("demo.fun", "fun main() = 1 + 2") {
        Err(ScriptError::VariableUndefined(name, loc)) => {
            assert_eq!(name, "Core.+");
            assert_eq!(loc, Location::new("demo.fun", 1, 16));
        }
        r => panic!("expected undefined variable error, got {r:?}"),
    }
}
