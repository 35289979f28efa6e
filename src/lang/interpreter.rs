use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::lang::ast::{Expr, Literal, Module};
use crate::lang::location::Location;
use crate::lang::scope::Scope;
use crate::lang::types::{Closure, Dynamic, Function};

/// Walks the AST directly, evaluating expressions against the scope chain.
/// The standard library arrives as an already populated root scope; the
/// interpreter itself implements no builtins.
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Binds every top-level declaration into a fresh module scope under the
    /// library scope, then invokes `main` with zero arguments and returns
    /// its value.
    pub fn run(&self, module: &Module, library: Rc<RefCell<Scope>>) -> ScriptResult<Dynamic> {
        let module_scope = Rc::new(RefCell::new(Scope::with_parent(library)));
        for function in &module.functions {
            self.eval(function, &module_scope)?;
        }
        // main is resolved against the module scope directly, so the lookup
        // has no referencing identifier to borrow a location from.
        let loc = Location::unknown();
        let main = module_scope.borrow().get("main");
        match main {
            None => Err(ScriptError::VariableUndefined("main".into(), loc)),
            Some(Dynamic::Function(f)) => self.invoke(&f, vec![], &loc),
            Some(other) => Err(ScriptError::NotCallable(other.to_string(), loc)),
        }
    }

    pub fn eval(&self, expr: &Expr, ctx: &Rc<RefCell<Scope>>) -> ScriptResult<Dynamic> {
        match expr {
            Expr::Literal(lit, _) => Ok(match lit {
                Literal::Number(n) => Dynamic::Number(*n),
                Literal::String(s) => Dynamic::String(s.clone()),
            }),
            Expr::Identifier(name, loc) => {
                let value = ctx.borrow().get(name);
                match value {
                    Some(v) => Ok(v),
                    None => Err(ScriptError::VariableUndefined(name.clone(), loc.clone())),
                }
            }
            Expr::Block(body, _) => {
                let scope = Rc::new(RefCell::new(Scope::with_parent(ctx.clone())));
                let mut result = Dynamic::Unit;
                for next in body {
                    result = self.eval(next, &scope)?;
                }
                Ok(result)
            }
            Expr::If(if_expr, _) => {
                if self.eval(&if_expr.condition, ctx)?.is_truthy() {
                    return self.eval(&if_expr.then_block, ctx);
                }
                match &if_expr.else_block {
                    Some(else_block) => self.eval(else_block, ctx),
                    None => Ok(Dynamic::Unit),
                }
            }
            Expr::Assignment(assign, _) => {
                // The bound value is also the assignment's own result.
                let result = self.eval(&assign.body, ctx)?;
                ctx.borrow_mut().set(&assign.name, result.clone());
                Ok(result)
            }
            Expr::Call(call, loc) => {
                let callee = self.eval(&call.func, ctx)?;
                let function = match callee {
                    Dynamic::Function(f) => f,
                    other => {
                        return Err(ScriptError::NotCallable(
                            other.to_string(),
                            call.func.location().clone(),
                        ))
                    }
                };
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval(arg, ctx)?);
                }
                self.invoke(&function, args, loc)
            }
            Expr::Function(decl, _) => {
                // The closure captures the current scope object itself, not
                // a snapshot: bindings added to it later are visible.
                let closure = Closure {
                    name: decl.name.clone(),
                    params: decl.params.clone(),
                    body: (*decl.body).clone(),
                    scope: ctx.clone(),
                };
                let value = Dynamic::Function(Function::Script(Box::new(closure)));
                ctx.borrow_mut().set(&decl.name, value.clone());
                Ok(value)
            }
        }
    }

    /// Calls a function value. Script closures run their body in a fresh
    /// child of the captured defining scope: lexical scoping, not dynamic.
    /// Missing arguments bind the parameter to unit and extra arguments are
    /// ignored.
    pub fn invoke(
        &self,
        function: &Function,
        args: Vec<Dynamic>,
        loc: &Location,
    ) -> ScriptResult<Dynamic> {
        match function {
            Function::Native(native) => native(args, loc),
            Function::Script(closure) => {
                let scope = Rc::new(RefCell::new(Scope::with_parent(closure.scope.clone())));
                {
                    let mut scope = scope.borrow_mut();
                    for (i, param) in closure.params.iter().enumerate() {
                        scope.set(param, args.get(i).cloned().unwrap_or(Dynamic::Unit));
                    }
                }
                self.eval(&closure.body, &scope)
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
use crate::engine::ScriptEngine;

#[cfg(test)]
fn run_main(script: &str) -> ScriptResult<Dynamic> {
    ScriptEngine::default().run_script("test.fun", script)
}

#[test]
fn test_main_return_value() {
    assert_eq!(run_main("fun main() = 42").unwrap(), Dynamic::Number(42.0));
    assert_eq!(
        run_main("fun main() = \"hello\"").unwrap(),
        Dynamic::String("hello".into())
    );
}

#[test]
fn test_arithmetic_through_library() {
    assert_eq!(run_main("fun main() = 1 + 2").unwrap(), Dynamic::Number(3.0));
    assert_eq!(run_main("fun main() = 2 * 3 + 4").unwrap(), Dynamic::Number(10.0));
    assert_eq!(run_main("fun main() = 7 - 2").unwrap(), Dynamic::Number(5.0));
    assert_eq!(run_main("fun main() = 1 / 2").unwrap(), Dynamic::Number(0.5));
}

#[test]
fn test_closure_captures_scope_by_reference() {
    // g captures the block scope object at declaration time, so the later
    // rebinding of x in that same scope is visible when g finally runs.
    let script = "fun f() = {
        val x = 1
        fun g() = x
        val x = 2
        g()
    }
    fun main() = f()";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(2.0));
}

#[test]
fn test_lexical_not_dynamic_scoping() {
    // g must resolve x in its defining scope, not in the caller's scope.
    let script = "fun g() = x
    fun f() = {
        val x = 5
        g()
    }
    fun main() = f()";
    match run_main(script) {
        Err(ScriptError::VariableUndefined(name, loc)) => {
            assert_eq!(name, "x");
            assert_eq!((loc.line, loc.column), (1, 11));
        }
        r => panic!("expected undefined variable error, got {r:?}"),
    }
}

#[test]
fn test_block_value_is_last_expression() {
    assert_eq!(
        run_main("fun main() = { 1 2 3 }").unwrap(),
        Dynamic::Number(3.0)
    );
    assert_eq!(run_main("fun main() = {}").unwrap(), Dynamic::Unit);
}

#[test]
fn test_assignment_yields_its_value() {
    assert_eq!(
        run_main("fun main() = { val x = 7 }").unwrap(),
        Dynamic::Number(7.0)
    );
}

#[test]
fn test_if_without_else_is_unit() {
    let script = "fun falsy() = 1 == 2
    fun main() = if (falsy()) 1";
    assert_eq!(run_main(script).unwrap(), Dynamic::Unit);
}

#[test]
fn test_if_branches() {
    assert_eq!(
        run_main("fun main() = if (1 < 2) \"yes\" else \"no\"").unwrap(),
        Dynamic::String("yes".into())
    );
    assert_eq!(
        run_main("fun main() = if (2 < 1) \"yes\" else \"no\"").unwrap(),
        Dynamic::String("no".into())
    );
}

#[test]
fn test_missing_argument_binds_unit() {
    let script = "fun second(a, b) = b
    fun main() = second(1)";
    assert_eq!(run_main(script).unwrap(), Dynamic::Unit);
}

#[test]
fn test_extra_arguments_ignored() {
    let script = "fun first(a) = a
    fun main() = first(1, 2, 3)";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(1.0));
}

#[test]
fn test_array_literal_matches_list_build() {
    let script = "fun main() = [1, 2, 3]";
    let built = "fun main() = List.build(1, 2, 3)";
    let expected = Dynamic::Array(vec![1.0.into(), 2.0.into(), 3.0.into()]);
    assert_eq!(run_main(script).unwrap(), expected);
    assert_eq!(run_main(built).unwrap(), expected);
}

#[test]
fn test_list_operations() {
    assert_eq!(
        run_main("fun main() = List.length([1, 2, 3])").unwrap(),
        Dynamic::Number(3.0)
    );
    assert_eq!(
        run_main("fun main() = List.add([1], 2)").unwrap(),
        Dynamic::Array(vec![1.0.into(), 2.0.into()])
    );
    // List.add returns a new list; the original is untouched.
    let script = "fun main() = {
        val a = [1]
        val b = List.add(a, 2)
        List.length(a)
    }";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(1.0));
}

#[test]
fn test_undefined_variable_is_located() {
    match run_main("fun main() = y") {
        Err(ScriptError::VariableUndefined(name, loc)) => {
            assert_eq!(name, "y");
            assert_eq!((loc.line, loc.column), (1, 14));
        }
        r => panic!("expected undefined variable error, got {r:?}"),
    }
}

#[test]
fn test_calling_a_non_function() {
    let script = "fun main() = { val x = 3 x(1) }";
    match run_main(script) {
        Err(ScriptError::NotCallable(what, _)) => assert_eq!(what, "3"),
        r => panic!("expected not-callable error, got {r:?}"),
    }
}

#[test]
fn test_missing_main() {
    match run_main("fun helper() = 1") {
        Err(ScriptError::VariableUndefined(name, loc)) => {
            assert_eq!(name, "main");
            assert_eq!(loc, Location::unknown());
        }
        r => panic!("expected undefined variable error, got {r:?}"),
    }
}

#[test]
fn test_recursion() {
    let script = "fun fact(n) = if (n < 2) 1 else n * fact(n - 1)
    fun main() = fact(5)";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(120.0));
}

#[test]
fn test_function_declaration_yields_closure() {
    // A declaration is an expression whose value is the closure itself, so
    // it can be bound and called through another name.
    let script = "fun main() = {
        val f = fun g(a) = a + 1
        f(41)
    }";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(42.0));
}

#[test]
fn test_closure_as_argument() {
    let script = "fun apply(f, x) = f(x)
    fun double(n) = n * 2
    fun main() = apply(double, 21)";
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(42.0));
}

#[test]
fn test_counter_shares_captured_scope() {
    // Both calls to bump mutate the same captured scope.
    let script = "fun counter() = {
        val n = 0
        fun bump() = {
            val n = n + 1
            n
        }
        bump()
        bump()
    }
    fun main() = counter()";
    // Each bump reads n from its own block scope chain; the inner val
    // shadows within bump's block only, so the captured n stays 0 and both
    // calls return 1. The last block expression is the second bump's value.
    assert_eq!(run_main(script).unwrap(), Dynamic::Number(1.0));
}
