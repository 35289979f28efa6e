use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{ScriptError, ScriptResult};
use crate::lang::location::Location;
use crate::lang::scope::Scope;
use crate::lang::types::{Dynamic, Function, NativeFn};

/// The standard library: a set of named native functions that becomes the
/// root of the scope chain before user code runs. It is constructed
/// explicitly and injected into the interpreter entry point; nothing here
/// is process-global.
#[derive(Clone)]
pub struct Library {
    functions: HashMap<String, Function>,
}

impl Library {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }
    pub fn register_native(&mut self, name: &str, f: NativeFn) {
        self.functions.insert(String::from(name), Function::Native(f));
    }
    #[allow(unused)]
    pub fn get_function(&self, name: &str) -> Option<Function> {
        self.functions.get(name).cloned()
    }
    /// Seeds a scope with every registered function. The interpreter uses
    /// the result as the root of the scope chain, so user code resolves
    /// `Core.+`, `List.build` and friends like any other identifier.
    pub fn into_scope(self) -> Rc<RefCell<Scope>> {
        let mut scope = Scope::new();
        for (name, function) in self.functions {
            scope.set(&name, Dynamic::Function(function));
        }
        Rc::new(RefCell::new(scope))
    }
    pub fn with_std_library() -> Self {
        let mut lib = Library::new();
        lib.register_native("Core.+", core_add);
        lib.register_native("Core.-", core_sub);
        lib.register_native("Core.*", core_mul);
        lib.register_native("Core./", core_div);
        lib.register_native("Core.==", core_eq);
        lib.register_native("Core.!=", core_ne);
        lib.register_native("Core.<", core_lt);
        lib.register_native("Core.<=", core_le);
        lib.register_native("Core.>", core_gt);
        lib.register_native("Core.>=", core_ge);
        lib.register_native("List.length", list_length);
        lib.register_native("List.add", list_add);
        lib.register_native("List.build", list_build);
        lib.register_native("println", println_native);
        lib
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::with_std_library()
    }
}

/// Missing arguments arrive as unit, matching the interpreter's lenient
/// arity rule, and then fail the operand type checks below.
fn arg(args: &[Dynamic], i: usize) -> Dynamic {
    args.get(i).cloned().unwrap_or(Dynamic::Unit)
}

fn mismatch<T>(op: &str, l: &Dynamic, r: &Dynamic, loc: &Location) -> ScriptResult<T> {
    Err(ScriptError::TypeMismatch(
        format!("Cannot apply {op} to {} and {}", l.type_name(), r.type_name()),
        loc.clone(),
    ))
}

fn core_add(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    let l = arg(&args, 0);
    let r = arg(&args, 1);
    match (&l, &r) {
        (Dynamic::Number(a), Dynamic::Number(b)) => Ok(Dynamic::Number(a + b)),
        // Adding a string concatenates, which is what println-style code
        // building messages relies on.
        _ if l.is_string() || r.is_string() => Ok(Dynamic::String(format!("{l}{r}"))),
        _ => mismatch("+", &l, &r, loc),
    }
}

fn numeric(
    op: &str,
    args: Vec<Dynamic>,
    loc: &Location,
    apply: fn(f64, f64) -> f64,
) -> ScriptResult<Dynamic> {
    let l = arg(&args, 0);
    let r = arg(&args, 1);
    match (&l, &r) {
        (Dynamic::Number(a), Dynamic::Number(b)) => Ok(Dynamic::Number(apply(*a, *b))),
        _ => mismatch(op, &l, &r, loc),
    }
}

fn core_sub(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    numeric("-", args, loc, |a, b| a - b)
}
fn core_mul(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    numeric("*", args, loc, |a, b| a * b)
}
fn core_div(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    numeric("/", args, loc, |a, b| a / b)
}

fn core_eq(args: Vec<Dynamic>, _: &Location) -> ScriptResult<Dynamic> {
    Ok(Dynamic::Boolean(arg(&args, 0) == arg(&args, 1)))
}
fn core_ne(args: Vec<Dynamic>, _: &Location) -> ScriptResult<Dynamic> {
    Ok(Dynamic::Boolean(arg(&args, 0) != arg(&args, 1)))
}

fn ordered(
    op: &str,
    args: Vec<Dynamic>,
    loc: &Location,
    number: fn(f64, f64) -> bool,
    string: fn(&str, &str) -> bool,
) -> ScriptResult<Dynamic> {
    let l = arg(&args, 0);
    let r = arg(&args, 1);
    match (&l, &r) {
        (Dynamic::Number(a), Dynamic::Number(b)) => Ok(Dynamic::Boolean(number(*a, *b))),
        (Dynamic::String(a), Dynamic::String(b)) => Ok(Dynamic::Boolean(string(a, b))),
        _ => mismatch(op, &l, &r, loc),
    }
}

fn core_lt(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    ordered("<", args, loc, |a, b| a < b, |a, b| a < b)
}
fn core_le(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    ordered("<=", args, loc, |a, b| a <= b, |a, b| a <= b)
}
fn core_gt(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    ordered(">", args, loc, |a, b| a > b, |a, b| a > b)
}
fn core_ge(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    ordered(">=", args, loc, |a, b| a >= b, |a, b| a >= b)
}

fn list_length(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    let l = arg(&args, 0);
    match l.as_array() {
        Some(v) => Ok(Dynamic::Number(v.len() as f64)),
        None => Err(ScriptError::TypeMismatch(
            format!("List.length expects a list, found {}", l.type_name()),
            loc.clone(),
        )),
    }
}

fn list_add(args: Vec<Dynamic>, loc: &Location) -> ScriptResult<Dynamic> {
    let l = arg(&args, 0);
    match l.as_array() {
        Some(mut v) => {
            v.push(arg(&args, 1));
            Ok(Dynamic::Array(v))
        }
        None => Err(ScriptError::TypeMismatch(
            format!("List.add expects a list, found {}", l.type_name()),
            loc.clone(),
        )),
    }
}

fn list_build(args: Vec<Dynamic>, _: &Location) -> ScriptResult<Dynamic> {
    Ok(Dynamic::Array(args))
}

fn println_native(args: Vec<Dynamic>, _: &Location) -> ScriptResult<Dynamic> {
    let line = args
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{line}");
    Ok(Dynamic::Unit)
}

#[cfg(test)]
fn call(lib: &Library, name: &str, args: Vec<Dynamic>) -> ScriptResult<Dynamic> {
    let loc = Location::new("test.fun", 1, 1);
    match lib.get_function(name).unwrap() {
        Function::Native(f) => f(args, &loc),
        Function::Script(_) => panic!("expected native function"),
    }
}

#[test]
fn test_arithmetic() {
    let lib = Library::with_std_library();
    assert_eq!(call(&lib, "Core.+", vec![1.0.into(), 2.0.into()]).unwrap(), 3.0.into());
    assert_eq!(call(&lib, "Core.-", vec![7.0.into(), 2.0.into()]).unwrap(), 5.0.into());
    assert_eq!(call(&lib, "Core.*", vec![3.0.into(), 4.0.into()]).unwrap(), 12.0.into());
    assert_eq!(call(&lib, "Core./", vec![1.0.into(), 4.0.into()]).unwrap(), 0.25.into());
}

#[test]
fn test_add_concatenates_strings() {
    let lib = Library::with_std_library();
    assert_eq!(
        call(&lib, "Core.+", vec!["n = ".into(), 3.0.into()]).unwrap(),
        Dynamic::String("n = 3".into())
    );
}

#[test]
fn test_arithmetic_type_mismatch_is_located() {
    let lib = Library::with_std_library();
    match call(&lib, "Core.-", vec!["a".into(), "b".into()]) {
        Err(ScriptError::TypeMismatch(message, loc)) => {
            assert_eq!(message, "Cannot apply - to String and String");
            assert_eq!((loc.line, loc.column), (1, 1));
        }
        r => panic!("expected type mismatch, got {r:?}"),
    }
}

#[test]
fn test_comparisons() {
    let lib = Library::with_std_library();
    assert_eq!(call(&lib, "Core.<", vec![1.0.into(), 2.0.into()]).unwrap(), true.into());
    assert_eq!(call(&lib, "Core.>=", vec![2.0.into(), 2.0.into()]).unwrap(), true.into());
    assert_eq!(call(&lib, "Core.<", vec!["a".into(), "b".into()]).unwrap(), true.into());
    assert_eq!(call(&lib, "Core.==", vec![1.0.into(), "1".into()]).unwrap(), false.into());
    assert_eq!(call(&lib, "Core.!=", vec![1.0.into(), 2.0.into()]).unwrap(), true.into());
}

#[test]
fn test_list_functions() {
    let lib = Library::with_std_library();
    let list = call(&lib, "List.build", vec![1.0.into(), 2.0.into()]).unwrap();
    assert_eq!(list, Dynamic::Array(vec![1.0.into(), 2.0.into()]));
    assert_eq!(call(&lib, "List.length", vec![list.clone()]).unwrap(), 2.0.into());
    let grown = call(&lib, "List.add", vec![list.clone(), 3.0.into()]).unwrap();
    assert_eq!(grown, Dynamic::Array(vec![1.0.into(), 2.0.into(), 3.0.into()]));
    // The input list is unchanged.
    assert_eq!(call(&lib, "List.length", vec![list]).unwrap(), 2.0.into());
}

#[test]
fn test_library_scope_resolves_bindings() {
    let scope = Library::with_std_library().into_scope();
    assert!(scope.borrow().get("println").is_some());
    assert!(scope.borrow().get("Core.+").is_some());
    assert!(scope.borrow().get("missing").is_none());
}
