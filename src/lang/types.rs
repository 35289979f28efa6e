use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use crate::error::ScriptResult;
use crate::lang::ast::Expr;
use crate::lang::location::Location;
use crate::lang::scope::Scope;

/// Signature of a standard library function. Natives receive the call-site
/// location so that every failure they raise is location-tagged.
pub type NativeFn = fn(Vec<Dynamic>, &Location) -> ScriptResult<Dynamic>;

/// The dynamically typed runtime value. Arrays are immutable by convention:
/// list operations return new arrays instead of mutating.
#[derive(Debug, Clone)]
pub enum Dynamic {
    Unit,
    Number(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Dynamic>),
    Function(Function),
}

#[derive(Clone)]
pub enum Function {
    Native(NativeFn),
    Script(Box<Closure>),
}

/// A function value: parameter names and a body expression paired with the
/// scope that was active at the point of declaration. The scope is captured
/// by reference, so bindings added to it after the declaration are visible
/// when the closure runs.
#[derive(Clone)]
pub struct Closure {
    pub name: String,
    pub params: Vec<String>,
    pub body: Expr,
    pub scope: Rc<RefCell<Scope>>,
}

impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Function::Native(_) => write!(f, "Native Function"),
            Function::Script(c) => write!(f, "function {}", c.name),
        }
    }
}

impl Display for Dynamic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dynamic::Unit => write!(f, "()"),
            Dynamic::Number(n) => {
                // Whole numbers print without a fractional part, so `1 + 2`
                // comes out as 3 rather than 3.0.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Dynamic::String(s) => write!(f, "{s}"),
            Dynamic::Boolean(b) => write!(f, "{b}"),
            Dynamic::Array(v) => {
                write!(f, "[")?;
                for (i, a) in v.iter().enumerate() {
                    write!(f, "{a}")?;
                    if i < v.len() - 1 {
                        write!(f, ",")?;
                    }
                }
                write!(f, "]")
            }
            Dynamic::Function(Function::Native(_)) => write!(f, "native function"),
            Dynamic::Function(Function::Script(c)) => write!(f, "function {}", c.name),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, rhs: &Self) -> bool {
        match (self, rhs) {
            (Dynamic::Unit, Dynamic::Unit) => true,
            (Dynamic::Number(l), Dynamic::Number(r)) => l == r,
            (Dynamic::String(l), Dynamic::String(r)) => l == r,
            (Dynamic::Boolean(l), Dynamic::Boolean(r)) => l == r,
            (Dynamic::Array(l), Dynamic::Array(r)) => l == r,
            // Functions never compare equal, and neither do mixed types.
            _ => false,
        }
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Dynamic::Number(value)
    }
}
impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Boolean(value)
    }
}
impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Dynamic::String(String::from(value))
    }
}
impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}
impl From<Vec<Dynamic>> for Dynamic {
    fn from(value: Vec<Dynamic>) -> Self {
        Dynamic::Array(value)
    }
}

impl Dynamic {
    pub fn type_name(&self) -> String {
        match self {
            Dynamic::Unit => "Unit".into(),
            Dynamic::Number(_) => "Number".into(),
            Dynamic::String(_) => "String".into(),
            Dynamic::Boolean(_) => "Boolean".into(),
            Dynamic::Array(_) => "List".into(),
            Dynamic::Function(_) => "Function".into(),
        }
    }
    /// Unit, false, zero, NaN and the empty string are falsy; everything
    /// else, lists and functions included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Dynamic::Unit => false,
            Dynamic::Boolean(b) => *b,
            Dynamic::Number(n) => *n != 0.0 && !n.is_nan(),
            Dynamic::String(s) => !s.is_empty(),
            Dynamic::Array(_) => true,
            Dynamic::Function(_) => true,
        }
    }
    pub fn is_string(&self) -> bool {
        matches!(self, Dynamic::String(_))
    }
    #[allow(unused)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }
    #[allow(unused)]
    pub fn as_string(&self) -> Option<String> {
        match self {
            Dynamic::String(s) => Some(s.clone()),
            _ => None,
        }
    }
    #[allow(unused)]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Boolean(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<Vec<Dynamic>> {
        match self {
            Dynamic::Array(v) => Some(v.clone()),
            _ => None,
        }
    }
    #[allow(unused)]
    pub fn as_function(&self) -> Option<Function> {
        match self {
            Dynamic::Function(f) => Some(f.clone()),
            _ => None,
        }
    }
}

#[test]
fn test_number_display() {
    assert_eq!(format!("{}", Dynamic::Number(3.0)), "3");
    assert_eq!(format!("{}", Dynamic::Number(3.5)), "3.5");
    assert_eq!(format!("{}", Dynamic::Number(-2.0)), "-2");
}

#[test]
fn test_array_display() {
    let v = Dynamic::Array(vec![1.0.into(), "x".into(), true.into()]);
    assert_eq!(format!("{v}"), "[1,x,true]");
}

#[test]
fn test_equality_is_structural_and_typed() {
    assert_eq!(Dynamic::Number(1.0), Dynamic::Number(1.0));
    assert_ne!(Dynamic::Number(1.0), Dynamic::String("1".into()));
    assert_eq!(
        Dynamic::Array(vec![1.0.into(), 2.0.into()]),
        Dynamic::Array(vec![1.0.into(), 2.0.into()])
    );
    assert_ne!(Dynamic::Number(f64::NAN), Dynamic::Number(f64::NAN));
}

#[test]
fn test_truthiness() {
    assert!(!Dynamic::Unit.is_truthy());
    assert!(!Dynamic::Boolean(false).is_truthy());
    assert!(!Dynamic::Number(0.0).is_truthy());
    assert!(!Dynamic::String(String::new()).is_truthy());
    assert!(Dynamic::Number(0.5).is_truthy());
    assert!(Dynamic::Array(vec![]).is_truthy());
}
