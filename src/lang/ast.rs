use crate::lang::location::Location;

/// One parsed source file: an ordered list of top-level function
/// declarations. There is no import mechanism yet; if one is added later,
/// that information belongs here.
#[derive(Debug, Clone)]
pub struct Module {
    pub functions: Vec<Expr>,
}

/// The closed set of expression variants the parser produces and the
/// interpreter evaluates. Declarations are expressions too, so `fun` and
/// `val` can appear anywhere an expression is expected.
#[derive(Debug, Clone)]
pub enum Expr {
    /// `fun add(a, b) = ...`
    Function(FnDeclExpr, Location),
    /// `val x = 5`
    Assignment(AssignExpr, Location),
    /// `{ ... }`, value of the last contained expression.
    Block(Vec<Expr>, Location),
    /// `sum(x, y)`
    Call(CallExpr, Location),
    /// `if (cond) then else other`
    If(IfExpr, Location),
    /// A name resolved against the scope chain.
    Identifier(String, Location),
    /// A number or string, already parsed at parse time.
    Literal(Literal, Location),
}

#[derive(Debug, Clone)]
pub struct FnDeclExpr {
    pub name: String,
    pub params: Vec<String>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub name: String,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_block: Box<Expr>,
    pub else_block: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::Function(_, loc) => loc,
            Expr::Assignment(_, loc) => loc,
            Expr::Block(_, loc) => loc,
            Expr::Call(_, loc) => loc,
            Expr::If(_, loc) => loc,
            Expr::Identifier(_, loc) => loc,
            Expr::Literal(_, loc) => loc,
        }
    }
}
