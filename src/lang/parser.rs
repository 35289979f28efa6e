use crate::error::{ScriptError, ScriptResult};
use crate::lang::ast::{AssignExpr, CallExpr, Expr, FnDeclExpr, IfExpr, Literal, Module};
use crate::lang::location::Location;
use crate::lang::token::{Token, TokenKind};

const COMPARE_OPS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];
const SUM_OPS: [&str; 2] = ["+", "-"];
const PROD_OPS: [&str; 2] = ["*", "/"];

/// Recursive descent over the token vector. Each precedence level consumes
/// at most one operator application before returning upward, so binary
/// operators do not chain; `a + b + c` parses as `a + b` and leaves `+ c`
/// for the caller. That matches the source language deliberately and is
/// locked down by tests below.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }
    fn end(&self) -> Location {
        match self.tokens.last() {
            Some(t) => t.loc.clone(),
            None => Location::unknown(),
        }
    }
    fn next(&mut self) -> ScriptResult<Token> {
        match self.tokens.get(self.index) {
            Some(t) => {
                self.index += 1;
                Ok(t.clone())
            }
            None => Err(ScriptError::UnexpectedEof(self.end())),
        }
    }
    fn prev_loc(&self) -> Location {
        self.tokens[self.index - 1].loc.clone()
    }
    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> ScriptResult<Token> {
        let next = self.next()?;
        if next.kind == kind {
            return Ok(next);
        }
        Err(ScriptError::UnexpectedToken {
            expected: message.into(),
            found: next.word,
            loc: next.loc,
        })
    }
    fn expect_exact(&mut self, word: &str) -> ScriptResult<Token> {
        let next = self.next()?;
        if next.word == word {
            return Ok(next);
        }
        Err(ScriptError::UnexpectedToken {
            expected: format!("'{word}'"),
            found: next.word,
            loc: next.loc,
        })
    }
    fn check_kind(&mut self, kind: TokenKind) -> Option<Token> {
        let next = self.tokens.get(self.index)?;
        if next.kind == kind {
            self.index += 1;
            return Some(self.tokens[self.index - 1].clone());
        }
        None
    }
    fn check_exact(&mut self, word: &str) -> Option<Token> {
        let next = self.tokens.get(self.index)?;
        if next.word == word {
            self.index += 1;
            return Some(self.tokens[self.index - 1].clone());
        }
        None
    }

    /// A module is a sequence of top-level `fun` declarations terminated by
    /// the EOF token.
    pub fn parse_module(&mut self) -> ScriptResult<Module> {
        let mut module = Module { functions: vec![] };
        while self.index < self.tokens.len() {
            if self.check_kind(TokenKind::Eof).is_some() {
                return Ok(module);
            }
            self.expect_exact("fun")?;
            module.functions.push(self.parse_function()?);
        }
        Err(ScriptError::UnexpectedEof(self.end()))
    }

    /// `fun <name> ( <params>? ) = <expr>`, the `fun` keyword already eaten.
    pub fn parse_function(&mut self) -> ScriptResult<Expr> {
        let loc = self.prev_loc();
        let name = self.expect_kind(TokenKind::Identifier, "function name")?.word;
        self.expect_exact("(")?;
        let mut params = vec![];
        if let Some(first) = self.check_kind(TokenKind::Identifier) {
            params.push(first.word);
            while self.check_exact(",").is_some() {
                params.push(self.expect_kind(TokenKind::Identifier, "parameter")?.word);
            }
        }
        self.expect_exact(")")?;
        self.expect_exact("=")?;
        let body = self.parse_expression()?;
        Ok(Expr::Function(
            FnDeclExpr {
                name,
                params,
                body: Box::new(body),
            },
            loc,
        ))
    }

    /// Declarations are expressions, so they dispatch here on their leading
    /// keyword and are usable anywhere an expression is expected.
    pub fn parse_expression(&mut self) -> ScriptResult<Expr> {
        if self.check_exact("fun").is_some() {
            return self.parse_function();
        }
        if self.check_exact("val").is_some() {
            return self.parse_assignment();
        }
        if self.check_exact("if").is_some() {
            return self.parse_if();
        }
        self.parse_compare()
    }

    /// `val <name> = <expr>`, the `val` keyword already eaten.
    fn parse_assignment(&mut self) -> ScriptResult<Expr> {
        let loc = self.prev_loc();
        let name = self.expect_kind(TokenKind::Identifier, "value name")?.word;
        self.expect_exact("=")?;
        let body = self.parse_expression()?;
        Ok(Expr::Assignment(
            AssignExpr {
                name,
                body: Box::new(body),
            },
            loc,
        ))
    }

    /// `if ( <expr> ) <expr> (else <expr>)?`, the `if` keyword already eaten.
    fn parse_if(&mut self) -> ScriptResult<Expr> {
        let loc = self.prev_loc();
        self.expect_exact("(")?;
        let condition = self.parse_expression()?;
        self.expect_exact(")")?;
        let then_block = self.parse_expression()?;
        let mut else_block = None;
        if self.check_exact("else").is_some() {
            else_block = Some(Box::new(self.parse_expression()?));
        }
        Ok(Expr::If(
            IfExpr {
                condition: Box::new(condition),
                then_block: Box::new(then_block),
                else_block,
            },
            loc,
        ))
    }

    /// Binary operators desugar into calls of the matching `Core.<op>`
    /// library function.
    fn operator_call(&self, word: &str, loc: Location, left: Expr, right: Expr) -> Expr {
        Expr::Call(
            CallExpr {
                func: Box::new(Expr::Identifier(format!("Core.{word}"), loc.clone())),
                args: vec![left, right],
            },
            loc,
        )
    }

    fn parse_compare(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_sum()?;
        for op in COMPARE_OPS {
            if let Some(token) = self.check_exact(op) {
                let right = self.parse_sum()?;
                return Ok(self.operator_call(op, token.loc, left, right));
            }
        }
        Ok(left)
    }

    fn parse_sum(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_prod()?;
        for op in SUM_OPS {
            if let Some(token) = self.check_exact(op) {
                let right = self.parse_prod()?;
                return Ok(self.operator_call(op, token.loc, left, right));
            }
        }
        Ok(left)
    }

    fn parse_prod(&mut self) -> ScriptResult<Expr> {
        let left = self.parse_call()?;
        for op in PROD_OPS {
            if let Some(token) = self.check_exact(op) {
                let right = self.parse_call()?;
                return Ok(self.operator_call(op, token.loc, left, right));
            }
        }
        Ok(left)
    }

    /// One `( args )` application at most; calls do not chain either.
    fn parse_call(&mut self) -> ScriptResult<Expr> {
        let func = self.parse_block()?;
        if self.check_exact("(").is_none() {
            return Ok(func);
        }
        let loc = func.location().clone();
        let mut args = vec![];
        if self.check_exact(")").is_none() {
            args.push(self.parse_expression()?);
            while self.check_exact(",").is_some() {
                args.push(self.parse_expression()?);
            }
            self.expect_exact(")")?;
        }
        Ok(Expr::Call(
            CallExpr {
                func: Box::new(func),
                args,
            },
            loc,
        ))
    }

    fn parse_block(&mut self) -> ScriptResult<Expr> {
        let open = match self.check_exact("{") {
            Some(t) => t,
            None => return self.parse_array_literal(),
        };
        let mut body = vec![];
        while self.check_exact("}").is_none() {
            body.push(self.parse_expression()?);
        }
        Ok(Expr::Block(body, open.loc))
    }

    /// `[a, b, c]` desugars into `List.build(a, b, c)`.
    fn parse_array_literal(&mut self) -> ScriptResult<Expr> {
        let open = match self.check_exact("[") {
            Some(t) => t,
            None => return self.parse_term(),
        };
        let func = Box::new(Expr::Identifier("List.build".into(), open.loc.clone()));
        let mut args = vec![];
        if self.check_exact("]").is_none() {
            args.push(self.parse_expression()?);
            while self.check_exact(",").is_some() {
                args.push(self.parse_expression()?);
            }
            self.expect_exact("]")?;
        }
        Ok(Expr::Call(CallExpr { func, args }, open.loc))
    }

    fn parse_term(&mut self) -> ScriptResult<Expr> {
        let next = self.next()?;
        match next.kind {
            TokenKind::StringLiteral => Ok(Expr::Literal(Literal::String(next.word), next.loc)),
            TokenKind::NumberLiteral => match next.word.parse::<f64>() {
                Ok(value) => Ok(Expr::Literal(Literal::Number(value), next.loc)),
                Err(_) => Err(ScriptError::InvalidNumber(next.word, next.loc)),
            },
            TokenKind::ModuleRef => Ok(Expr::Identifier(next.word, next.loc)),
            TokenKind::Identifier => Ok(Expr::Identifier(next.word, next.loc)),
            _ => Err(ScriptError::UnexpectedToken {
                expected: "term".into(),
                found: next.word,
                loc: next.loc,
            }),
        }
    }
}

#[cfg(test)]
use crate::lang::lexer::Lexer;

#[cfg(test)]
fn parse_script(script: &str) -> ScriptResult<Module> {
    let tokens = Lexer::from_script("test.fun", script).lex().unwrap();
    Parser::new(tokens).parse_module()
}

#[cfg(test)]
fn parse_expr(script: &str) -> ScriptResult<Expr> {
    let tokens = Lexer::from_script("test.fun", script).lex().unwrap();
    Parser::new(tokens).parse_expression()
}

#[test]
fn test_parse_module() {
    let module = parse_script("fun main() = 1\nfun helper(a, b) = a").unwrap();
    assert_eq!(module.functions.len(), 2);
    match &module.functions[1] {
        Expr::Function(decl, loc) => {
            assert_eq!(decl.name, "helper");
            assert_eq!(decl.params, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(loc.line, 2);
        }
        e => panic!("expected function declaration, got {e:?}"),
    }
}

#[test]
fn test_number_literal() {
    match parse_expr("3.5").unwrap() {
        Expr::Literal(lit, _) => assert_eq!(lit, Literal::Number(3.5)),
        e => panic!("expected literal, got {e:?}"),
    }
}

#[test]
fn test_malformed_number_literal() {
    match parse_expr("1.2.3") {
        Err(ScriptError::InvalidNumber(word, _)) => assert_eq!(word, "1.2.3"),
        r => panic!("expected invalid number error, got {r:?}"),
    }
}

#[test]
fn test_sum_desugars_to_core_call() {
    match parse_expr("1 + 2").unwrap() {
        Expr::Call(call, _) => {
            match call.func.as_ref() {
                Expr::Identifier(name, _) => assert_eq!(name, "Core.+"),
                e => panic!("expected identifier callee, got {e:?}"),
            }
            assert_eq!(call.args.len(), 2);
        }
        e => panic!("expected call, got {e:?}"),
    }
}

#[test]
fn test_product_binds_tighter_than_sum() {
    // 1 + 2 * 3 must parse as Core.+(1, Core.*(2, 3)).
    match parse_expr("1 + 2 * 3").unwrap() {
        Expr::Call(call, _) => {
            match call.func.as_ref() {
                Expr::Identifier(name, _) => assert_eq!(name, "Core.+"),
                e => panic!("expected identifier callee, got {e:?}"),
            }
            match &call.args[1] {
                Expr::Call(inner, _) => match inner.func.as_ref() {
                    Expr::Identifier(name, _) => assert_eq!(name, "Core.*"),
                    e => panic!("expected identifier callee, got {e:?}"),
                },
                e => panic!("expected nested call, got {e:?}"),
            }
        }
        e => panic!("expected call, got {e:?}"),
    }
}

#[test]
fn test_binary_operators_do_not_chain() {
    // The sum level consumes exactly one operator application, so the
    // expression parser yields Core.+(1, 2) and leaves `+ 3` unconsumed.
    let tokens = Lexer::from_script("test.fun", "1 + 2 + 3").lex().unwrap();
    let mut parser = Parser::new(tokens);
    match parser.parse_expression().unwrap() {
        Expr::Call(call, _) => {
            assert_eq!(call.args.len(), 2);
            match (&call.args[0], &call.args[1]) {
                (Expr::Literal(a, _), Expr::Literal(b, _)) => {
                    assert_eq!(*a, Literal::Number(1.0));
                    assert_eq!(*b, Literal::Number(2.0));
                }
                args => panic!("expected two literal args, got {args:?}"),
            }
        }
        e => panic!("expected call, got {e:?}"),
    }
    // As a whole program the dangling `+ 3` is a top-level syntax error.
    match parse_script("fun main() = 1 + 2 + 3") {
        Err(ScriptError::UnexpectedToken {
            expected, found, ..
        }) => {
            assert_eq!(expected, "'fun'");
            assert_eq!(found, "+");
        }
        r => panic!("expected syntax error, got {r:?}"),
    }
}

#[test]
fn test_comparison_desugars() {
    match parse_expr("a < b").unwrap() {
        Expr::Call(call, _) => match call.func.as_ref() {
            Expr::Identifier(name, _) => assert_eq!(name, "Core.<"),
            e => panic!("expected identifier callee, got {e:?}"),
        },
        e => panic!("expected call, got {e:?}"),
    }
}

#[test]
fn test_array_literal_desugars_to_list_build() {
    match parse_expr("[1, 2, 3]").unwrap() {
        Expr::Call(call, _) => {
            match call.func.as_ref() {
                Expr::Identifier(name, _) => assert_eq!(name, "List.build"),
                e => panic!("expected identifier callee, got {e:?}"),
            }
            assert_eq!(call.args.len(), 3);
        }
        e => panic!("expected call, got {e:?}"),
    }
    match parse_expr("[]").unwrap() {
        Expr::Call(call, _) => assert!(call.args.is_empty()),
        e => panic!("expected call, got {e:?}"),
    }
}

#[test]
fn test_blocks() {
    match parse_expr("{}").unwrap() {
        Expr::Block(body, _) => assert!(body.is_empty()),
        e => panic!("expected block, got {e:?}"),
    }
    match parse_expr("{ val x = 1 x }").unwrap() {
        Expr::Block(body, _) => assert_eq!(body.len(), 2),
        e => panic!("expected block, got {e:?}"),
    }
}

#[test]
fn test_if_with_and_without_else() {
    match parse_expr("if (a) 1 else 2").unwrap() {
        Expr::If(if_expr, _) => assert!(if_expr.else_block.is_some()),
        e => panic!("expected if, got {e:?}"),
    }
    match parse_expr("if (a) 1").unwrap() {
        Expr::If(if_expr, _) => assert!(if_expr.else_block.is_none()),
        e => panic!("expected if, got {e:?}"),
    }
}

#[test]
fn test_call_arguments() {
    match parse_expr("f()").unwrap() {
        Expr::Call(call, _) => assert!(call.args.is_empty()),
        e => panic!("expected call, got {e:?}"),
    }
    match parse_expr("f(1, g(2), \"x\")").unwrap() {
        Expr::Call(call, _) => assert_eq!(call.args.len(), 3),
        e => panic!("expected call, got {e:?}"),
    }
}

#[test]
fn test_top_level_must_be_function() {
    match parse_script("val x = 1") {
        Err(ScriptError::UnexpectedToken {
            expected, found, ..
        }) => {
            assert_eq!(expected, "'fun'");
            assert_eq!(found, "val");
        }
        r => panic!("expected syntax error, got {r:?}"),
    }
}

#[test]
fn test_expected_term_error() {
    match parse_expr(")") {
        Err(ScriptError::UnexpectedToken { expected, .. }) => assert_eq!(expected, "term"),
        r => panic!("expected syntax error, got {r:?}"),
    }
}

#[test]
fn test_parse_is_deterministic() {
    let script = "fun main() = { val x = [1, 2] if (x) f(x) else \"none\" }";
    let first = format!("{:?}", parse_script(script).unwrap());
    let second = format!("{:?}", parse_script(script).unwrap());
    assert_eq!(first, second);
}
