use crate::ast::*;
use crate::lexer::Token;

pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("Parse error at token {position}: {message}")]
pub struct ParseError {
    pub code: &'static str,
    pub position: usize,
    pub span: Span,
    pub message: String,
}

type Result<T> = std::result::Result<T, ParseError>;

const MAX_ERRORS: usize = 20;

impl Parser {
    pub fn new(tokens: Vec<(Token, Span)>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.pos + ahead).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, s)| *s)
            .unwrap_or(Span::UNKNOWN)
    }

    /// Span of the most recently consumed token.
    fn prev_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|(_, s)| *s)
            .unwrap_or(Span::UNKNOWN)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos).map(|(t, _)| t);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<Span> {
        match self.peek() {
            Some(tok) if tok == expected => {
                let span = self.peek_span();
                self.advance();
                Ok(span)
            }
            Some(tok) => Err(self.error("CVD-P002", format!("expected {:?}, got {:?}", expected, tok))),
            None => Err(self.error("CVD-P003", format!("expected {:?}, got EOF", expected))),
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            Some(tok) => Err(self.error("CVD-P002", format!("expected identifier, got {:?}", tok))),
            None => Err(self.error("CVD-P003", "expected identifier, got EOF".into())),
        }
    }

    fn error(&self, code: &'static str, message: String) -> ParseError {
        ParseError { code, position: self.pos, span: self.peek_span(), message }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Statement terminator. May be left out before `}` and at the end of input.
    fn end_stmt(&mut self) -> Result<()> {
        if self.eat(&Token::Semi) || matches!(self.peek(), None | Some(Token::RBrace)) {
            return Ok(());
        }
        self.expect(&Token::Semi).map(|_| ())
    }

    // ---- Top-level parsing ----

    /// Parse everything, recovering at statement boundaries so one run
    /// reports several errors.
    pub fn parse_program(&mut self) -> (Program, Vec<ParseError>) {
        let mut body = Vec::new();
        let mut errors = Vec::new();

        while !self.at_end() && errors.len() < MAX_ERRORS {
            match self.parse_stmt() {
                Ok(stmt) => body.push(stmt),
                Err(e) => {
                    errors.push(e);
                    self.sync_to_stmt_boundary();
                }
            }
        }

        (Program { body, source: None }, errors)
    }

    /// Skip to just past the next `;` or closing brace at depth zero.
    fn sync_to_stmt_boundary(&mut self) {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.peek().cloned() {
            match tok {
                Token::LBrace => depth += 1,
                Token::RBrace if depth <= 1 => {
                    self.advance();
                    break;
                }
                Token::RBrace => depth -= 1,
                Token::Semi if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            self.advance();
        }
        if self.pos == start {
            self.advance();
        }
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.peek_span();
        let stmt = match self.peek() {
            Some(Token::Var) => self.parse_var()?,
            Some(Token::Function) => self.parse_function()?,
            Some(Token::Return) => {
                self.advance();
                let value = if matches!(self.peek(), None | Some(Token::Semi) | Some(Token::RBrace)) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.end_stmt()?;
                Stmt::Return(value)
            }
            Some(Token::If) => self.parse_if()?,
            Some(Token::While) => {
                self.advance();
                let condition = self.parse_condition()?;
                let body = self.parse_branch()?;
                Stmt::While { condition, body }
            }
            Some(Token::LBrace) => Stmt::Block(self.parse_block()?),
            Some(Token::Ident(_)) if self.peek_at(1) == Some(&Token::Assign) => {
                let name = self.expect_ident()?;
                self.expect(&Token::Assign)?;
                let value = self.parse_expr()?;
                self.end_stmt()?;
                Stmt::Assign { name, value }
            }
            Some(_) => {
                let expr = self.parse_expr()?;
                if self.peek() == Some(&Token::Assign) {
                    return Err(self.error("CVD-P004", "only a plain variable name can be assigned to".into()));
                }
                self.end_stmt()?;
                Stmt::Expr(expr)
            }
            None => return Err(self.error("CVD-P003", "expected statement, got EOF".into())),
        };
        Ok(Spanned::new(stmt, start.merge(self.prev_span())))
    }

    /// `var name = expr;`
    fn parse_var(&mut self) -> Result<Stmt> {
        self.expect(&Token::Var)?;
        let name = self.expect_ident()?;
        let init = if self.eat(&Token::Assign) { Some(self.parse_expr()?) } else { None };
        self.end_stmt()?;
        Ok(Stmt::Var { name, init })
    }

    /// `function name(a, b) { body }`
    fn parse_function(&mut self) -> Result<Stmt> {
        self.expect(&Token::Function)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;
        let mut params = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                params.push(self.expect_ident()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma)?;
            }
        }
        let body = self.parse_block()?;
        Ok(Stmt::Function { name, params, body })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(&Token::If)?;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_branch()?;
        let else_branch = if self.eat(&Token::Else) { Some(self.parse_branch()?) } else { None };
        Ok(Stmt::If { condition, then_branch, else_branch })
    }

    fn parse_condition(&mut self) -> Result<Expr> {
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Ok(cond)
    }

    /// Body of `if`/`else`/`while`: a braced block or a single statement.
    fn parse_branch(&mut self) -> Result<Block> {
        if self.peek() == Some(&Token::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.expect(&Token::LBrace)?;
        let mut body = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            if self.at_end() {
                return Err(self.error("CVD-P003", "unclosed block, expected RBrace".into()));
            }
            body.push(self.parse_stmt()?);
        }
        self.expect(&Token::RBrace)?;
        Ok(body)
    }

    // ---- Expressions, lowest precedence first ----

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_equality()
    }

    fn binary(
        &mut self,
        next: fn(&mut Self) -> Result<Expr>,
        ops: &[(Token, BinOp)],
    ) -> Result<Expr> {
        let mut left = next(self)?;
        'outer: loop {
            for (tok, op) in ops {
                if self.eat(tok) {
                    let right = next(self)?;
                    left = Expr::BinOp { op: *op, left: Box::new(left), right: Box::new(right) };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        self.binary(Self::parse_comparison, &[(Token::EqEq, BinOp::Equals), (Token::NotEq, BinOp::NotEquals)])
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.binary(
            Self::parse_additive,
            &[
                (Token::Less, BinOp::LessThan),
                (Token::LessEq, BinOp::LessOrEqual),
                (Token::Greater, BinOp::GreaterThan),
                (Token::GreaterEq, BinOp::GreaterOrEqual),
            ],
        )
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.binary(Self::parse_multiplicative, &[(Token::Plus, BinOp::Add), (Token::Minus, BinOp::Subtract)])
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        self.binary(
            Self::parse_unary,
            &[(Token::Star, BinOp::Multiply), (Token::Slash, BinOp::Divide), (Token::Percent, BinOp::Modulo)],
        )
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Negate,
            _ => return self.parse_call(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::UnaryOp { op, operand: Box::new(operand) })
    }

    fn parse_call(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        while self.eat(&Token::LParen) {
            let mut args = Vec::new();
            if !self.eat(&Token::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if self.eat(&Token::RParen) {
                        break;
                    }
                    self.expect(&Token::Comma)?;
                }
            }
            expr = Expr::Call { callee: Box::new(expr), args };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error("CVD-P003", "expected expression, got EOF".into()));
        };
        let expr = match tok {
            Token::Int(n) => Expr::Literal(Literal::Int(n)),
            Token::Float(f) => Expr::Literal(Literal::Float(f)),
            Token::Str(s) => Expr::Literal(Literal::Text(s)),
            Token::True => Expr::Literal(Literal::Bool(true)),
            Token::False => Expr::Literal(Literal::Bool(false)),
            Token::Null => Expr::Literal(Literal::Null),
            Token::Undefined => Expr::Literal(Literal::Undefined),
            Token::Ident(name) => Expr::Ref(name),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(inner);
            }
            other => return Err(self.error("CVD-P001", format!("expected expression, got {:?}", other))),
        };
        self.advance();
        Ok(expr)
    }
}

/// Parse with recovery; all errors found are returned alongside the partial program.
pub fn parse_all(tokens: Vec<(Token, Span)>) -> (Program, Vec<ParseError>) {
    Parser::new(tokens).parse_program()
}

/// Parse, failing on the first error.
pub fn parse(tokens: Vec<(Token, Span)>) -> std::result::Result<Program, ParseError> {
    let (program, errors) = parse_all(tokens);
    match errors.into_iter().next() {
        Some(e) => Err(e),
        None => Ok(program),
    }
}
