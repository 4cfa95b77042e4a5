use std::rc::Rc;

use crate::ast::{ArithOp, EqOp, LogicOp, Node, NodeKind, Param, RelOp, UnaryOp};
use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::location::Location;
use crate::token::{Keyword, Token, TokenKind};

/// Recursive-descent, precedence-climbing parser producing the flat
/// `Node` tree `eval.rs` walks. There is no separate pattern grammar:
/// `*name` and `<expr>` are recognized directly in `parse_primary` at
/// prefix position (neither token can otherwise start a primary), and a
/// plain expression tree is reshaped into a pattern tree in-place by
/// `expr_to_pattern` once the parser sees `=:` follow it — the same
/// position-based trick the expression grammar already relies on.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file: Rc<str>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, file: Rc<str>) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
        }
    }

    pub fn parse_program(source: &str, file: impl Into<Rc<str>>) -> Result<Rc<Node>> {
        let file: Rc<str> = file.into();
        let tokens = Lexer::new(source, file.clone()).tokenize()?;
        let mut parser = Parser::new(tokens, file);
        parser.parse_block_until(|k| matches!(k, TokenKind::Eof))
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn loc(&self) -> Location {
        self.tokens[self.pos].loc.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(Error::Parse(format!(
                "{}: expected {:?}, found {:?}",
                self.loc(),
                kind,
                self.peek()
            )))
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn parse_block_until(&mut self, stop: impl Fn(&TokenKind) -> bool) -> Result<Rc<Node>> {
        let loc = self.loc();
        let statements = self.parse_statement_list_until(stop)?;
        Ok(Node::new(NodeKind::Block(statements), loc))
    }

    fn parse_statement_list_until(&mut self, stop: impl Fn(&TokenKind) -> bool) -> Result<Vec<Rc<Node>>> {
        let mut statements = Vec::new();
        loop {
            self.skip_separators();
            if stop(self.peek()) {
                break;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        let left = self.parse_expr()?;

        if self.eat(&TokenKind::Assign) {
            let name = match &left.kind {
                NodeKind::VariableReference(name) | NodeKind::ConstReference(name) => name.clone(),
                _ => {
                    return Err(Error::Parse(format!(
                        "{}: left-hand side of '=' must be a plain identifier or constant",
                        loc
                    )))
                }
            };
            let value = self.parse_expr()?;
            return Ok(Node::new(NodeKind::SimpleAssignment { name, value }, loc));
        }

        if self.eat(&TokenKind::MatchAssign) {
            let pattern = expr_to_pattern(&left)?;
            let value = self.parse_expr()?;
            return Ok(Node::new(NodeKind::MatchAssign { pattern, value }, loc));
        }

        Ok(left)
    }

    pub fn parse_expr(&mut self) -> Result<Rc<Node>> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            let loc = self.advance().loc;
            let right = self.parse_and()?;
            left = Node::new(
                NodeKind::LogicalExpression {
                    op: LogicOp::Or,
                    left,
                    right,
                },
                loc,
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            let loc = self.advance().loc;
            let right = self.parse_equality()?;
            left = Node::new(
                NodeKind::LogicalExpression {
                    op: LogicOp::And,
                    left,
                    right,
                },
                loc,
            );
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                TokenKind::EqEq => EqOp::Eq,
                TokenKind::NotEq => EqOp::NotEq,
                _ => break,
            };
            let loc = self.advance().loc;
            let right = self.parse_relational()?;
            left = Node::new(NodeKind::EqualityExpression { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Lt => RelOp::Lt,
                TokenKind::Le => RelOp::Le,
                TokenKind::Gt => RelOp::Gt,
                TokenKind::Ge => RelOp::Ge,
                _ => break,
            };
            let loc = self.advance().loc;
            let right = self.parse_additive()?;
            left = Node::new(NodeKind::RelationalExpression { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            let loc = self.advance().loc;
            let right = self.parse_multiplicative()?;
            left = Node::new(NodeKind::BinaryExpression { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Rc<Node>> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            let loc = self.advance().loc;
            let right = self.parse_unary()?;
            left = Node::new(NodeKind::BinaryExpression { op, left, right }, loc);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Rc<Node>> {
        match self.peek() {
            TokenKind::Bang => {
                let loc = self.advance().loc;
                let operand = self.parse_unary()?;
                Ok(Node::new(
                    NodeKind::UnaryExpression {
                        op: UnaryOp::Not,
                        operand,
                    },
                    loc,
                ))
            }
            TokenKind::Minus => {
                let loc = self.advance().loc;
                let operand = self.parse_unary()?;
                Ok(Node::new(
                    NodeKind::UnaryExpression {
                        op: UnaryOp::Negate,
                        operand,
                    },
                    loc,
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    /// `receiver.name` and `receiver.name(args…)` are sugar for a plain
    /// `FunctionCall`: the receiver becomes the first argument. There is
    /// no dedicated method-call AST node — just the same `FunctionCall`
    /// every bare `name(args)` call already produces, which is what lets
    /// `1.type` resolve through the same builtin dispatch as `type(1)`.
    fn parse_postfix(&mut self) -> Result<Rc<Node>> {
        let mut node = self.parse_call_or_primary()?;
        while self.check(&TokenKind::Dot) {
            let loc = self.advance().loc;
            let name = self.expect_ident()?;
            let mut args = vec![node];
            if self.eat(&TokenKind::LParen) {
                args.append(&mut self.parse_call_args()?);
            }
            node = Node::new(
                NodeKind::FunctionCall {
                    name: Rc::from(name.as_str()),
                    args,
                },
                loc,
            );
        }
        Ok(node)
    }

    fn parse_call_or_primary(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        if let TokenKind::Ident(name) = self.peek().clone() {
            if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::LParen)) {
                self.advance();
                self.advance();
                let args = self.parse_call_args()?;
                return Ok(Node::new(
                    NodeKind::FunctionCall {
                        name: Rc::from(name.as_str()),
                        args,
                    },
                    loc,
                ));
            }
        }
        self.parse_primary()
    }

    fn parse_call_args(&mut self) -> Result<Vec<Rc<Node>>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        match self.peek().clone() {
            TokenKind::Int(i) => {
                self.advance();
                Ok(Node::new(NodeKind::IntegerLiteral(i), loc))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Node::new(NodeKind::FloatLiteral(f), loc))
            }
            TokenKind::Str(s) => {
                self.advance();
                self.build_string_node(&s, loc)
            }
            TokenKind::Char(c) => {
                self.advance();
                let mut buf = [0u8; 4];
                Ok(Node::new(
                    NodeKind::StringLiteral(Rc::from(c.encode_utf8(&mut buf) as &str)),
                    loc,
                ))
            }
            TokenKind::Sym(s) => {
                self.advance();
                Ok(Node::new(NodeKind::SymbolLiteral(Rc::from(s.as_str())), loc))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Node::new(NodeKind::VariableReference(Rc::from(name.as_str())), loc))
            }
            TokenKind::Const(name) => {
                self.advance();
                Ok(Node::new(NodeKind::ConstReference(Rc::from(name.as_str())), loc))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Node::new(NodeKind::BooleanLiteral(true), loc))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Node::new(NodeKind::BooleanLiteral(false), loc))
            }
            TokenKind::Keyword(Keyword::Nil) => {
                self.advance();
                Ok(Node::new(NodeKind::NilLiteral, loc))
            }
            TokenKind::Keyword(Keyword::SelfKw) => {
                self.advance();
                Ok(Node::new(NodeKind::VariableReference(Rc::from("self")), loc))
            }
            TokenKind::Keyword(Keyword::Def) => self.parse_function_definition(),
            TokenKind::LParen => {
                self.advance();
                let statements =
                    self.parse_statement_list_until(|k| matches!(k, TokenKind::RParen))?;
                self.expect(&TokenKind::RParen)?;
                let mut statements = statements;
                if statements.len() == 1 {
                    Ok(statements.pop().unwrap())
                } else {
                    Ok(Node::new(NodeKind::ExpressionList(statements), loc))
                }
            }
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace => self.parse_map_literal(),
            TokenKind::Star => {
                self.advance();
                let name = self.expect_ident()?;
                Ok(Node::new(NodeKind::SplatPattern(Rc::from(name.as_str())), loc))
            }
            TokenKind::Lt => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::Gt)?;
                Ok(Node::new(NodeKind::InterpolationExpression(inner), loc))
            }
            other => Err(Error::Parse(format!(
                "{}: unexpected token {:?}",
                loc, other
            ))),
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(Error::Parse(format!(
                "{}: expected identifier, found {:?}",
                self.loc(),
                other
            ))),
        }
    }

    fn parse_list_literal(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        self.advance();
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                items.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(Node::new(NodeKind::ListLiteral(items), loc))
    }

    fn parse_map_literal(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        self.advance();
        let mut pairs = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                let key = self.parse_map_key()?;
                self.expect(&TokenKind::Colon)?;
                let value = self.parse_expr()?;
                pairs.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Node::new(NodeKind::MapLiteral(pairs), loc))
    }

    /// Map keys are "static" (§4.3): a bare identifier or constant is
    /// shorthand for a `Symbol` key, matching the shorthand the match
    /// engine's map pattern keys use (§4.4's `{k1: p1, …}`).
    fn parse_map_key(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Node::new(NodeKind::SymbolLiteral(Rc::from(name.as_str())), loc))
            }
            TokenKind::Const(name) => {
                self.advance();
                Ok(Node::new(NodeKind::SymbolLiteral(Rc::from(name.as_str())), loc))
            }
            TokenKind::Sym(s) => {
                self.advance();
                Ok(Node::new(NodeKind::SymbolLiteral(Rc::from(s.as_str())), loc))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Node::new(NodeKind::StringLiteral(Rc::from(s.as_str())), loc))
            }
            TokenKind::Int(i) => {
                self.advance();
                Ok(Node::new(NodeKind::IntegerLiteral(i), loc))
            }
            other => Err(Error::Parse(format!(
                "{}: invalid map key {:?}",
                loc, other
            ))),
        }
    }

    fn parse_function_definition(&mut self) -> Result<Rc<Node>> {
        let loc = self.loc();
        self.advance(); // `def`
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let splat = self.eat(&TokenKind::Star);
                let pname = self.expect_ident()?;
                params.push(Param {
                    name: Rc::from(pname.as_str()),
                    splat,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block_until(|k| matches!(k, TokenKind::Keyword(Keyword::End)))?;
        self.expect(&TokenKind::Keyword(Keyword::End))?;
        Ok(Node::new(
            NodeKind::FunctionDefinition {
                name: Rc::from(name.as_str()),
                params,
                body,
            },
            loc,
        ))
    }

    /// Splits a string literal's raw text on `<...>` interpolation
    /// segments, each of which is parsed as a full expression via a
    /// fresh lexer/parser pair over just that substring. A string with no
    /// `<...>` segment produces a plain `StringLiteral` rather than
    /// paying for the `InterpolatedStringLiteral` wrapper.
    fn build_string_node(&self, s: &str, loc: Location) -> Result<Rc<Node>> {
        let chars: Vec<char> = s.chars().collect();
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '<' {
                if let Some(end) = chars[i + 1..].iter().position(|&c| c == '>') {
                    if !text.is_empty() {
                        parts.push(Node::new(
                            NodeKind::StringLiteral(Rc::from(text.as_str())),
                            loc.clone(),
                        ));
                        text.clear();
                    }
                    let inner: String = chars[i + 1..i + 1 + end].iter().collect();
                    let tokens = Lexer::new(&inner, self.file.clone()).tokenize()?;
                    let mut sub = Parser::new(tokens, self.file.clone());
                    parts.push(sub.parse_expr()?);
                    i += end + 2;
                    continue;
                }
            }
            text.push(chars[i]);
            i += 1;
        }
        if parts.is_empty() {
            return Ok(Node::new(NodeKind::StringLiteral(Rc::from(text.as_str())), loc));
        }
        if !text.is_empty() {
            parts.push(Node::new(NodeKind::StringLiteral(Rc::from(text.as_str())), loc.clone()));
        }
        Ok(Node::new(NodeKind::InterpolatedStringLiteral(parts), loc))
    }
}

/// Reinterprets an already-parsed expression tree as a match pattern
/// (§4.4). Only called once the parser has seen `=:` follow the tree, so
/// the conversion never has to guess — `SplatPattern` and
/// `InterpolationExpression` nodes (which only `parse_primary` produces,
/// at prefix position) pass through unchanged, and container/identifier
/// nodes are relabeled into their pattern-kind counterparts.
fn expr_to_pattern(node: &Rc<Node>) -> Result<Rc<Node>> {
    let loc = node.loc.clone();
    let kind = match &node.kind {
        NodeKind::VariableReference(name) => NodeKind::BindingPattern(name.clone()),
        NodeKind::ConstReference(name) => NodeKind::ConstPattern(name.clone()),
        NodeKind::ListLiteral(items) => {
            let items = items
                .iter()
                .map(expr_to_pattern)
                .collect::<Result<Vec<_>>>()?;
            NodeKind::ListPattern(items)
        }
        NodeKind::MapLiteral(pairs) => {
            let pairs = pairs
                .iter()
                .map(|(k, v)| Ok((k.clone(), expr_to_pattern(v)?)))
                .collect::<Result<Vec<_>>>()?;
            NodeKind::MapPattern(pairs)
        }
        NodeKind::SplatPattern(_) | NodeKind::InterpolationExpression(_) => {
            return Ok(node.clone())
        }
        NodeKind::IntegerLiteral(_)
        | NodeKind::FloatLiteral(_)
        | NodeKind::StringLiteral(_)
        | NodeKind::InterpolatedStringLiteral(_)
        | NodeKind::SymbolLiteral(_)
        | NodeKind::BooleanLiteral(_)
        | NodeKind::NilLiteral => return Ok(node.clone()),
        other => {
            return Err(Error::Parse(format!(
                "{}: {:?} is not a valid match pattern",
                loc, other
            )))
        }
    };
    Ok(Node::new(kind, loc))
}
