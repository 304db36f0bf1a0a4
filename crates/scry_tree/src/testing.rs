//! A small JavaScript-subset parser for tests.
//!
//! Produces acorn's tree shapes and byte offsets for the subset it
//! understands: function declarations and expressions, `var`/`let`/`const`,
//! `return`, `if`/`else`, `while`, blocks, and expressions with the usual
//! precedence (assignment, `?:`, `||`, `&&`, equality, relational, additive,
//! multiplicative, unary, `++`/`--`, calls, member access, `new`), plus array
//! and object literals. Unlike acorn, a parenthesized operand does not widen
//! the span of the expression it starts.
//!
//! Anything else (regex literals, arrow functions, classes, templates) is a
//! parse error.

use thiserror::Error;

use crate::kind::NodeKind;
use crate::span::Span;
use crate::stack::ensure_sufficient_stack;
use crate::syntax::SyntaxNode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at byte {offset}: {message}")]
pub struct ParseError {
    pub offset: u32,
    pub message: String,
}

/// Parse `source` into a `Program` node.
pub fn parse(source: &str) -> Result<SyntaxNode, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    let mut body = Vec::new();
    while parser.peek().kind != TokenKind::Eof {
        body.push(parser.statement()?);
    }
    Ok(SyntaxNode::new(NodeKind::Program, Span::new(0, source.len() as u32)).with_children(body))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    String,
    Punct,
    Eof,
}

#[derive(Copy, Clone, Debug)]
struct Token {
    kind: TokenKind,
    span: Span,
}

/// Longest first, so that `===` wins over `==` and `=`.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "++", "--", "{", "}", "(", ")",
    "[", "]", ";", ",", ".", "<", ">", "+", "-", "*", "/", "%", "=", "!", "?", ":",
];

const KEYWORDS: &[&str] = &[
    "function", "var", "let", "const", "return", "if", "else", "while", "true", "false", "null",
    "this", "new", "typeof",
];

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_ascii_alphabetic()
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let error = |offset: usize, message: &str| ParseError {
        offset: offset as u32,
        message: message.to_owned(),
    };

    while i < bytes.len() {
        let rest = &source[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };
        if c.is_whitespace() {
            i += c.len_utf8();
            continue;
        }
        if rest.starts_with("//") {
            i += rest.find('\n').unwrap_or(rest.len());
            continue;
        }
        if rest.starts_with("/*") {
            let Some(end) = rest[2..].find("*/") else {
                return Err(error(i, "unterminated comment"));
            };
            i += end + 4;
            continue;
        }

        let start = i;
        let kind = if is_ident_start(c) {
            i += rest.find(|c: char| !is_ident_part(c)).unwrap_or(rest.len());
            TokenKind::Ident
        } else if c.is_ascii_digit() {
            i += rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            TokenKind::Number
        } else if c == '"' || c == '\'' {
            let mut escaped = false;
            let mut end = None;
            for (offset, ch) in rest.char_indices().skip(1) {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == c {
                    end = Some(offset + 1);
                    break;
                } else if ch == '\n' {
                    break;
                }
            }
            let Some(end) = end else {
                return Err(error(i, "unterminated string"));
            };
            i += end;
            TokenKind::String
        } else if let Some(punct) = PUNCTUATORS.iter().find(|p| rest.starts_with(*p)) {
            i += punct.len();
            TokenKind::Punct
        } else {
            return Err(error(i, &format!("unexpected character {c:?}")));
        };
        tokens.push(Token {
            kind,
            span: Span::new(start as u32, i as u32),
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len() as u32, source.len() as u32),
    });
    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn text(&self, token: Token) -> &'a str {
        &self.source[token.span.to_range()]
    }

    fn at(&self, text: &str) -> bool {
        let token = self.peek();
        matches!(token.kind, TokenKind::Punct | TokenKind::Ident) && self.text(token) == text
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, text: &str) -> Option<Token> {
        self.at(text).then(|| self.bump())
    }

    fn expect(&mut self, text: &str) -> Result<Token, ParseError> {
        self.eat(text)
            .ok_or_else(|| self.error(&format!("expected `{text}`")))
    }

    fn error(&self, message: &str) -> ParseError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of input"
        } else {
            self.text(token)
        };
        ParseError {
            offset: token.span.start,
            message: format!("{message}, found {found}"),
        }
    }

    /// End of the statement: an optional `;` is part of the statement span.
    fn statement_end(&mut self, end: u32) -> u32 {
        self.eat(";").map_or(end, |semi| semi.span.end)
    }

    fn statement(&mut self) -> Result<SyntaxNode, ParseError> {
        ensure_sufficient_stack(|| {
            let token = self.peek();
            if token.kind == TokenKind::Ident {
                match self.text(token) {
                    "function" => return self.function(NodeKind::FunctionDeclaration),
                    "var" | "let" | "const" => return self.variable_declaration(),
                    "return" => return self.return_statement(),
                    "if" => return self.if_statement(),
                    "while" => return self.while_statement(),
                    _ => {}
                }
            }
            if self.at("{") {
                return self.block();
            }
            if let Some(semi) = self.eat(";") {
                return Ok(SyntaxNode::new(NodeKind::EmptyStatement, semi.span));
            }
            let expression = self.expression()?;
            let start = expression.span.start;
            let end = self.statement_end(expression.span.end);
            Ok(SyntaxNode::new(NodeKind::ExpressionStatement, Span::new(start, end))
                .with_children(vec![expression]))
        })
    }

    fn block(&mut self) -> Result<SyntaxNode, ParseError> {
        let open = self.expect("{")?;
        let mut body = Vec::new();
        while !self.at("}") {
            if self.peek().kind == TokenKind::Eof {
                return Err(self.error("expected `}`"));
            }
            body.push(self.statement()?);
        }
        let close = self.bump();
        Ok(SyntaxNode::new(NodeKind::BlockStatement, open.span.merge(close.span)).with_children(body))
    }

    fn function(&mut self, kind: NodeKind) -> Result<SyntaxNode, ParseError> {
        let keyword = self.expect("function")?;
        let mut children = Vec::new();
        if self.peek().kind == TokenKind::Ident {
            children.push(self.identifier()?);
        } else if kind == NodeKind::FunctionDeclaration {
            return Err(self.error("expected function name"));
        }
        self.expect("(")?;
        while !self.at(")") {
            children.push(self.identifier()?);
            if self.eat(",").is_none() {
                break;
            }
        }
        self.expect(")")?;
        let body = self.block()?;
        let span = keyword.span.merge(body.span);
        children.push(body);
        Ok(SyntaxNode::new(kind, span).with_children(children))
    }

    fn variable_declaration(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.bump();
        let mut declarators = Vec::new();
        loop {
            let id = self.identifier()?;
            let mut span = id.span;
            let mut children = vec![id];
            if self.eat("=").is_some() {
                let init = self.assignment()?;
                span = span.merge(init.span);
                children.push(init);
            }
            declarators.push(SyntaxNode::new(NodeKind::VariableDeclarator, span).with_children(children));
            if self.eat(",").is_none() {
                break;
            }
        }
        let last_end = declarators.last().map_or(keyword.span.end, |d| d.span.end);
        let end = self.statement_end(last_end);
        Ok(
            SyntaxNode::new(NodeKind::VariableDeclaration, Span::new(keyword.span.start, end))
                .with_children(declarators),
        )
    }

    fn return_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.bump();
        let mut children = Vec::new();
        let mut end = keyword.span.end;
        if !(self.at(";") || self.at("}") || self.peek().kind == TokenKind::Eof) {
            let argument = self.expression()?;
            end = argument.span.end;
            children.push(argument);
        }
        let end = self.statement_end(end);
        Ok(SyntaxNode::new(NodeKind::ReturnStatement, Span::new(keyword.span.start, end))
            .with_children(children))
    }

    fn if_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.bump();
        self.expect("(")?;
        let test = self.expression()?;
        self.expect(")")?;
        let consequent = self.statement()?;
        let mut span = keyword.span.merge(consequent.span);
        let mut children = vec![test, consequent];
        if self.eat("else").is_some() {
            let alternate = self.statement()?;
            span = span.merge(alternate.span);
            children.push(alternate);
        }
        Ok(SyntaxNode::new(NodeKind::IfStatement, span).with_children(children))
    }

    fn while_statement(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.bump();
        self.expect("(")?;
        let test = self.expression()?;
        self.expect(")")?;
        let body = self.statement()?;
        let span = keyword.span.merge(body.span);
        Ok(SyntaxNode::new(NodeKind::WhileStatement, span).with_children(vec![test, body]))
    }

    fn identifier(&mut self) -> Result<SyntaxNode, ParseError> {
        let token = self.peek();
        let text = self.text(token);
        if token.kind != TokenKind::Ident || KEYWORDS.contains(&text) {
            return Err(self.error("expected identifier"));
        }
        self.bump();
        Ok(SyntaxNode::new(NodeKind::Identifier, token.span).with_name(text))
    }

    fn expression(&mut self) -> Result<SyntaxNode, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<SyntaxNode, ParseError> {
        ensure_sufficient_stack(|| {
            let left = self.conditional()?;
            if self.eat("=").or_else(|| self.eat("+=")).or_else(|| self.eat("-=")).is_some() {
                let right = self.assignment()?;
                let span = left.span.merge(right.span);
                return Ok(SyntaxNode::new(NodeKind::AssignmentExpression, span)
                    .with_children(vec![left, right]));
            }
            Ok(left)
        })
    }

    fn conditional(&mut self) -> Result<SyntaxNode, ParseError> {
        let test = self.binary(0)?;
        if self.eat("?").is_none() {
            return Ok(test);
        }
        let consequent = self.assignment()?;
        self.expect(":")?;
        let alternate = self.assignment()?;
        let span = test.span.merge(alternate.span);
        Ok(SyntaxNode::new(NodeKind::ConditionalExpression, span)
            .with_children(vec![test, consequent, alternate]))
    }

    fn binary_operator(&self) -> Option<(u8, NodeKind)> {
        let token = self.peek();
        if token.kind != TokenKind::Punct {
            return None;
        }
        Some(match self.text(token) {
            "||" => (1, NodeKind::LogicalExpression),
            "&&" => (2, NodeKind::LogicalExpression),
            "==" | "!=" | "===" | "!==" => (3, NodeKind::BinaryExpression),
            "<" | ">" | "<=" | ">=" => (4, NodeKind::BinaryExpression),
            "+" | "-" => (5, NodeKind::BinaryExpression),
            "*" | "/" | "%" => (6, NodeKind::BinaryExpression),
            _ => return None,
        })
    }

    fn binary(&mut self, min_precedence: u8) -> Result<SyntaxNode, ParseError> {
        let mut left = self.unary()?;
        while let Some((precedence, kind)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            self.bump();
            let right = self.binary(precedence + 1)?;
            let span = left.span.merge(right.span);
            left = SyntaxNode::new(kind, span).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<SyntaxNode, ParseError> {
        ensure_sufficient_stack(|| {
            for operator in ["!", "-", "+", "typeof"] {
                if let Some(token) = self.eat(operator) {
                    let argument = self.unary()?;
                    let span = token.span.merge(argument.span);
                    return Ok(SyntaxNode::new(NodeKind::UnaryExpression, span)
                        .with_children(vec![argument]));
                }
            }
            for operator in ["++", "--"] {
                if let Some(token) = self.eat(operator) {
                    let argument = self.unary()?;
                    let span = token.span.merge(argument.span);
                    return Ok(SyntaxNode::new(NodeKind::UpdateExpression, span)
                        .with_children(vec![argument]));
                }
            }
            let expression = self.call_or_member(true)?;
            for operator in ["++", "--"] {
                if let Some(token) = self.eat(operator) {
                    let span = expression.span.merge(token.span);
                    return Ok(SyntaxNode::new(NodeKind::UpdateExpression, span)
                        .with_children(vec![expression]));
                }
            }
            Ok(expression)
        })
    }

    fn arguments(&mut self) -> Result<(Vec<SyntaxNode>, Token), ParseError> {
        self.expect("(")?;
        let mut arguments = Vec::new();
        while !self.at(")") {
            arguments.push(self.assignment()?);
            if self.eat(",").is_none() {
                break;
            }
        }
        let close = self.expect(")")?;
        Ok((arguments, close))
    }

    fn call_or_member(&mut self, allow_calls: bool) -> Result<SyntaxNode, ParseError> {
        let mut expression = if self.at("new") {
            self.new_expression()?
        } else {
            self.primary()?
        };
        loop {
            if self.eat(".").is_some() {
                let property = self.property_name()?;
                let span = expression.span.merge(property.span);
                expression = SyntaxNode::new(NodeKind::MemberExpression, span)
                    .with_children(vec![expression, property]);
            } else if self.eat("[").is_some() {
                let index = self.expression()?;
                let close = self.expect("]")?;
                let span = expression.span.merge(close.span);
                expression = SyntaxNode::new(NodeKind::MemberExpression, span)
                    .with_children(vec![expression, index]);
            } else if allow_calls && self.at("(") {
                let (arguments, close) = self.arguments()?;
                let span = expression.span.merge(close.span);
                let mut children = vec![expression];
                children.extend(arguments);
                expression = SyntaxNode::new(NodeKind::CallExpression, span).with_children(children);
            } else {
                return Ok(expression);
            }
        }
    }

    fn new_expression(&mut self) -> Result<SyntaxNode, ParseError> {
        let keyword = self.expect("new")?;
        let callee = self.call_or_member(false)?;
        let mut span = keyword.span.merge(callee.span);
        let mut children = vec![callee];
        if self.at("(") {
            let (arguments, close) = self.arguments()?;
            span = span.merge(close.span);
            children.extend(arguments);
        }
        Ok(SyntaxNode::new(NodeKind::NewExpression, span).with_children(children))
    }

    /// Identifier after `.`; keywords are allowed there.
    fn property_name(&mut self) -> Result<SyntaxNode, ParseError> {
        let token = self.peek();
        if token.kind != TokenKind::Ident {
            return Err(self.error("expected property name"));
        }
        self.bump();
        Ok(SyntaxNode::new(NodeKind::Identifier, token.span).with_name(self.text(token)))
    }

    fn primary(&mut self) -> Result<SyntaxNode, ParseError> {
        ensure_sufficient_stack(|| {
            let token = self.peek();
            match token.kind {
                TokenKind::Number | TokenKind::String => {
                    self.bump();
                    Ok(SyntaxNode::new(NodeKind::Literal, token.span).with_raw(self.text(token)))
                }
                TokenKind::Ident => match self.text(token) {
                    "true" | "false" | "null" => {
                        self.bump();
                        Ok(SyntaxNode::new(NodeKind::Literal, token.span).with_raw(self.text(token)))
                    }
                    "this" => {
                        self.bump();
                        Ok(SyntaxNode::new(NodeKind::ThisExpression, token.span))
                    }
                    "function" => self.function(NodeKind::FunctionExpression),
                    _ => self.identifier(),
                },
                TokenKind::Punct if self.at("(") => {
                    self.bump();
                    let inner = self.expression()?;
                    self.expect(")")?;
                    Ok(inner)
                }
                TokenKind::Punct if self.at("[") => self.array(),
                TokenKind::Punct if self.at("{") => self.object(),
                _ => Err(self.error("expected expression")),
            }
        })
    }

    fn array(&mut self) -> Result<SyntaxNode, ParseError> {
        let open = self.expect("[")?;
        let mut elements = Vec::new();
        while !self.at("]") {
            elements.push(self.assignment()?);
            if self.eat(",").is_none() {
                break;
            }
        }
        let close = self.expect("]")?;
        Ok(SyntaxNode::new(NodeKind::ArrayExpression, open.span.merge(close.span))
            .with_children(elements))
    }

    fn object(&mut self) -> Result<SyntaxNode, ParseError> {
        let open = self.expect("{")?;
        let mut properties = Vec::new();
        while !self.at("}") {
            let token = self.peek();
            let key = match token.kind {
                TokenKind::Ident => self.property_name()?,
                TokenKind::String | TokenKind::Number => {
                    self.bump();
                    SyntaxNode::new(NodeKind::Literal, token.span).with_raw(self.text(token))
                }
                _ => return Err(self.error("expected property key")),
            };
            let value = if self.eat(":").is_some() {
                self.assignment()?
            } else if key.kind == NodeKind::Identifier {
                // shorthand `{a}`: key and value are the same identifier
                key.clone()
            } else {
                return Err(self.error("expected `:`"));
            };
            let span = key.span.merge(value.span);
            properties.push(SyntaxNode::new(NodeKind::Property, span).with_children(vec![key, value]));
            if self.eat(",").is_none() {
                break;
            }
        }
        let close = self.expect("}")?;
        Ok(SyntaxNode::new(NodeKind::ObjectExpression, open.span.merge(close.span))
            .with_children(properties))
    }
}
