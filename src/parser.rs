//! Parser for script source code
//!
//! Recursive descent for statements, precedence climbing for binary
//! expressions. While parsing a function body the parser also collects the
//! names the evaluator hoists (`var` names and function declarations), so
//! entering a function never has to rescan its tree.

use std::rc::Rc;

use crate::ast::*;
use crate::error::JsError;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::string_dict::StringDict;
use crate::value::{PropertyKey, number_to_string};

/// Deepest statement and expression nesting a program may use
pub const MAX_NESTING_DEPTH: u32 = 1024;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Per-function parse state: hoisted names and the jump targets in scope.
#[derive(Default)]
struct FunctionContext {
    declarations: Declarations,
    labels: Vec<PropertyKey>,
    breakable_depth: u32,
    loop_depth: u32,
    in_function: bool,
}

/// Parser for script source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// Set while parsing the head of a `for` statement, where `in` ends
    /// the initializer instead of being a relational operator.
    no_in: bool,
    functions: Vec<FunctionContext>,
    depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Lexer::new(source, string_dict);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::eof(0, 1, 1),
            no_in: false,
            functions: vec![FunctionContext::default()],
            depth: 0,
        }
    }

    /// Helper to intern a string in the dictionary
    #[inline]
    fn intern(&mut self, s: &str) -> PropertyKey {
        self.lexer.string_dict().get_or_insert(s)
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, JsError> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        let context = self.functions.pop().unwrap_or_default();
        Ok(Program {
            body: body.into(),
            declarations: context.declarations,
        })
    }

    /// Descend one level, refusing programs nested deeper than
    /// `MAX_NESTING_DEPTH`.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || f(self));
        self.depth -= 1;
        result
    }

    fn context(&mut self) -> Result<&mut FunctionContext, JsError> {
        self.functions
            .last_mut()
            .ok_or_else(|| JsError::internal("parser lost its function context"))
    }

    // ============ STATEMENTS ============

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, JsError> {
        // Labeled statement: identifier followed by colon
        if self.check_identifier() && self.peek_is(&TokenKind::Colon) {
            return self.parse_labeled_statement();
        }

        match &self.current.kind {
            TokenKind::Var => {
                let decl = self.parse_variable_declaration()?;
                self.expect_semicolon()?;
                Ok(Statement::VariableDeclaration(decl))
            }
            TokenKind::Function => self.parse_function_declaration(),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.advance();
                Ok(Statement::Empty(span))
            }
            _ => {
                let start = self.current.span;
                let expression = self.parse_expression()?;
                self.expect_semicolon()?;
                let span = self.span_from(start);
                Ok(Statement::Expression(ExpressionStatement { expression, span }))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Var)?;

        let mut declarations = vec![self.parse_variable_declarator()?];
        while self.match_token(&TokenKind::Comma) {
            declarations.push(self.parse_variable_declarator()?);
        }

        let span = self.span_from(start);
        Ok(VariableDeclaration { declarations, span })
    }

    fn parse_variable_declarator(&mut self) -> Result<VariableDeclarator, JsError> {
        let start = self.current.span;
        let name = self.parse_identifier()?;
        self.context()?.declarations.declare_var(&name);

        let init = if self.match_token(&TokenKind::Eq) {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(VariableDeclarator { name, init, span })
    }

    fn parse_function_declaration(&mut self) -> Result<Statement, JsError> {
        let code = self.parse_function(true)?;
        self.context()?
            .declarations
            .functions
            .push(Rc::clone(&code));
        Ok(Statement::FunctionDeclaration(code))
    }

    /// Parse `function name? (params) { body }` into shared function code.
    fn parse_function(&mut self, name_required: bool) -> Result<Rc<FunctionCode>, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;

        let name = if name_required || self.check_identifier() {
            Some(self.parse_identifier()?)
        } else {
            None
        };

        self.require_token(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_identifier()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        let saved_no_in = std::mem::replace(&mut self.no_in, false);
        self.functions.push(FunctionContext {
            in_function: true,
            ..FunctionContext::default()
        });

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        self.require_token(&TokenKind::RBrace)?;

        let context = self
            .functions
            .pop()
            .ok_or_else(|| JsError::internal("parser lost its function context"))?;
        self.no_in = saved_no_in;

        let span = self.span_from(start);
        Ok(Rc::new(FunctionCode {
            name,
            params,
            body,
            declarations: context.declarations,
            span,
        }))
    }

    fn parse_block_statement(&mut self) -> Result<BlockStatement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        self.require_token(&TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(BlockStatement { body, span })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    /// Parse a loop body with `break` and `continue` enabled.
    fn parse_loop_body(&mut self) -> Result<Box<Statement>, JsError> {
        {
            let context = self.context()?;
            context.loop_depth += 1;
            context.breakable_depth += 1;
        }
        let body = self.parse_statement();
        {
            let context = self.context()?;
            context.loop_depth -= 1;
            context.breakable_depth -= 1;
        }
        Ok(Box::new(body?))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::For)?;
        self.require_token(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if self.check(&TokenKind::Var) {
            self.no_in = true;
            let decl = self.parse_variable_declaration();
            self.no_in = false;
            let decl = decl?;

            if self.match_token(&TokenKind::In) {
                if decl.declarations.len() != 1 {
                    return Err(self.error("Invalid left-hand side in for-in loop"));
                }
                let declarator = decl
                    .declarations
                    .into_iter()
                    .next()
                    .ok_or_else(|| self.error("Invalid left-hand side in for-in loop"))?;
                return self.parse_for_in_rest(start, ForInLeft::Variable(declarator));
            }
            Some(ForInit::Variable(decl))
        } else {
            self.no_in = true;
            let expr = self.parse_expression();
            self.no_in = false;
            let expr = expr?;

            if self.match_token(&TokenKind::In) {
                return self.parse_for_in_rest(start, ForInLeft::Target(expr));
            }
            Some(ForInit::Expression(expr))
        };

        self.require_token(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::RParen)?;

        let body = self.parse_loop_body()?;
        let span = self.span_from(start);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span,
        }))
    }

    fn parse_for_in_rest(&mut self, start: Span, left: ForInLeft) -> Result<Statement, JsError> {
        let right = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        let span = self.span_from(start);
        Ok(Statement::ForIn(ForInStatement {
            left,
            right,
            body,
            span,
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        let span = self.span_from(start);
        Ok(Statement::While(WhileStatement { test, body, span }))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Do)?;
        let body = self.parse_loop_body()?;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        // A semicolon after do-while is always optional
        self.match_token(&TokenKind::Semicolon);
        let span = self.span_from(start);
        Ok(Statement::DoWhile(DoWhileStatement { body, test, span }))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Switch)?;
        self.require_token(&TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        self.context()?.breakable_depth += 1;
        let cases = self.parse_switch_cases();
        self.context()?.breakable_depth -= 1;
        let cases = cases?;

        self.require_token(&TokenKind::RBrace)?;
        let span = self.span_from(start);
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span,
        }))
    }

    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>, JsError> {
        let mut cases = Vec::new();
        let mut seen_default = false;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case) {
                Some(self.parse_expression()?)
            } else if self.match_token(&TokenKind::Default) {
                if seen_default {
                    return Err(self.error("More than one default clause in switch statement"));
                }
                seen_default = true;
                None
            } else {
                return Err(self.unexpected_token("case or default"));
            };
            self.require_token(&TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                consequent.push(self.parse_statement()?);
            }

            let span = self.span_from(case_start);
            cases.push(SwitchCase {
                test,
                consequent,
                span,
            });
        }

        Ok(cases)
    }

    fn parse_with_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::With)?;
        self.require_token(&TokenKind::LParen)?;
        let object = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::With(WithStatement { object, body, span }))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Try)?;
        let block = self.parse_block_statement()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span;
            self.advance();
            self.require_token(&TokenKind::LParen)?;
            let param = self.parse_identifier()?;
            self.require_token(&TokenKind::RParen)?;
            let body = self.parse_block_statement()?;
            let span = self.span_from(catch_start);
            Some(CatchClause { param, body, span })
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try"));
        }

        let span = self.span_from(start);
        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if !self.context()?.in_function {
            return Err(self.error("Illegal return statement"));
        }
        self.require_token(&TokenKind::Return)?;

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.lexer.had_newline_before()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Statement::Return(ReturnStatement { argument, span }))
    }

    /// Optional label after `break`/`continue`, on the same line.
    fn parse_jump_label(&mut self) -> Result<Option<PropertyKey>, JsError> {
        if self.check_identifier() && !self.lexer.had_newline_before() {
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_break_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Break)?;
        let label = self.parse_jump_label()?;

        let context = self.context()?;
        let legal = match &label {
            Some(name) => context.labels.contains(name),
            None => context.breakable_depth > 0,
        };
        if !legal {
            return Err(match label {
                Some(name) => JsError::syntax_error(
                    format!("Undefined label '{}'", name),
                    start.line,
                    start.column,
                ),
                None => JsError::syntax_error("Illegal break statement", start.line, start.column),
            });
        }

        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Statement::Break(BreakStatement { label, span }))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Continue)?;
        let label = self.parse_jump_label()?;

        let context = self.context()?;
        let legal = context.loop_depth > 0
            && label
                .as_ref()
                .is_none_or(|name| context.labels.contains(name));
        if !legal {
            return Err(JsError::syntax_error(
                "Illegal continue statement",
                start.line,
                start.column,
            ));
        }

        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Statement::Continue(ContinueStatement { label, span }))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Throw)?;
        if self.lexer.had_newline_before() {
            return Err(self.error("Illegal newline after throw"));
        }
        let argument = self.parse_expression()?;
        self.expect_semicolon()?;
        let span = self.span_from(start);
        Ok(Statement::Throw(ThrowStatement { argument, span }))
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        let label = self.parse_identifier()?;
        self.require_token(&TokenKind::Colon)?;

        if self.context()?.labels.contains(&label) {
            return Err(JsError::syntax_error(
                format!("Label '{}' has already been declared", label),
                start.line,
                start.column,
            ));
        }

        self.context()?.labels.push(label.clone());
        let body = self.parse_statement();
        self.context()?.labels.pop();

        let span = self.span_from(start);
        Ok(Statement::Labeled(LabeledStatement {
            label,
            body: Box::new(body?),
            span,
        }))
    }

    // ============ EXPRESSIONS ============

    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        self.parse_sequence_expression()
    }

    fn parse_sequence_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = self.parse_assignment_expression()?;

        if self.check(&TokenKind::Comma) {
            let mut expressions = vec![expr];
            while self.match_token(&TokenKind::Comma) {
                expressions.push(self.parse_assignment_expression()?);
            }
            let span = self.span_from(start);
            expr = Expression::Sequence(SequenceExpression { expressions, span });
        }

        Ok(expr)
    }

    /// Parse with `in` accepted as an operator again (inside brackets,
    /// parentheses and literals nested in a `for` head).
    fn with_in_allowed<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, JsError>,
    ) -> Result<T, JsError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_conditional_expression()?;

        if let Some(op) = self.current_assignment_op() {
            self.advance();
            let value = Box::new(self.parse_assignment_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Assignment(AssignmentExpression {
                operator: op,
                target: Box::new(expr),
                value,
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let test = self.parse_binary_expression(0)?;

        if self.match_token(&TokenKind::Question) {
            let consequent = Box::new(self.with_in_allowed(Self::parse_assignment_expression)?);
            self.require_token(&TokenKind::Colon)?;
            let alternate = Box::new(self.parse_assignment_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Conditional(ConditionalExpression {
                test: Box::new(test),
                consequent,
                alternate,
                span,
            }));
        }

        Ok(test)
    }

    /// Precedence climbing for binary and logical operators
    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        while let Some((op, prec)) = self.current_binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();

            // All binary operators are left-associative
            let right = Box::new(self.parse_binary_expression(prec + 1)?);
            let span = self.span_from(start);
            left = match op {
                Operator::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right,
                    span,
                }),
                Operator::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right,
                    span,
                }),
            };
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        self.nested(Self::parse_unary_inner)
    }

    fn parse_unary_inner(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        if let Some(op) = self.current_unary_op() {
            self.advance();
            let argument = Box::new(self.parse_unary_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Unary(UnaryExpression {
                operator: op,
                argument,
                span,
            }));
        }

        // Update expressions (prefix)
        if let Some(op) = self.current_update_op() {
            self.advance();
            let argument = Box::new(self.parse_unary_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Update(UpdateExpression {
                operator: op,
                prefix: true,
                argument,
                span,
            }));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = self.parse_left_hand_side_expression()?;

        // Postfix update, not across a line break
        if !self.lexer.had_newline_before() {
            if let Some(op) = self.current_update_op() {
                self.advance();
                let span = self.span_from(start);
                expr = Expression::Update(UpdateExpression {
                    operator: op,
                    prefix: false,
                    argument: Box::new(expr),
                    span,
                });
            }
        }

        Ok(expr)
    }

    /// Member accesses and calls, left to right
    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = self.parse_member_expression()?;

        loop {
            if self.check(&TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                let span = self.span_from(start);
                expr = Expression::Call(CallExpression {
                    callee: Box::new(expr),
                    arguments,
                    span,
                });
            } else if let Some(property) = self.parse_member_property()? {
                let span = self.span_from(start);
                expr = Expression::Member(MemberExpression {
                    object: Box::new(expr),
                    property,
                    span,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Member expression without calls; `new` binds its argument list here.
    fn parse_member_expression(&mut self) -> Result<Expression, JsError> {
        self.nested(Self::parse_member_inner)
    }

    fn parse_member_inner(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        let mut expr = if self.match_token(&TokenKind::New) {
            let callee = Box::new(self.parse_member_expression()?);
            let arguments = if self.check(&TokenKind::LParen) {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            let span = self.span_from(start);
            Expression::New(NewExpression {
                callee,
                arguments,
                span,
            })
        } else {
            self.parse_primary_expression()?
        };

        while let Some(property) = self.parse_member_property()? {
            let span = self.span_from(start);
            expr = Expression::Member(MemberExpression {
                object: Box::new(expr),
                property,
                span,
            });
        }

        Ok(expr)
    }

    /// `.name` or `[expr]`, if one follows
    fn parse_member_property(&mut self) -> Result<Option<MemberProperty>, JsError> {
        if self.match_token(&TokenKind::Dot) {
            let name = self.parse_identifier_name()?;
            Ok(Some(MemberProperty::Identifier(name)))
        } else if self.match_token(&TokenKind::LBracket) {
            let property = self.with_in_allowed(Self::parse_expression)?;
            self.require_token(&TokenKind::RBracket)?;
            Ok(Some(MemberProperty::Expression(Box::new(property))))
        } else {
            Ok(None)
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, JsError> {
        self.require_token(&TokenKind::LParen)?;
        let arguments = self.with_in_allowed(|p| {
            let mut arguments = Vec::new();
            if !p.check(&TokenKind::RParen) {
                loop {
                    arguments.push(p.parse_assignment_expression()?);
                    if !p.match_token(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            Ok(arguments)
        })?;
        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let span = self.current.span;

        let literal = |value| -> Result<Expression, JsError> {
            Ok(Expression::Literal(Literal { value, span }))
        };

        match self.current.kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                literal(LiteralValue::Number(n))
            }
            TokenKind::String(s) => {
                self.advance();
                literal(LiteralValue::String(s))
            }
            TokenKind::True => {
                self.advance();
                literal(LiteralValue::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                literal(LiteralValue::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                literal(LiteralValue::Null)
            }
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(span))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier(Identifier { name, span }))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.with_in_allowed(Self::parse_expression)?;
                self.require_token(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.with_in_allowed(Self::parse_array_literal),
            TokenKind::LBrace => self.with_in_allowed(Self::parse_object_literal),
            TokenKind::Function => {
                let code = self.parse_function(false)?;
                let span = self.span_from(span);
                Ok(Expression::Function(FunctionExpression { code, span }))
            }
            TokenKind::Invalid(c) => Err(self.error(&format!("Invalid or unexpected token '{}'", c))),
            _ => Err(self.unexpected_token("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        loop {
            if self.match_token(&TokenKind::RBracket) {
                break;
            }
            if self.match_token(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment_expression()?));
            if !self.match_token(&TokenKind::Comma) {
                self.require_token(&TokenKind::RBracket)?;
                break;
            }
        }

        let span = self.span_from(start);
        Ok(Expression::Array(ArrayExpression { elements, span }))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let prop_start = self.current.span;
            let key = self.parse_property_name()?;
            self.require_token(&TokenKind::Colon)?;
            let value = self.parse_assignment_expression()?;
            let span = self.span_from(prop_start);
            properties.push(Property { key, value, span });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Expression::Object(ObjectExpression { properties, span }))
    }

    /// Object literal key: identifier, keyword, string or number
    fn parse_property_name(&mut self) -> Result<PropertyKey, JsError> {
        match self.current.kind.clone() {
            TokenKind::String(s) => {
                self.advance();
                Ok(self.intern(s.as_str()))
            }
            TokenKind::Number(n) => {
                self.advance();
                Ok(self.intern(&number_to_string(n)))
            }
            _ => self.parse_identifier_name(),
        }
    }

    fn parse_identifier(&mut self) -> Result<PropertyKey, JsError> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected_token("identifier"))
        }
    }

    /// Identifier or reserved word, as accepted after `.` and as a literal key
    fn parse_identifier_name(&mut self) -> Result<PropertyKey, JsError> {
        if let Some(text) = self.current.kind.keyword_text() {
            self.advance();
            return Ok(self.intern(text));
        }
        self.parse_identifier()
    }

    // ============ HELPERS ============

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), JsError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token(&format!("{:?}", kind)))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), JsError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.lexer.had_newline_before() {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Check if the next token (after current) is of the given kind
    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        std::mem::discriminant(&next.kind) == std::mem::discriminant(kind)
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier(_))
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end,
            start.line,
            start.column,
        )
    }

    fn error(&self, message: &str) -> JsError {
        JsError::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self, expected: &str) -> JsError {
        let found = match &self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Invalid(c) => format!("character '{}'", c),
            other => format!("{:?}", other),
        };
        JsError::syntax_error(
            format!("Unexpected {}, expected {}", found, expected),
            self.current.span.line,
            self.current.span.column,
        )
    }

    /// Returns (operator, precedence)
    fn current_binary_op(&self) -> Option<(Operator, u8)> {
        use Operator::{Binary, Logical};
        match &self.current.kind {
            TokenKind::PipePipe => Some((Logical(LogicalOp::Or), 1)),
            TokenKind::AmpAmp => Some((Logical(LogicalOp::And), 2)),
            TokenKind::Pipe => Some((Binary(BinaryOp::BitOr), 3)),
            TokenKind::Caret => Some((Binary(BinaryOp::BitXor), 4)),
            TokenKind::Amp => Some((Binary(BinaryOp::BitAnd), 5)),
            TokenKind::EqEq => Some((Binary(BinaryOp::Eq), 6)),
            TokenKind::BangEq => Some((Binary(BinaryOp::NotEq), 6)),
            TokenKind::EqEqEq => Some((Binary(BinaryOp::StrictEq), 6)),
            TokenKind::BangEqEq => Some((Binary(BinaryOp::StrictNotEq), 6)),
            TokenKind::Lt => Some((Binary(BinaryOp::Lt), 7)),
            TokenKind::LtEq => Some((Binary(BinaryOp::LtEq), 7)),
            TokenKind::Gt => Some((Binary(BinaryOp::Gt), 7)),
            TokenKind::GtEq => Some((Binary(BinaryOp::GtEq), 7)),
            TokenKind::Instanceof => Some((Binary(BinaryOp::Instanceof), 7)),
            TokenKind::In if !self.no_in => Some((Binary(BinaryOp::In), 7)),
            TokenKind::LtLt => Some((Binary(BinaryOp::LShift), 8)),
            TokenKind::GtGt => Some((Binary(BinaryOp::RShift), 8)),
            TokenKind::GtGtGt => Some((Binary(BinaryOp::URShift), 8)),
            TokenKind::Plus => Some((Binary(BinaryOp::Add), 9)),
            TokenKind::Minus => Some((Binary(BinaryOp::Sub), 9)),
            TokenKind::Star => Some((Binary(BinaryOp::Mul), 10)),
            TokenKind::Slash => Some((Binary(BinaryOp::Div), 10)),
            TokenKind::Percent => Some((Binary(BinaryOp::Mod), 10)),
            _ => None,
        }
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        }
    }

    fn current_update_op(&self) -> Option<UpdateOp> {
        match &self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        }
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        match &self.current.kind {
            TokenKind::Eq => Some(AssignmentOp::Assign),
            TokenKind::PlusEq => Some(AssignmentOp::AddAssign),
            TokenKind::MinusEq => Some(AssignmentOp::SubAssign),
            TokenKind::StarEq => Some(AssignmentOp::MulAssign),
            TokenKind::SlashEq => Some(AssignmentOp::DivAssign),
            TokenKind::PercentEq => Some(AssignmentOp::ModAssign),
            TokenKind::AmpEq => Some(AssignmentOp::BitAndAssign),
            TokenKind::PipeEq => Some(AssignmentOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignmentOp::BitXorAssign),
            TokenKind::LtLtEq => Some(AssignmentOp::LShiftAssign),
            TokenKind::GtGtEq => Some(AssignmentOp::RShiftAssign),
            TokenKind::GtGtGtEq => Some(AssignmentOp::URShiftAssign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}
