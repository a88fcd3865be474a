//! A recursive-descent parser for the small C-like source language. Not
//! part of the code-generation core proper (the grammar/table machinery is
//! an external collaborator), but something has to drive
//! [`crate::back::CodeGenerator::action`] in the right order, so this module
//! walks the grammar directly instead of through a generated LL(1) table.

use std::fmt::Debug;

use derive_more::derive::Display;

use crate::back::CodeGenerator;

use super::lex::{LexError, Lexer, Token, TokenKind};

#[derive(Display)]
#[display("Parse error: {}", self.0)]
pub struct ParseError(String);

impl Debug for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

impl ParseError {
    fn unexpected(found: &Token, wanted: &str) -> Self {
        ParseError(format!(
            "line {}: expected {wanted}, found {found}",
            found.line
        ))
    }

    fn lex(errors: &[LexError]) -> Self {
        let joined = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        ParseError(joined)
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parse `input` and run it through a fresh [`CodeGenerator`], returning the
/// generator afterward so the caller can render its program and error
/// streams.
pub fn parse(input: &str) -> PResult<CodeGenerator> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next() {
        tokens.push(tok);
    }
    if !lexer.errors().is_empty() {
        return Err(ParseError::lex(lexer.errors()));
    }
    let eof_line = tokens.last().map(|t| t.line).unwrap_or(1);
    tokens.push(Token::new(TokenKind::Eof, "$", eof_line));

    let mut parser = Parser {
        tokens,
        pos: 0,
        codegen: CodeGenerator::new(),
    };
    parser.program()?;
    Ok(parser.codegen)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    codegen: CodeGenerator,
}

impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        self.codegen.note_line(tok.line);
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(self.current(), &kind.to_string()))
        }
    }

    fn expect_id(&mut self) -> PResult<Token> {
        self.expect(TokenKind::Id)
    }

    fn expect_num(&mut self) -> PResult<Token> {
        self.expect(TokenKind::Num)
    }

    fn expect_type_specifier(&mut self) -> PResult<Token> {
        if self.check(TokenKind::KwInt) || self.check(TokenKind::KwVoid) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(self.current(), "'int' or 'void'"))
        }
    }

    fn act(&mut self, name: &str, token: &Token) {
        self.codegen.action(name, token);
    }

    fn act0(&mut self, name: &str) {
        let blank = Token::blank();
        self.codegen.action(name, &blank);
    }

    // declaration-list -> declaration declaration-list | epsilon
    fn program(&mut self) -> PResult<()> {
        self.act0("start_program");
        while !self.check(TokenKind::Eof) {
            self.declaration()?;
        }
        self.act0("end_program");
        Ok(())
    }

    // declaration -> type-specifier ID ( var-decl-rest | fun-decl-rest )
    fn declaration(&mut self) -> PResult<()> {
        self.act0("start_declaration");
        let type_tok = self.expect_type_specifier()?;
        self.act("declaration_type", &type_tok);
        let id_tok = self.expect_id()?;
        self.act("declaration_id", &id_tok);

        if self.check(TokenKind::LParen) {
            self.act0("declare_function");
            self.advance();
            self.act0("start_function_declaration");
            self.params()?;
            self.expect(TokenKind::RParen)?;
            self.compound_stmt()?;
            self.act0("end_function_declaration");
        } else {
            self.var_decl_rest()?;
        }
        Ok(())
    }

    // shared by top-level and local var declarations, after `declaration_id`
    // has already fired.
    fn var_decl_rest(&mut self) -> PResult<()> {
        self.act0("declare_var");
        if self.check(TokenKind::LBracket) {
            self.advance();
            self.act0("declare_array");
            let num_tok = self.expect_num()?;
            self.act("declare_array_length", &num_tok);
            self.expect(TokenKind::RBracket)?;
        }
        self.expect(TokenKind::Semicolon)?;
        self.act0("end_var_declaration");
        Ok(())
    }

    // params -> void | param-list
    fn params(&mut self) -> PResult<()> {
        if self.check(TokenKind::KwVoid) && self.peek_kind(1) == TokenKind::RParen {
            self.advance();
            return Ok(());
        }
        loop {
            self.expect_type_specifier()?;
            let id_tok = self.expect_id()?;
            self.act("param_id", &id_tok);
            if self.check(TokenKind::LBracket) {
                self.advance();
                self.expect(TokenKind::RBracket)?;
                self.act0("param_is_array");
            }
            self.act0("end_param");
            if self.check(TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(())
    }

    fn peek_kind(&self, ahead: usize) -> TokenKind {
        self.tokens
            .get(self.pos + ahead)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    // compound-stmt -> { local-declarations statement-list }
    fn compound_stmt(&mut self) -> PResult<()> {
        self.expect(TokenKind::LBrace)?;
        self.act0("start_scope");
        while self.check(TokenKind::KwInt) || self.check(TokenKind::KwVoid) {
            self.act0("start_declaration");
            let type_tok = self.expect_type_specifier()?;
            self.act("declaration_type", &type_tok);
            let id_tok = self.expect_id()?;
            self.act("declaration_id", &id_tok);
            self.var_decl_rest()?;
        }
        while !self.check(TokenKind::RBrace) {
            self.statement()?;
        }
        self.expect(TokenKind::RBrace)?;
        self.act0("end_scope");
        Ok(())
    }

    // statement -> expression-stmt | compound-stmt | selection-stmt
    //            | iteration-stmt | return-stmt | break-stmt
    fn statement(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::LBrace => self.compound_stmt(),
            TokenKind::KwIf => self.selection_stmt(),
            TokenKind::KwFor => self.iteration_stmt(),
            TokenKind::KwReturn => self.return_stmt(),
            TokenKind::KwBreak => self.break_stmt(),
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            _ => {
                self.expression()?;
                self.act0("pop_stack");
                self.expect(TokenKind::Semicolon)?;
                Ok(())
            }
        }
    }

    // selection-stmt -> if ( expression ) statement (else statement)?
    fn selection_stmt(&mut self) -> PResult<()> {
        self.expect(TokenKind::KwIf)?;
        self.expect(TokenKind::LParen)?;
        self.expression()?;
        self.expect(TokenKind::RParen)?;
        self.act0("save_if");
        self.statement()?;
        if self.check(TokenKind::KwElse) {
            self.act0("if_else_jpf");
            self.advance();
            self.statement()?;
            self.act0("else_jp");
        } else {
            self.act0("if_jpf");
        }
        self.act0("end_if");
        Ok(())
    }

    // iteration-stmt -> for ( expression-stmt expression ; expression ) statement
    //
    // `start_for` is fired right after the init clause's code is already
    // emitted, so the loop's back-edge target is the condition test, not the
    // init. The step clause is parsed here but its actions are captured
    // verbatim by the generator (iterator-expression mode) and replayed by
    // `end_for` after the body.
    fn iteration_stmt(&mut self) -> PResult<()> {
        self.expect(TokenKind::KwFor)?;
        self.expect(TokenKind::LParen)?;
        if self.check(TokenKind::Semicolon) {
            self.advance();
        } else {
            self.expression()?;
            self.act0("pop_stack");
            self.expect(TokenKind::Semicolon)?;
        }
        self.act0("start_for");
        self.expression()?;
        self.act0("save_for");
        self.expect(TokenKind::Semicolon)?;
        self.act0("start_iterator_expression_mode");
        self.expression()?;
        self.act0("pop_stack");
        self.act0("end_iterator_expression_mode");
        self.expect(TokenKind::RParen)?;
        self.statement()?;
        self.act0("end_for");
        Ok(())
    }

    // return-stmt -> return ; | return expression ;
    fn return_stmt(&mut self) -> PResult<()> {
        self.expect(TokenKind::KwReturn)?;
        if self.check(TokenKind::Semicolon) {
            self.advance();
        } else {
            self.expression()?;
            self.act0("set_return_value");
            self.expect(TokenKind::Semicolon)?;
        }
        self.act0("jp_ra");
        Ok(())
    }

    // break-stmt -> break ;
    fn break_stmt(&mut self) -> PResult<()> {
        self.expect(TokenKind::KwBreak)?;
        self.act0("break_loop");
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    // expression -> var = expression | simple-expression
    //
    // A leading ID is ambiguous between "var" (assignable) and the start of
    // a simple-expression built on top of a var, a call, or an array index.
    // `primary_var_or_call` consumes the ID and its trailer with a single
    // token of lookahead for `=`, which tells us which production applies.
    fn expression(&mut self) -> PResult<()> {
        if self.check(TokenKind::Id) {
            let assignable = self.primary_var_or_call()?;
            if assignable && self.check(TokenKind::Assign) {
                self.advance();
                self.expression()?;
                self.act0("assign");
                return Ok(());
            }
            self.term_tail()?;
            self.additive_tail()?;
            self.simple_tail()?;
            return Ok(());
        }
        self.simple_expression()
    }

    fn simple_expression(&mut self) -> PResult<()> {
        self.additive()?;
        self.simple_tail()
    }

    fn simple_tail(&mut self) -> PResult<()> {
        if self.check(TokenKind::Lt) || self.check(TokenKind::EqEq) {
            let op_tok = self.advance();
            self.act("comparison_op", &op_tok);
            self.additive()?;
            self.act0("comparison");
        }
        Ok(())
    }

    fn additive(&mut self) -> PResult<()> {
        self.term()?;
        self.additive_tail()
    }

    fn additive_tail(&mut self) -> PResult<()> {
        while self.check(TokenKind::Plus) || self.check(TokenKind::Minus) {
            let op_tok = self.advance();
            self.act("arith_op", &op_tok);
            self.term()?;
            self.act0("arith");
        }
        Ok(())
    }

    fn term(&mut self) -> PResult<()> {
        self.factor()?;
        self.term_tail()
    }

    fn term_tail(&mut self) -> PResult<()> {
        while self.check(TokenKind::Star) {
            self.advance();
            self.factor()?;
            self.act0("mult");
        }
        Ok(())
    }

    // factor -> ( expression ) | var | call | NUM | - factor
    fn factor(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::Num => {
                let tok = self.advance();
                self.act("push_const", &tok);
                Ok(())
            }
            TokenKind::LParen => {
                self.advance();
                self.expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(())
            }
            TokenKind::Minus => {
                self.advance();
                self.factor()?;
                self.act0("negate");
                Ok(())
            }
            TokenKind::Id => {
                self.primary_var_or_call()?;
                Ok(())
            }
            _ => Err(ParseError::unexpected(self.current(), "an expression")),
        }
    }

    /// Consume an ID and its optional `[expr]` or `(args)` trailer, leaving
    /// exactly one value pushed. Returns whether the result is assignable
    /// (a plain or array-indexed variable) as opposed to a call result.
    fn primary_var_or_call(&mut self) -> PResult<bool> {
        let id_tok = self.expect_id()?;
        self.act("push_address", &id_tok);
        if self.check(TokenKind::LParen) {
            self.advance();
            self.act0("start_function_call");
            self.call_args()?;
            self.expect(TokenKind::RParen)?;
            self.act0("end_function_call");
            Ok(false)
        } else if self.check(TokenKind::LBracket) {
            self.advance();
            self.expression()?;
            self.expect(TokenKind::RBracket)?;
            self.act0("array_index");
            Ok(true)
        } else {
            Ok(true)
        }
    }

    fn call_args(&mut self) -> PResult<()> {
        if self.check(TokenKind::RParen) {
            return Ok(());
        }
        self.expression()?;
        self.act0("add_arg");
        while self.check(TokenKind::Comma) {
            self.advance();
            self.expression()?;
            self.act0("add_arg");
        }
        Ok(())
    }
}
