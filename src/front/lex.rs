//! The lexer. Not part of the code-generation core — the scanner is an
//! external collaborator the parser drives token-by-token; this is a
//! minimal DFA-ish, regex-backed tokenizer just complete enough to drive
//! the parser end to end, covering this language's keyword/symbol set (see
//! `examples/original_source/language.py` for the DFA this one stands in
//! for).

use derive_more::Display;
use regex::Regex;

/// Keywords recognized by the language.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("if", TokenKind::KwIf),
    ("else", TokenKind::KwElse),
    ("void", TokenKind::KwVoid),
    ("int", TokenKind::KwInt),
    ("for", TokenKind::KwFor),
    ("break", TokenKind::KwBreak),
    ("return", TokenKind::KwReturn),
];

/// Token classes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Display, Debug)]
pub enum TokenKind {
    #[display("id")]
    Id,
    #[display("num")]
    Num,
    #[display("if")]
    KwIf,
    #[display("else")]
    KwElse,
    #[display("void")]
    KwVoid,
    #[display("int")]
    KwInt,
    #[display("for")]
    KwFor,
    #[display("break")]
    KwBreak,
    #[display("return")]
    KwReturn,
    #[display(";")]
    Semicolon,
    #[display(",")]
    Comma,
    #[display("[")]
    LBracket,
    #[display("]")]
    RBracket,
    #[display("(")]
    LParen,
    #[display(")")]
    RParen,
    #[display("{{")]
    LBrace,
    #[display("}}")]
    RBrace,
    #[display("+")]
    Plus,
    #[display("-")]
    Minus,
    #[display("*")]
    Star,
    #[display("<")]
    Lt,
    #[display("=")]
    Assign,
    #[display("==")]
    EqEq,
    #[display("$")]
    Eof,
}

/// A lexed token. Only `text` matters to the code generator; `kind` is used
/// by the parser to make syntax decisions. `line` is the source line the
/// token started on, used by the code generator for error attribution; a
/// blank token carries `line: 0`, meaning "don't update the current line".
#[derive(Clone, PartialEq, Eq, Hash, Display, Debug)]
#[display("kind: '{kind}', part of input: '{text}'")]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
        }
    }

    /// A blank token for actions that don't read theirs (e.g. `end_scope`).
    pub fn blank() -> Self {
        Token::new(TokenKind::Eof, "", 0)
    }
}

pub struct LexError {
    pub line: u32,
    pub ch: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lexer error: unexpected input {:?} at line {}", self.ch, self.line)
    }
}

pub struct Lexer<'input> {
    input: &'input str,
    pos: usize,
    line: u32,
    whitespace: Regex,
    id_re: Regex,
    num_re: Regex,
    errors: Vec<LexError>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            whitespace: Regex::new(r"\A[ \t\r\n\x0b\x0c]+").unwrap(),
            id_re: Regex::new(r"\A[A-Za-z][A-Za-z0-9]*").unwrap(),
            num_re: Regex::new(r"\A[0-9]+").unwrap(),
            errors: Vec::new(),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn rest(&self) -> &'input str {
        &self.input[self.pos..]
    }

    fn advance_by(&mut self, n: usize) {
        self.line += self.input[self.pos..self.pos + n].matches('\n').count() as u32;
        self.pos += n;
    }

    fn skip_trivia(&mut self) {
        loop {
            if let Some(m) = self.whitespace.find(self.rest()) {
                self.advance_by(m.end());
                continue;
            }
            if self.rest().starts_with("/*") {
                let close = self.rest()[2..].find("*/");
                match close {
                    Some(offset) => self.advance_by(2 + offset + 2),
                    None => {
                        self.errors.push(LexError {
                            line: self.line,
                            ch: "/*".to_string(),
                        });
                        self.advance_by(self.rest().len());
                    }
                }
                continue;
            }
            if self.rest().starts_with("*/") {
                self.errors.push(LexError {
                    line: self.line,
                    ch: "*/".to_string(),
                });
                self.advance_by(2);
                continue;
            }
            break;
        }
    }

    /// Get the next token, or `None` at end of input.
    pub fn next(&mut self) -> Option<Token> {
        self.skip_trivia();
        if self.pos >= self.input.len() {
            return None;
        }
        let start_line = self.line;
        let rest = self.rest();

        if let Some(m) = self.id_re.find(rest) {
            let text = m.as_str().to_string();
            self.advance_by(m.end());
            if let Some((_, kind)) = KEYWORDS.iter().find(|(kw, _)| *kw == text) {
                return Some(Token::new(*kind, text, start_line));
            }
            return Some(Token::new(TokenKind::Id, text, start_line));
        }
        if let Some(m) = self.num_re.find(rest) {
            let text = m.as_str().to_string();
            self.advance_by(m.end());
            return Some(Token::new(TokenKind::Num, text, start_line));
        }
        if rest.starts_with("==") {
            self.advance_by(2);
            return Some(Token::new(TokenKind::EqEq, "==", start_line));
        }
        let one_char = [
            (';', TokenKind::Semicolon),
            (',', TokenKind::Comma),
            ('[', TokenKind::LBracket),
            (']', TokenKind::RBracket),
            ('(', TokenKind::LParen),
            (')', TokenKind::RParen),
            ('{', TokenKind::LBrace),
            ('}', TokenKind::RBrace),
            ('+', TokenKind::Plus),
            ('-', TokenKind::Minus),
            ('*', TokenKind::Star),
            ('<', TokenKind::Lt),
            ('=', TokenKind::Assign),
        ];
        let ch = rest.chars().next().unwrap();
        if let Some((_, kind)) = one_char.iter().find(|(c, _)| *c == ch) {
            self.advance_by(ch.len_utf8());
            return Some(Token::new(*kind, ch.to_string(), start_line));
        }
        self.errors.push(LexError {
            line: self.line,
            ch: ch.to_string(),
        });
        self.advance_by(ch.len_utf8());
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_identifiers() {
        let mut lexer = Lexer::new("int x void");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::KwInt);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Id);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::KwVoid);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn distinguishes_assign_from_eqeq() {
        let mut lexer = Lexer::new("a = b == c");
        lexer.next();
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Assign);
        lexer.next();
        assert_eq!(lexer.next().unwrap().kind, TokenKind::EqEq);
    }

    #[test]
    fn tracks_line_numbers_across_newlines() {
        let mut lexer = Lexer::new("int a;\nint b;\n");
        for _ in 0..4 {
            lexer.next();
        }
        assert_eq!(lexer.line(), 1);
        lexer.next();
        assert_eq!(lexer.line(), 2);
    }

    #[test]
    fn skips_block_comments() {
        let mut lexer = Lexer::new("int /* comment \n spanning lines */ x;");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::KwInt);
        let id = lexer.next().unwrap();
        assert_eq!(id.kind, TokenKind::Id);
        assert_eq!(lexer.line(), 2);
    }

    #[test]
    fn records_unmatched_comment_close() {
        let mut lexer = Lexer::new("a */ b");
        lexer.next();
        lexer.next();
        assert_eq!(lexer.errors().len(), 1);
    }
}
