use std::rc::Rc;

use crate::error::{Error, Result};
use crate::location::Location;
use crate::token::{Keyword, Token, TokenKind};

/// Hand-rolled rather than generated: the token alphabet (§6.2) is small
/// and fixed, so a `logos`-style derive buys little over a direct
/// character-at-a-time scan.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    file: Rc<str>,
}

impl Lexer {
    pub fn new(source: &str, file: impl Into<Rc<str>>) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            file: file.into(),
        }
    }

    fn loc(&self) -> Location {
        Location::new(self.file.clone(), self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('#') => self.skip_line_comment(),
                _ => break,
            }
        }

        let loc = self.loc();
        let c = match self.peek() {
            None => return Ok(Token::new(TokenKind::Eof, loc)),
            Some(c) => c,
        };

        if c == '\n' {
            self.advance();
            return Ok(Token::new(TokenKind::Newline, loc));
        }

        if c.is_ascii_digit() {
            return self.lex_number(loc);
        }

        if c == '"' {
            return self.lex_string(loc);
        }

        if c == '\'' {
            return self.lex_char(loc);
        }

        if c == ':' {
            if matches!(self.peek_at(1), Some(ch) if ch.is_alphabetic() || ch == '_') {
                self.advance();
                let name = self.lex_ident_chars();
                return Ok(Token::new(TokenKind::Sym(name), loc));
            }
            self.advance();
            return Ok(Token::new(TokenKind::Colon, loc));
        }

        if c.is_alphabetic() || c == '_' {
            let word = self.lex_ident_chars();
            if let Some(kw) = Keyword::lookup(&word) {
                return Ok(Token::new(TokenKind::Keyword(kw), loc));
            }
            let kind = if word.chars().next().unwrap().is_uppercase() {
                TokenKind::Const(word)
            } else {
                TokenKind::Ident(word)
            };
            return Ok(Token::new(kind, loc));
        }

        self.lex_operator(loc)
    }

    fn lex_ident_chars(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn lex_number(&mut self, loc: Location) -> Result<Token> {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            s.push(self.advance().unwrap());
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            s.push(self.advance().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                s.push(self.advance().unwrap());
            }
            let value: f64 = s
                .parse()
                .map_err(|_| Error::Lex(format!("invalid float literal '{}'", s)))?;
            return Ok(Token::new(TokenKind::Float(value), loc));
        }
        let value: i64 = s
            .parse()
            .map_err(|_| Error::Lex(format!("invalid int literal '{}'", s)))?;
        Ok(Token::new(TokenKind::Int(value), loc))
    }

    /// String literals may contain `<expr>` interpolation segments; the
    /// lexer only captures the raw text, leaving the splitting into
    /// literal/interpolation parts to the parser (`parser::parse_string`).
    fn lex_string(&mut self, loc: Location) -> Result<Token> {
        self.advance();
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(Error::Lex("unterminated string literal".to_string())),
                Some('"') => break,
                Some('\\') => match self.advance() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('"') => s.push('"'),
                    Some('\\') => s.push('\\'),
                    Some(other) => s.push(other),
                    None => return Err(Error::Lex("unterminated escape".to_string())),
                },
                Some(c) => s.push(c),
            }
        }
        Ok(Token::new(TokenKind::Str(s), loc))
    }

    fn lex_char(&mut self, loc: Location) -> Result<Token> {
        self.advance();
        let c = self
            .advance()
            .ok_or_else(|| Error::Lex("unterminated char literal".to_string()))?;
        match self.advance() {
            Some('\'') => Ok(Token::new(TokenKind::Char(c), loc)),
            _ => Err(Error::Lex("unterminated char literal".to_string())),
        }
    }

    fn lex_operator(&mut self, loc: Location) -> Result<Token> {
        macro_rules! two {
            ($second:expr, $two:expr, $one:expr) => {{
                self.advance();
                if self.peek() == Some($second) {
                    self.advance();
                    $two
                } else {
                    $one
                }
            }};
        }

        let c = self.advance().unwrap();
        let kind = match c {
            '+' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.peek() == Some(':') {
                    self.advance();
                    TokenKind::MatchAssign
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    return Ok(Token::new(
                        two!('=', TokenKind::AndAndEq, TokenKind::AndAnd),
                        loc,
                    ));
                }
                TokenKind::Amp
            }
            '|' => {
                if self.peek() == Some('|') {
                    return Ok(Token::new(
                        two!('=', TokenKind::OrOrEq, TokenKind::OrOr),
                        loc,
                    ));
                }
                TokenKind::Pipe
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            other => return Err(Error::Lex(format!("unexpected character '{}'", other))),
        };
        Ok(Token::new(kind, loc))
    }
}
