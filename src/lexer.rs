//! Lexer for FALL source text.
//!
//! Produces a lazy, finite token sequence; restartable only by constructing a
//! new lexer over the same source. An unrecognized character sequence fails
//! the whole tokenization with a positioned lexical error.

use crate::error::{FallError, FallResult};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Define,
    Rule,
    Axiom,
    Where,
    Proposition,
    As,
    Is,
    Can,
    Be,
    Assert,
    Begin,
    Proof,
    Given,
    Prove,
    Using,
    Step,
    Infer,
    From,
    Via,
    End,
    Query,
    Symbolize,
    Bridge,
    Nlp,
    On,
    Off,
    // Connectives
    And,
    Or,
    Not,
    Implies,
    Iff,
    Xor,
    Nand,
    Nor,
    // Literals
    True,
    False,
    Ident,
    Str,
    Number,
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Pipe,
    /// Statement terminator: `//` or end of line.
    Terminator,
    Eof,
}

impl TokenKind {
    /// Case-sensitive reserved-word lookup.
    fn keyword(text: &str) -> Option<TokenKind> {
        Some(match text {
            "DEFINE" => Self::Define,
            "RULE" => Self::Rule,
            "AXIOM" => Self::Axiom,
            "WHERE" => Self::Where,
            "PROPOSITION" => Self::Proposition,
            "AS" => Self::As,
            "IS" => Self::Is,
            "CAN" => Self::Can,
            "BE" => Self::Be,
            "ASSERT" => Self::Assert,
            "BEGIN" => Self::Begin,
            "PROOF" => Self::Proof,
            "GIVEN" => Self::Given,
            "PROVE" => Self::Prove,
            "USING" => Self::Using,
            "STEP" => Self::Step,
            "INFER" => Self::Infer,
            "FROM" => Self::From,
            "VIA" => Self::Via,
            "END" => Self::End,
            "QUERY" => Self::Query,
            "SYMBOLIZE" => Self::Symbolize,
            "BRIDGE" => Self::Bridge,
            "NLP" => Self::Nlp,
            "ON" => Self::On,
            "OFF" => Self::Off,
            "AND" => Self::And,
            "OR" => Self::Or,
            "NOT" => Self::Not,
            "IMPLIES" => Self::Implies,
            "IFF" => Self::Iff,
            "XOR" => Self::Xor,
            "NAND" => Self::Nand,
            "NOR" => Self::Nor,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            _ => return None,
        })
    }
}

/// One lexed token with its source position (1-based line and column).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text for identifiers and numbers; unquoted content for strings.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

/// Streaming lexer over FALL source.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn token(&self, kind: TokenKind, lexeme: String, line: usize, column: usize) -> Token {
        Token { kind, lexeme, line, column }
    }

    fn error(&self, line: usize, column: usize, message: String) -> FallError {
        FallError::Lexical { line, column, message }
    }

    fn scan_token(&mut self) -> FallResult<Option<Token>> {
        let (line, column) = (self.line, self.column);
        let c = self.advance();
        let tok = match c {
            ' ' | '\t' | '\r' => return Ok(None),
            '\n' => self.token(TokenKind::Terminator, "\n".to_string(), line, column),
            '(' => self.token(TokenKind::LParen, c.to_string(), line, column),
            ')' => self.token(TokenKind::RParen, c.to_string(), line, column),
            '[' => self.token(TokenKind::LBracket, c.to_string(), line, column),
            ']' => self.token(TokenKind::RBracket, c.to_string(), line, column),
            ',' => self.token(TokenKind::Comma, c.to_string(), line, column),
            ':' => self.token(TokenKind::Colon, c.to_string(), line, column),
            '|' => self.token(TokenKind::Pipe, c.to_string(), line, column),
            '∧' => self.token(TokenKind::And, c.to_string(), line, column),
            '∨' => self.token(TokenKind::Or, c.to_string(), line, column),
            '¬' => self.token(TokenKind::Not, c.to_string(), line, column),
            '→' => self.token(TokenKind::Implies, c.to_string(), line, column),
            '↔' => self.token(TokenKind::Iff, c.to_string(), line, column),
            '⊕' => self.token(TokenKind::Xor, c.to_string(), line, column),
            '↑' => self.token(TokenKind::Nand, c.to_string(), line, column),
            '↓' => self.token(TokenKind::Nor, c.to_string(), line, column),
            '/' if self.peek() == Some('/') => {
                self.advance();
                self.token(TokenKind::Terminator, "//".to_string(), line, column)
            }
            '!' if self.peek() == Some('-') => {
                // Line comment: discard to end of line.
                while let Some(next) = self.peek() {
                    if next == '\n' {
                        break;
                    }
                    self.advance();
                }
                return Ok(None);
            }
            '-' if self.peek() == Some('>') => {
                self.advance();
                self.token(TokenKind::Implies, "->".to_string(), line, column)
            }
            '<' if self.peek() == Some('-') && self.peek_next() == Some('>') => {
                self.advance();
                self.advance();
                self.token(TokenKind::Iff, "<->".to_string(), line, column)
            }
            '"' => {
                let mut value = String::new();
                loop {
                    match self.peek() {
                        None => {
                            return Err(self.error(line, column, "unterminated string".to_string()))
                        }
                        Some('"') => {
                            self.advance();
                            break;
                        }
                        Some(_) => value.push(self.advance()),
                    }
                }
                self.token(TokenKind::Str, value, line, column)
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut text = String::from(c);
                while let Some(next) = self.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        text.push(self.advance());
                    } else {
                        break;
                    }
                }
                let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Ident);
                self.token(kind, text, line, column)
            }
            c if c.is_ascii_digit() => {
                let mut text = String::from(c);
                while let Some(next) = self.peek() {
                    if next.is_ascii_digit() {
                        text.push(self.advance());
                    } else {
                        break;
                    }
                }
                if self.peek() == Some('.')
                    && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false)
                {
                    text.push(self.advance());
                    while let Some(next) = self.peek() {
                        if next.is_ascii_digit() {
                            text.push(self.advance());
                        } else {
                            break;
                        }
                    }
                }
                self.token(TokenKind::Number, text, line, column)
            }
            other => {
                return Err(self.error(
                    line,
                    column,
                    format!("unexpected character: '{}'", other),
                ))
            }
        };
        Ok(Some(tok))
    }
}

impl Iterator for Lexer {
    type Item = FallResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        while !self.at_end() {
            match self.scan_token() {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        self.finished = true;
        Some(Ok(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            line: self.line,
            column: self.column,
        }))
    }
}

/// Tokenize a whole source text. Lexing does not attempt recovery: the first
/// unrecognized sequence fails the entire tokenization.
pub fn tokenize(source: &str) -> FallResult<Vec<Token>> {
    Lexer::new(source).collect()
}
