//! Module `scanner` implements a one‑pass, streaming lexer for Rox source.
//!
//! It walks a `&str` byte by byte, skipping whitespace and `//` comments, and
//! yields `Result<Token, LoxError>` items ending with exactly one `EOF` token.
//! Errors never stop the scan: an unterminated string or an unexpected
//! character is yielded as an `Err` and lexing resumes right after it.
//!
//! # Token recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Longest‑match operators: `!=`, `==`, `<=`, `>=` before `!`, `=`, `<`, `>`.
//! - String literals: `"` … `"`, may span lines.
//! - Numbers: digits with an optional `.` followed by at least one digit.
//! - Identifiers/keywords: resolved through the perfect‑hash `KEYWORDS` map.
//!
//! Comment skipping uses `memchr` to jump to the next newline.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{info, trace};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// A single pass scanner that converts source text into [`Token`]s.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,               // byte index of the first byte of the current lexeme
    curr: usize,                // byte index one past the last byte examined
    line: usize,                // 1‑based, bumped on every '\n'
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    done: bool,                 // EOF already yielded
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            done: false,
        }
    }

    /// Drain the scanner, splitting tokens from errors. The token list always
    /// ends with `EOF`.
    pub fn scan_tokens(self) -> (Vec<Token>, Vec<LoxError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for item in self {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        info!(
            "Scanned {} token(s) with {} error(s)",
            tokens.len(),
            errors.len()
        );

        (tokens, errors)
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it. Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes().get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn lexeme(&self) -> &'a str {
        &self.src[self.start..self.curr]
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan one lexeme starting at `self.curr`. Real tokens leave their kind in
    /// `self.pending`; whitespace and comments leave it empty.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        let tt = match b {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' if self.match_byte(b'=') => TokenType::BANG_EQUAL,
            b'!' => TokenType::BANG,
            b'=' if self.match_byte(b'=') => TokenType::EQUAL_EQUAL,
            b'=' => TokenType::EQUAL,
            b'<' if self.match_byte(b'=') => TokenType::LESS_EQUAL,
            b'<' => TokenType::LESS,
            b'>' if self.match_byte(b'=') => TokenType::GREATER_EQUAL,
            b'>' => TokenType::GREATER,

            b' ' | b'\r' | b'\t' => return Ok(()),

            b'\n' => {
                self.line += 1;
                return Ok(());
            }

            b'/' if self.match_byte(b'/') => {
                // Leave the newline itself for the main loop so `line` stays right.
                match memchr(b'\n', &self.bytes()[self.curr..]) {
                    Some(pos) => self.curr += pos,
                    None => self.curr = self.src.len(),
                }
                return Ok(());
            }
            b'/' => TokenType::SLASH,

            b'"' => self.string()?,
            b'0'..=b'9' => self.number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Skip the whole character, not just its first byte.
                let c = self.src[self.start..].chars().next().unwrap_or('\u{FFFD}');
                self.curr = self.start + c.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        self.pending = Some(tt);

        Ok(())
    }

    /// Double‑quoted string literal. `self.start` points at the opening quote.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let contents = &self.src[self.start + 1..self.curr - 1];

        Ok(TokenType::STRING(contents.to_owned()))
    }

    /// Numeric literal (`123`, `3.14`). No leading or trailing dot forms.
    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Only ASCII digits and one dot reach here, so parsing cannot fail.
        let n: f64 = self.lexeme().parse().unwrap_or(0.0);

        TokenType::NUMBER(n)
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        KEYWORDS
            .get(self.lexeme())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.is_at_end() {
                self.done = true;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                trace!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, self.lexeme(), self.line)));
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
